//! Persisted configuration document and inset placement rows
//!
//! JSON shape:
//! `{ "values": { "inset_views": [ { "name", "enabled", "sr_wkid", "position", "index" } ] } }`
//!
//! Rows written by older editors may omit fields; [`PersistedInsetView`] keeps
//! every field optional and the defaults are applied when a row is turned into
//! an [`InsetPlacementSpec`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::wkid;
use crate::types::InsetPosition;

/// Fully-specified placement of one inset view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsetPlacementSpec {
    /// Bookmark name (exact, case-sensitive match)
    pub name: String,
    pub enabled: bool,
    #[serde(rename = "sr_wkid")]
    pub spatial_reference_id: u32,
    pub position: InsetPosition,
    /// Order within the position's corner
    pub index: u32,
}

impl InsetPlacementSpec {
    /// Enabled, bottom-left row
    pub fn with_defaults(name: impl Into<String>, spatial_reference_id: u32, index: u32) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            spatial_reference_id,
            position: InsetPosition::default(),
            index,
        }
    }
}

/// One `inset_views` row exactly as stored
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedInsetView {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sr_wkid: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<InsetPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl PersistedInsetView {
    /// Fill missing fields: enabled, Web Mercator, bottom-left, `default_index`
    pub fn to_spec(&self, default_index: u32) -> InsetPlacementSpec {
        InsetPlacementSpec {
            name: self.name.clone(),
            enabled: self.enabled.unwrap_or(true),
            spatial_reference_id: self.sr_wkid.unwrap_or(wkid::WEB_MERCATOR),
            position: self.position.unwrap_or_default(),
            index: self.index.unwrap_or(default_index),
        }
    }
}

impl From<&InsetPlacementSpec> for PersistedInsetView {
    fn from(spec: &InsetPlacementSpec) -> Self {
        Self {
            name: spec.name.clone(),
            enabled: Some(spec.enabled),
            sr_wkid: Some(spec.spatial_reference_id),
            position: Some(spec.position),
            index: Some(spec.index),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocumentValues {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inset_views: Option<Vec<PersistedInsetView>>,
    /// Other template values stored alongside the inset rows
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    #[serde(default)]
    pub values: DocumentValues,
}

impl ConfigurationDocument {
    pub fn from_specs(specs: &[InsetPlacementSpec]) -> Self {
        Self {
            values: DocumentValues {
                inset_views: Some(specs.iter().map(PersistedInsetView::from).collect()),
                other: Map::new(),
            },
        }
    }

    pub fn inset_views(&self) -> Option<&[PersistedInsetView]> {
        self.values.inset_views.as_deref()
    }

    /// Stored rows as render specs. A row without an index takes its position
    /// in the stored list.
    pub fn placement_specs(&self) -> Vec<InsetPlacementSpec> {
        self.inset_views()
            .unwrap_or_default()
            .iter()
            .enumerate()
            .map(|(ordinal, row)| row.to_spec(ordinal as u32))
            .collect()
    }
}
