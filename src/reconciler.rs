//! Working configuration: persisted rows merged with the live bookmark set
//!
//! Bookmarks decide which rows exist; the stored document decides the field
//! values of the rows it covers. Every edit is pushed to the change channel
//! straight away so the live preview follows the form. Saving is a separate,
//! explicit step.

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::config::{ConfigurationDocument, InsetPlacementSpec};
use crate::error::{InsetError, InsetResult};
use crate::map::Bookmark;
use crate::store::ConfigStore;
use crate::types::InsetPosition;

/// One editable row per bookmark, in bookmark order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkingConfiguration {
    rows: Vec<InsetPlacementSpec>,
}

impl WorkingConfiguration {
    /// Enabled, bottom-left rows in each bookmark's own spatial reference
    pub fn defaults(bookmarks: &[Bookmark]) -> Self {
        Self {
            rows: bookmarks
                .iter()
                .enumerate()
                .map(|(ordinal, bookmark)| Self::default_row(bookmark, ordinal))
                .collect(),
        }
    }

    pub fn merge(document: Option<&ConfigurationDocument>, bookmarks: &[Bookmark]) -> Self {
        let Some(stored) = document.and_then(ConfigurationDocument::inset_views) else {
            return Self::defaults(bookmarks);
        };

        let mut seen: Vec<&str> = Vec::with_capacity(bookmarks.len());
        let mut rows = Vec::with_capacity(bookmarks.len());
        for (ordinal, bookmark) in bookmarks.iter().enumerate() {
            // one row per name even if the map repeats a bookmark name
            if seen.contains(&bookmark.name.as_str()) {
                continue;
            }
            seen.push(&bookmark.name);

            let row = match stored.iter().find(|row| row.name == bookmark.name) {
                Some(row) => row.to_spec(ordinal as u32),
                None => Self::default_row(bookmark, ordinal),
            };
            rows.push(row);
        }

        debug!(rows = rows.len(), stored = stored.len(), "Merged stored configuration with bookmarks");
        Self { rows }
    }

    fn default_row(bookmark: &Bookmark, ordinal: usize) -> InsetPlacementSpec {
        InsetPlacementSpec::with_defaults(
            &bookmark.name,
            bookmark.extent.spatial_reference.wkid,
            ordinal as u32,
        )
    }

    pub fn rows(&self) -> &[InsetPlacementSpec] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&InsetPlacementSpec> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, in row order, as a stored document
    pub fn serialize(&self) -> ConfigurationDocument {
        ConfigurationDocument::from_specs(&self.rows)
    }

    fn apply(&mut self, name: &str, edit: ConfigEdit) -> InsetResult<()> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.name == name)
            .ok_or_else(|| InsetError::UnknownRow {
                name: name.to_string(),
            })?;
        match edit {
            ConfigEdit::Enabled(enabled) => row.enabled = enabled,
            ConfigEdit::SpatialReference(wkid) => row.spatial_reference_id = wkid,
            ConfigEdit::Position(position) => row.position = position,
            ConfigEdit::Index(index) => row.index = index,
        }
        Ok(())
    }
}

/// A single field change on one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigEdit {
    Enabled(bool),
    SpatialReference(u32),
    Position(InsetPosition),
    Index(u32),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveStatus {
    /// Matches the stored document
    Clean,
    /// Edited since the last successful save
    Dirty,
    Saving,
    /// Last save failed; edits are still unsaved
    Failed(String),
}

/// Requests from the editor to whoever hosts it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostSignal {
    OpenConfigureDialog { app_id: String },
}

pub struct ConfigurationEditor {
    app_id: String,
    base: ConfigurationDocument,
    working: WorkingConfiguration,
    changes: mpsc::UnboundedSender<WorkingConfiguration>,
    status: SaveStatus,
}

impl ConfigurationEditor {
    /// Edits are published on `changes` as full working configurations
    pub fn new(
        app_id: impl Into<String>,
        document: Option<ConfigurationDocument>,
        bookmarks: &[Bookmark],
        changes: mpsc::UnboundedSender<WorkingConfiguration>,
    ) -> Self {
        let working = WorkingConfiguration::merge(document.as_ref(), bookmarks);
        Self {
            app_id: app_id.into(),
            base: document.unwrap_or_default(),
            working,
            changes,
            status: SaveStatus::Clean,
        }
    }

    /// Load the stored document and ask the host to show the configure dialog
    pub async fn open<S: ConfigStore>(
        store: &S,
        app_id: &str,
        bookmarks: &[Bookmark],
        changes: mpsc::UnboundedSender<WorkingConfiguration>,
        host: &mpsc::UnboundedSender<HostSignal>,
    ) -> InsetResult<Self> {
        let document = store
            .get(app_id)
            .await
            .map_err(|e| InsetError::Persistence {
                app_id: app_id.to_string(),
                source: e,
            })?;
        let editor = Self::new(app_id, document, bookmarks, changes);
        info!(app_id = %app_id, rows = editor.working.rows().len(), "Opened configuration editor");

        if host
            .send(HostSignal::OpenConfigureDialog {
                app_id: app_id.to_string(),
            })
            .is_err()
        {
            debug!(app_id = %app_id, "No host listening for dialog requests");
        }
        Ok(editor)
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn working(&self) -> &WorkingConfiguration {
        &self.working
    }

    pub fn status(&self) -> &SaveStatus {
        &self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.status != SaveStatus::Clean
    }

    /// Stored document with the current rows; other stored values are kept
    pub fn document(&self) -> ConfigurationDocument {
        let mut document = self.base.clone();
        document.values.inset_views = self.working.serialize().values.inset_views;
        document
    }

    /// Apply one field edit and publish the updated configuration
    pub fn edit(&mut self, name: &str, edit: ConfigEdit) -> InsetResult<()> {
        self.working.apply(name, edit)?;
        debug!(name = %name, edit = ?edit, "Configuration edited");
        if self.status != SaveStatus::Saving {
            self.status = SaveStatus::Dirty;
        }
        if self.changes.send(self.working.clone()).is_err() {
            debug!("No listener for configuration changes");
        }
        Ok(())
    }

    /// Persist the current rows. Only a successful update marks the editor clean.
    pub async fn save<S: ConfigStore>(&mut self, store: &S) -> InsetResult<()> {
        let document = self.document();
        self.status = SaveStatus::Saving;

        match store.update(&self.app_id, &document).await {
            Ok(()) => {
                self.base = document;
                self.status = SaveStatus::Clean;
                info!(app_id = %self.app_id, "Configuration saved");
                Ok(())
            }
            Err(e) => {
                error!(app_id = %self.app_id, error = %e, "Failed to save configuration");
                self.status = SaveStatus::Failed(e.to_string());
                Err(InsetError::Persistence {
                    app_id: self.app_id.clone(),
                    source: e,
                })
            }
        }
    }
}
