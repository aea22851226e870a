//! Map documents, bookmarks and the primary view
//!
//! The loaded [`WebMap`] is shared read-only between the primary view and every
//! inset view through an `Arc`; nothing in this crate mutates map-level state.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::constants::config::JSON_EXTENSION;
use crate::geometry::{Extent, SpatialReference};

/// A named, saved map extent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmark {
    pub name: String,
    pub extent: Extent,
}

impl Bookmark {
    pub fn new(name: impl Into<String>, extent: Extent) -> Self {
        Self {
            name: name.into(),
            extent,
        }
    }
}

/// Map document as loaded from a map item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebMap {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "spatialReference", default, skip_serializing_if = "Option::is_none")]
    pub spatial_reference: Option<SpatialReference>,
    #[serde(rename = "initialExtent", default, skip_serializing_if = "Option::is_none")]
    pub initial_extent: Option<Extent>,
    #[serde(default)]
    pub bookmarks: Vec<Bookmark>,
}

impl WebMap {
    /// First bookmark with exactly this name
    pub fn bookmark(&self, name: &str) -> Option<&Bookmark> {
        self.bookmarks.iter().find(|bookmark| bookmark.name == name)
    }
}

/// The main map view. Insets read its map and spatial reference but never
/// write to either.
#[derive(Debug, Clone)]
pub struct PrimaryView {
    map: Arc<WebMap>,
    spatial_reference: SpatialReference,
    extent: Option<Extent>,
}

impl PrimaryView {
    /// The view takes the map's spatial reference, then its initial extent's,
    /// then `fallback`.
    pub fn new(map: Arc<WebMap>, fallback: SpatialReference) -> Self {
        let spatial_reference = map
            .spatial_reference
            .or(map.initial_extent.map(|extent| extent.spatial_reference))
            .unwrap_or(fallback);
        let extent = map.initial_extent;
        Self {
            map,
            spatial_reference,
            extent,
        }
    }

    pub fn map(&self) -> &Arc<WebMap> {
        &self.map
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.map.bookmarks
    }

    pub fn spatial_reference(&self) -> SpatialReference {
        self.spatial_reference
    }

    pub fn extent(&self) -> Option<&Extent> {
        self.extent.as_ref()
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map item '{item}' not found at {path}")]
    NotFound { item: String, path: PathBuf },
    #[error("failed to read map item '{item}' from {path}")]
    Read {
        item: String,
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse map item '{item}'")]
    Parse {
        item: String,
        source: serde_json::Error,
    },
}

/// Loads map documents by item reference
pub trait MapLoader {
    fn load_map(&self, item: &str) -> impl Future<Output = Result<WebMap, MapError>>;
}

/// Reads map documents from JSON files.
///
/// An item reference is either a path to an existing file or a bare item id
/// resolved to `<dir>/<item>.json`.
#[derive(Debug, Clone)]
pub struct FileMapLoader {
    dir: PathBuf,
}

impl FileMapLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, item: &str) -> PathBuf {
        let direct = PathBuf::from(item);
        if direct.is_file() {
            return direct;
        }
        self.dir.join(format!("{item}.{JSON_EXTENSION}"))
    }
}

impl MapLoader for FileMapLoader {
    async fn load_map(&self, item: &str) -> Result<WebMap, MapError> {
        let path = self.item_path(item);
        debug!(item = %item, path = %path.display(), "Loading map item");

        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MapError::NotFound {
                    item: item.to_string(),
                    path,
                });
            }
            Err(e) => {
                return Err(MapError::Read {
                    item: item.to_string(),
                    path,
                    source: e,
                });
            }
        };

        let map: WebMap = serde_json::from_str(&contents).map_err(|e| MapError::Parse {
            item: item.to_string(),
            source: e,
        })?;
        info!(
            item = %item,
            title = %map.title,
            bookmarks = map.bookmarks.len(),
            wkid = ?map.spatial_reference.map(|sr| sr.wkid),
            "Loaded map"
        );
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "bookmark-insets-map-{label}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const MAP_JSON: &str = r#"{
        "title": "Harbours",
        "spatialReference": {"wkid": 102100},
        "bookmarks": [
            {"name": "North", "extent": {"xmin": 0, "ymin": 0, "xmax": 10, "ymax": 5, "spatialReference": {"wkid": 102100}}},
            {"name": "South", "extent": {"xmin": 0, "ymin": -5, "xmax": 10, "ymax": 0, "spatialReference": {"wkid": 102100}}}
        ]
    }"#;

    #[tokio::test]
    async fn test_file_loader_resolves_item_ids() {
        let dir = temp_dir("ids");
        std::fs::write(dir.join("harbours.json"), MAP_JSON).unwrap();

        let map = FileMapLoader::new(&dir).load_map("harbours").await.unwrap();
        assert_eq!(map.title, "Harbours");
        assert_eq!(map.bookmarks.len(), 2);
        assert_eq!(map.bookmark("South").map(|b| b.extent.ymin), Some(-5.0));
        assert!(map.bookmark("south").is_none());

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_file_loader_reports_missing_items() {
        let dir = temp_dir("missing");
        let err = FileMapLoader::new(&dir).load_map("nope").await.unwrap_err();
        assert!(matches!(err, MapError::NotFound { .. }));
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_primary_view_uses_map_spatial_reference() {
        let map: WebMap = serde_json::from_str(MAP_JSON).unwrap();
        let view = PrimaryView::new(Arc::new(map), SpatialReference::WGS84);
        assert_eq!(view.spatial_reference(), SpatialReference::WEB_MERCATOR);
        assert_eq!(view.bookmarks().len(), 2);
        assert!(view.extent().is_none());
    }

    #[test]
    fn test_primary_view_falls_back_when_map_has_no_reference() {
        let map: WebMap = serde_json::from_str(r#"{"bookmarks": []}"#).unwrap();
        let view = PrimaryView::new(Arc::new(map), SpatialReference::WGS84);
        assert_eq!(view.spatial_reference(), SpatialReference::WGS84);
    }
}
