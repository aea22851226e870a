//! Inset panel containers
//!
//! A container is the on-screen slot an inset view renders into. Its size keeps
//! the bookmark's aspect ratio so the inset never distorts the bookmarked area.

use tracing::warn;

use crate::geometry::Extent;
use crate::types::{Dimensions, InsetPosition};

/// What a container currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// View requested, not ready yet
    Loading,
    /// View ready and rendering the map
    Map,
    /// Construction failed; the message is shown in place of the map
    Error(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsetContainer {
    pub position: InsetPosition,
    pub index: u32,
    pub dimensions: Dimensions,
    content: PanelContent,
}

impl InsetContainer {
    /// Width fixed at `base_size`, height from the extent's height/width ratio.
    /// Empty extents get a square panel.
    pub fn for_extent(
        position: InsetPosition,
        index: u32,
        extent: &Extent,
        base_size: f64,
    ) -> Self {
        let ratio = extent.aspect_ratio().unwrap_or_else(|| {
            warn!(extent = ?extent, "Bookmark extent has no usable aspect ratio, using a square panel");
            1.0
        });
        Self {
            position,
            index,
            dimensions: Dimensions::new(base_size, ratio * base_size),
            content: PanelContent::Loading,
        }
    }

    pub fn content(&self) -> &PanelContent {
        &self.content
    }

    pub fn show_map(&mut self) {
        self.content = PanelContent::Map;
    }

    /// Replace whatever the panel shows with an error message
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.content = PanelContent::Error(message.into());
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self.content, PanelContent::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SpatialReference;

    #[test]
    fn test_height_follows_extent_ratio() {
        let wide = Extent::new(0.0, 0.0, 400.0, 100.0, SpatialReference::WEB_MERCATOR);
        let container = InsetContainer::for_extent(InsetPosition::TopLeft, 0, &wide, 200.0);
        assert_eq!(container.dimensions, Dimensions::new(200.0, 50.0));

        let tall = Extent::new(0.0, 0.0, 100.0, 300.0, SpatialReference::WEB_MERCATOR);
        let container = InsetContainer::for_extent(InsetPosition::TopLeft, 0, &tall, 200.0);
        assert_eq!(container.dimensions, Dimensions::new(200.0, 600.0));
    }

    #[test]
    fn test_degenerate_extent_gets_square_panel() {
        let flat = Extent::new(5.0, 5.0, 5.0, 10.0, SpatialReference::WEB_MERCATOR);
        let container = InsetContainer::for_extent(InsetPosition::BottomLeft, 1, &flat, 120.0);
        assert_eq!(container.dimensions, Dimensions::new(120.0, 120.0));
    }

    #[test]
    fn test_content_transitions() {
        let extent = Extent::new(0.0, 0.0, 1.0, 1.0, SpatialReference::WGS84);
        let mut container = InsetContainer::for_extent(InsetPosition::TopRight, 0, &extent, 100.0);
        assert_eq!(container.content(), &PanelContent::Loading);
        assert!(!container.is_settled());

        container.show_error("boom");
        assert_eq!(container.content(), &PanelContent::Error("boom".to_string()));
        assert!(container.is_settled());
    }
}
