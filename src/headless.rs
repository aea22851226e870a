//! Map Provider without a renderer
//!
//! Views become ready immediately and keep their camera extent in memory. Used
//! by the CLI to lay out insets and by tests to drive camera changes.

use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

use crate::geometry::Extent;
use crate::inset::view::{
    InsetId, InsetLabel, InsetView, MapProvider, ViewError, ViewEvent, ViewEventSender, ViewReady,
    ViewRequest,
};
use crate::map::WebMap;

/// Ids of destroyed views, shared by a provider and every view it created
#[derive(Debug, Clone, Default)]
pub struct DestroyedViews(Arc<Mutex<Vec<InsetId>>>);

impl DestroyedViews {
    fn record(&self, id: InsetId) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(id);
    }

    pub fn ids(&self) -> Vec<InsetId> {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[derive(Debug, Default)]
pub struct HeadlessProvider {
    created: usize,
    destroyed: DestroyedViews,
}

impl HeadlessProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Views created over the provider's lifetime
    pub fn created(&self) -> usize {
        self.created
    }

    /// Handle on the destroyed-view record; stays readable after the provider is gone
    pub fn destroyed(&self) -> DestroyedViews {
        self.destroyed.clone()
    }
}

impl MapProvider for HeadlessProvider {
    type View = HeadlessView;

    fn create_view(&mut self, request: ViewRequest<'_>) -> Result<(HeadlessView, ViewReady), ViewError> {
        self.created += 1;
        debug!(id = %request.id, title = %request.title, "Creating headless view");

        let (ready_tx, ready_rx) = oneshot::channel();
        let _ = ready_tx.send(Ok(()));

        let view = HeadlessView {
            id: request.id,
            map: request.map,
            extent: request.extent,
            label: None,
            watcher: None,
            programmatic_moves: 0,
            destroyed: false,
            destroyed_log: self.destroyed.clone(),
        };
        Ok((view, ready_rx))
    }
}

#[derive(Debug)]
pub struct HeadlessView {
    id: InsetId,
    map: Arc<WebMap>,
    extent: Extent,
    label: Option<InsetLabel>,
    watcher: Option<(InsetId, ViewEventSender)>,
    programmatic_moves: usize,
    destroyed: bool,
    destroyed_log: DestroyedViews,
}

impl HeadlessView {
    /// Simulate user or external camera movement
    pub fn pan_to(&mut self, extent: Extent) {
        self.move_camera(extent);
    }

    pub fn label(&self) -> Option<&InsetLabel> {
        self.label.as_ref()
    }

    pub fn map(&self) -> &Arc<WebMap> {
        &self.map
    }

    /// Number of `set_extent` calls made on this view
    pub fn programmatic_moves(&self) -> usize {
        self.programmatic_moves
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn is_watched(&self) -> bool {
        self.watcher.is_some()
    }

    fn move_camera(&mut self, extent: Extent) {
        self.extent = extent;
        if let Some((id, events)) = &self.watcher {
            let _ = events.send(ViewEvent::ExtentChanged { id: *id, extent });
        }
    }
}

impl InsetView for HeadlessView {
    fn extent(&self) -> Extent {
        self.extent
    }

    fn set_extent(&mut self, extent: Extent) {
        self.programmatic_moves += 1;
        self.move_camera(extent);
    }

    fn add_label(&mut self, label: InsetLabel) {
        self.label = Some(label);
    }

    fn watch_extent(&mut self, id: InsetId, events: ViewEventSender) {
        self.watcher = Some((id, events));
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        debug!(id = %self.id, "Destroying headless view");
        self.watcher = None;
        self.destroyed = true;
        self.destroyed_log.record(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SpatialReference;
    use crate::inset::container::InsetContainer;
    use crate::types::InsetPosition;

    #[test]
    fn test_destroy_is_recorded_once() {
        let extent = Extent::new(0.0, 0.0, 10.0, 5.0, SpatialReference::WEB_MERCATOR);
        let container = InsetContainer::for_extent(InsetPosition::TopLeft, 0, &extent, 100.0);
        let map = Arc::new(WebMap {
            title: "Test".to_string(),
            spatial_reference: None,
            initial_extent: None,
            bookmarks: Vec::new(),
        });
        let id = InsetId { generation: 1, slot: 0 };
        let mut provider = HeadlessProvider::new();
        let (mut view, _ready) = provider
            .create_view(ViewRequest {
                id,
                title: "A",
                map,
                container: &container,
                extent,
                spatial_reference: extent.spatial_reference,
                ui_components: Vec::new(),
            })
            .unwrap();

        view.destroy();
        view.destroy();
        assert!(view.is_destroyed());
        assert!(!view.is_watched());
        assert_eq!(provider.destroyed().ids(), vec![id]);
    }
}
