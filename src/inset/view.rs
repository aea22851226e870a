//! Map Provider seam: how inset views are created and observed
//!
//! Views report back through a single [`ViewEvent`] channel. Readiness is a
//! one-shot future per view; extent changes are pushed once the manager
//! installs its watcher on a ready view.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::geometry::{Extent, SpatialReference};
use crate::inset::container::InsetContainer;
use crate::map::WebMap;

/// Identity of one inset instance within one rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InsetId {
    /// Rebuild counter; instances from older rebuilds are stale
    pub generation: u64,
    /// Position in the rebuild's placement list
    pub slot: usize,
}

impl fmt::Display for InsetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.generation, self.slot)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ViewError {
    #[error("view creation refused: {0}")]
    Refused(String),
    #[error("view failed to become ready: {0}")]
    NotReady(String),
    #[error("view was dropped before it became ready")]
    Abandoned,
}

/// Resolves once the view can render, or with the reason it cannot
pub type ViewReady = oneshot::Receiver<Result<(), ViewError>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    Ready {
        id: InsetId,
        result: Result<(), ViewError>,
    },
    ExtentChanged {
        id: InsetId,
        extent: Extent,
    },
}

pub type ViewEventSender = mpsc::UnboundedSender<ViewEvent>;
pub type ViewEventReceiver = mpsc::UnboundedReceiver<ViewEvent>;

/// Title overlay shown in the inset's corner
#[derive(Debug, Clone, PartialEq)]
pub struct InsetLabel {
    pub text: String,
    pub tooltip: String,
}

/// Everything a provider needs to build one inset view
#[derive(Debug)]
pub struct ViewRequest<'a> {
    pub id: InsetId,
    pub title: &'a str,
    /// Shared with the primary view; layer state is not duplicated
    pub map: Arc<WebMap>,
    pub container: &'a InsetContainer,
    pub extent: Extent,
    pub spatial_reference: SpatialReference,
    /// Widgets to show on the view; insets get none
    pub ui_components: Vec<String>,
}

pub trait MapProvider {
    type View: InsetView;

    fn create_view(&mut self, request: ViewRequest<'_>) -> Result<(Self::View, ViewReady), ViewError>;
}

pub trait InsetView {
    fn extent(&self) -> Extent;

    /// Move the camera
    fn set_extent(&mut self, extent: Extent);

    fn add_label(&mut self, label: InsetLabel);

    /// Report every subsequent camera change as [`ViewEvent::ExtentChanged`]
    fn watch_extent(&mut self, id: InsetId, events: ViewEventSender);

    /// Release the view and its container
    fn destroy(&mut self);
}

/// Forward a view's readiness into the event channel
pub(crate) async fn forward_ready(id: InsetId, ready: ViewReady, events: ViewEventSender) {
    let result = ready.await.unwrap_or(Err(ViewError::Abandoned));
    // Receiver gone means the manager is gone; nothing left to update
    let _ = events.send(ViewEvent::Ready { id, result });
}
