//! Inset views: containers, the provider seam and the lifecycle manager

pub mod container;
pub mod manager;
pub mod view;

pub use container::{InsetContainer, PanelContent};
pub use manager::{EventOutcome, InsetInstance, InsetViewManager, RebuildReport};
pub use view::{
    InsetId, InsetLabel, InsetView, MapProvider, ViewError, ViewEvent, ViewEventReceiver,
    ViewEventSender, ViewReady, ViewRequest,
};
