#![forbid(unsafe_code)]

//! Bookmark inset views
//!
//! Places small map insets, each pinned to a saved bookmark extent, around a
//! primary map view: rows from a stored configuration document are merged with
//! the map's bookmarks, resolved into an ordered placement list, reprojected and
//! built through a pluggable map provider.

pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod inset;
pub mod logging;
pub mod map;
pub mod pipeline;
pub mod projection;
pub mod reconciler;
pub mod resolver;
pub mod store;
pub mod types;

pub use error::{InsetError, InsetResult};
