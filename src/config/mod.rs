//! Configuration for bookmark insets
//!
//! This module provides two config layers:
//! - **document**: the per-application configuration document holding inset rows
//! - **settings**: local application settings (logging, sizes, directories)

pub mod document;
pub mod settings;

// Re-export commonly used types
pub use document::{ConfigurationDocument, DocumentValues, InsetPlacementSpec, PersistedInsetView};
pub use settings::AppSettings;
