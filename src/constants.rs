//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the crate, providing a single source of truth for constant values.

/// Well-known spatial reference identifiers
pub mod wkid {
    /// Geographic WGS 84 (longitude/latitude degrees)
    pub const WGS84: u32 = 4326;

    /// Esri Web Mercator (auxiliary sphere), the default for persisted rows
    pub const WEB_MERCATOR: u32 = 102100;

    /// EPSG Web Mercator
    pub const WEB_MERCATOR_EPSG: u32 = 3857;

    /// Deprecated Esri Web Mercator code
    pub const WEB_MERCATOR_LEGACY: u32 = 102113;

    /// Unofficial "google" Web Mercator code
    pub const WEB_MERCATOR_GOOGLE: u32 = 900913;
}

/// Inset panel defaults
pub mod inset {
    /// Base container width in pixels; height follows the bookmark aspect ratio
    pub const BASE_SIZE: f64 = 200.0;

    /// Smallest base size accepted from settings
    pub const MIN_BASE_SIZE: f64 = 50.0;

    /// Largest base size accepted from settings
    pub const MAX_BASE_SIZE: f64 = 2000.0;
}

/// Spherical Mercator parameters
pub mod mercator {
    /// Sphere radius in meters
    pub const EARTH_RADIUS: f64 = 6378137.0;

    /// Latitude limit of the projection in degrees
    pub const MAX_LATITUDE: f64 = 85.0511287798;
}

/// Configuration file locations
pub mod config {
    /// Directory name under the platform config dir
    pub const APP_DIR: &str = "bookmark-insets";

    /// Application settings filename
    pub const FILENAME: &str = "config.json";

    /// Subdirectory holding one configuration document per application id
    pub const STORE_SUBDIR: &str = "documents";

    /// Subdirectory searched for map documents
    pub const MAPS_SUBDIR: &str = "maps";

    /// Extension used for stored documents and map files
    pub const JSON_EXTENSION: &str = "json";
}
