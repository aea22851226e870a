//! Planar extents and spatial references

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::wkid;

/// Coordinate system identifier (well-known id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpatialReference {
    pub wkid: u32,
}

impl SpatialReference {
    pub const WGS84: Self = Self::new(wkid::WGS84);
    pub const WEB_MERCATOR: Self = Self::new(wkid::WEB_MERCATOR);

    pub const fn new(wkid: u32) -> Self {
        Self { wkid }
    }

    pub fn is_web_mercator(&self) -> bool {
        matches!(
            self.wkid,
            wkid::WEB_MERCATOR
                | wkid::WEB_MERCATOR_EPSG
                | wkid::WEB_MERCATOR_LEGACY
                | wkid::WEB_MERCATOR_GOOGLE
        )
    }

    pub fn is_wgs84(&self) -> bool {
        self.wkid == wkid::WGS84
    }

    /// Same coordinate system, allowing for the Web Mercator aliases
    pub fn is_equivalent(&self, other: &SpatialReference) -> bool {
        self.wkid == other.wkid || (self.is_web_mercator() && other.is_web_mercator())
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "wkid:{}", self.wkid)
    }
}

/// Axis-aligned bounding box in a given spatial reference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    #[serde(rename = "spatialReference")]
    pub spatial_reference: SpatialReference,
}

impl Extent {
    pub const fn new(
        xmin: f64,
        ymin: f64,
        xmax: f64,
        ymax: f64,
        spatial_reference: SpatialReference,
    ) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            spatial_reference,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Height over width, `None` for empty or non-finite extents
    pub fn aspect_ratio(&self) -> Option<f64> {
        let (width, height) = (self.width(), self.height());
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(height / width)
    }

    pub fn is_finite(&self) -> bool {
        [self.xmin, self.ymin, self.xmax, self.ymax]
            .iter()
            .all(|v| v.is_finite())
    }

    /// True when `other` lies fully inside this extent (edges inclusive).
    /// Extents in different coordinate systems never contain each other.
    pub fn contains(&self, other: &Extent) -> bool {
        self.spatial_reference.is_equivalent(&other.spatial_reference)
            && other.xmin >= self.xmin
            && other.ymin >= self.ymin
            && other.xmax <= self.xmax
            && other.ymax <= self.ymax
    }

    pub fn with_spatial_reference(mut self, spatial_reference: SpatialReference) -> Self {
        self.spatial_reference = spatial_reference;
        self
    }
}
