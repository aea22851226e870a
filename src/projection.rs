//! Extent reprojection between spatial references

use std::f64::consts::PI;
use std::future::Future;
use thiserror::Error;
use tracing::debug;

use crate::constants::mercator::{EARTH_RADIUS, MAX_LATITUDE};
use crate::geometry::{Extent, SpatialReference};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("projection engine used before it finished loading")]
    NotLoaded,
    #[error("no transformation from {from} to {to}")]
    Unsupported {
        from: SpatialReference,
        to: SpatialReference,
    },
    #[error("projected extent is not finite")]
    NonFinite,
}

/// Reprojects planar extents. `load` must complete before any `project` call.
pub trait ProjectionEngine {
    fn load(&mut self) -> impl Future<Output = Result<(), ProjectionError>>;

    fn is_loaded(&self) -> bool;

    fn project(&self, extent: &Extent, target: SpatialReference) -> Result<Extent, ProjectionError>;
}

/// Built-in engine covering WGS 84 and the Web Mercator family
#[derive(Debug, Default)]
pub struct SphericalMercator {
    loaded: bool,
}

impl SphericalMercator {
    pub fn new() -> Self {
        Self::default()
    }

    fn forward(lon: f64, lat: f64) -> (f64, f64) {
        const D: f64 = PI / 180.0;
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin_lat = (lat * D).sin();
        (
            EARTH_RADIUS * lon * D,
            EARTH_RADIUS * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / 2.0,
        )
    }

    fn inverse(x: f64, y: f64) -> (f64, f64) {
        const D: f64 = 180.0 / PI;
        (
            x * D / EARTH_RADIUS,
            (2.0 * (y / EARTH_RADIUS).exp().atan() - PI / 2.0) * D,
        )
    }

    fn transform(
        extent: &Extent,
        target: SpatialReference,
        f: fn(f64, f64) -> (f64, f64),
    ) -> Result<Extent, ProjectionError> {
        let (x1, y1) = f(extent.xmin, extent.ymin);
        let (x2, y2) = f(extent.xmax, extent.ymax);
        let projected = Extent::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2), target);
        if !projected.is_finite() {
            return Err(ProjectionError::NonFinite);
        }
        Ok(projected)
    }
}

impl ProjectionEngine for SphericalMercator {
    async fn load(&mut self) -> Result<(), ProjectionError> {
        self.loaded = true;
        debug!("Projection engine loaded");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn project(&self, extent: &Extent, target: SpatialReference) -> Result<Extent, ProjectionError> {
        if !self.loaded {
            return Err(ProjectionError::NotLoaded);
        }

        let source = extent.spatial_reference;
        if source.is_equivalent(&target) {
            return Ok(extent.with_spatial_reference(target));
        }
        if source.is_wgs84() && target.is_web_mercator() {
            return Self::transform(extent, target, Self::forward);
        }
        if source.is_web_mercator() && target.is_wgs84() {
            return Self::transform(extent, target, Self::inverse);
        }

        Err(ProjectionError::Unsupported {
            from: source,
            to: target,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn loaded() -> SphericalMercator {
        let mut engine = SphericalMercator::new();
        engine.load().await.unwrap();
        engine
    }

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() <= tolerance
    }

    #[tokio::test]
    async fn test_wgs84_to_web_mercator_and_back() {
        let engine = loaded().await;
        let geographic = Extent::new(-10.0, 40.0, 5.0, 55.0, SpatialReference::WGS84);

        let mercator = engine
            .project(&geographic, SpatialReference::WEB_MERCATOR)
            .unwrap();
        assert_eq!(mercator.spatial_reference, SpatialReference::WEB_MERCATOR);
        assert!(close(mercator.xmin, -1_113_194.9, 1.0));
        assert!(mercator.height() > 0.0);

        let back = engine.project(&mercator, SpatialReference::WGS84).unwrap();
        assert!(close(back.xmin, -10.0, 1e-9));
        assert!(close(back.ymin, 40.0, 1e-9));
        assert!(close(back.xmax, 5.0, 1e-9));
        assert!(close(back.ymax, 55.0, 1e-9));
    }

    #[tokio::test]
    async fn test_equivalent_references_only_relabel() {
        let engine = loaded().await;
        let extent = Extent::new(1.0, 2.0, 3.0, 4.0, SpatialReference::WEB_MERCATOR);
        let relabelled = engine.project(&extent, SpatialReference::new(3857)).unwrap();
        assert_eq!(relabelled.xmin, 1.0);
        assert_eq!(relabelled.spatial_reference.wkid, 3857);
    }

    #[tokio::test]
    async fn test_unsupported_reference_fails() {
        let engine = loaded().await;
        let extent = Extent::new(1.0, 2.0, 3.0, 4.0, SpatialReference::WEB_MERCATOR);
        let err = engine.project(&extent, SpatialReference::new(27700)).unwrap_err();
        assert!(matches!(err, ProjectionError::Unsupported { .. }));
    }

    #[test]
    fn test_project_before_load_fails() {
        let engine = SphericalMercator::new();
        let extent = Extent::new(1.0, 2.0, 3.0, 4.0, SpatialReference::WGS84);
        assert_eq!(
            engine.project(&extent, SpatialReference::WEB_MERCATOR),
            Err(ProjectionError::NotLoaded)
        );
    }
}
