//! Placement resolution
//!
//! Turns configuration rows plus the live bookmark set into the ordered list of
//! insets to build. Pure: no I/O, same inputs give the same output.

use std::collections::HashSet;
use tracing::debug;

use crate::config::InsetPlacementSpec;
use crate::error::InsetError;
use crate::geometry::SpatialReference;
use crate::map::Bookmark;

/// A spec matched to its bookmark, in rendering order
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub spec: InsetPlacementSpec,
    pub bookmark: Bookmark,
}

/// One spec per bookmark: enabled, bottom-left, in bookmark order
pub fn default_specs(
    bookmarks: &[Bookmark],
    spatial_reference: SpatialReference,
) -> Vec<InsetPlacementSpec> {
    bookmarks
        .iter()
        .enumerate()
        .map(|(ordinal, bookmark)| {
            InsetPlacementSpec::with_defaults(&bookmark.name, spatial_reference.wkid, ordinal as u32)
        })
        .collect()
}

/// Resolve `specs` against `bookmarks`.
///
/// With no specs every bookmark gets a default bottom-left placement in the
/// primary view's spatial reference. Otherwise disabled rows, rows whose
/// bookmark is gone and repeated names are dropped. Output is sorted by
/// position then index; equal keys keep their input order.
pub fn resolve(
    bookmarks: &[Bookmark],
    specs: &[InsetPlacementSpec],
    primary_spatial_reference: SpatialReference,
) -> Vec<Placement> {
    if specs.is_empty() {
        return default_specs(bookmarks, primary_spatial_reference)
            .into_iter()
            .zip(bookmarks.iter().cloned())
            .map(|(spec, bookmark)| Placement { spec, bookmark })
            .collect();
    }

    let mut placed = HashSet::new();
    let mut placements: Vec<Placement> = specs
        .iter()
        .filter_map(|spec| {
            let Some(bookmark) = find_bookmark(bookmarks, &spec.name) else {
                debug!(name = %spec.name, "Dropping row without bookmark");
                return None;
            };
            // the first row for a name decides, enabled or not
            if !placed.insert(spec.name.as_str()) {
                debug!(name = %spec.name, "Dropping repeated row for bookmark");
                return None;
            }
            if !spec.enabled {
                return None;
            }
            Some(Placement {
                spec: spec.clone(),
                bookmark: bookmark.clone(),
            })
        })
        .collect();

    // sort_by_key is stable
    placements.sort_by_key(|placement| (placement.spec.position, placement.spec.index));
    placements
}

/// Rows naming bookmarks that no longer exist
pub fn missing_bookmarks(bookmarks: &[Bookmark], specs: &[InsetPlacementSpec]) -> Vec<InsetError> {
    specs
        .iter()
        .filter(|spec| find_bookmark(bookmarks, &spec.name).is_none())
        .map(|spec| InsetError::MissingBookmark {
            name: spec.name.clone(),
        })
        .collect()
}

fn find_bookmark<'a>(bookmarks: &'a [Bookmark], name: &str) -> Option<&'a Bookmark> {
    bookmarks.iter().find(|bookmark| bookmark.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Extent;
    use crate::types::InsetPosition;

    fn bookmark(name: &str) -> Bookmark {
        Bookmark::new(
            name,
            Extent::new(0.0, 0.0, 100.0, 50.0, SpatialReference::WEB_MERCATOR),
        )
    }

    fn spec(name: &str, position: InsetPosition, index: u32) -> InsetPlacementSpec {
        InsetPlacementSpec {
            name: name.to_string(),
            enabled: true,
            spatial_reference_id: 102100,
            position,
            index,
        }
    }

    fn labels(placements: &[Placement]) -> Vec<String> {
        placements
            .iter()
            .map(|p| format!("{}#{}:{}", p.spec.position, p.spec.index, p.bookmark.name))
            .collect()
    }

    #[test]
    fn test_sorts_by_position_then_index() {
        let bookmarks = vec![bookmark("A"), bookmark("B"), bookmark("C")];
        let specs = vec![
            spec("A", InsetPosition::BottomLeft, 2),
            spec("B", InsetPosition::TopLeft, 0),
            spec("C", InsetPosition::BottomLeft, 1),
        ];

        let resolved = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        assert_eq!(
            labels(&resolved),
            vec!["top-left#0:B", "bottom-left#1:C", "bottom-left#2:A"]
        );
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let bookmarks = vec![bookmark("A"), bookmark("B"), bookmark("C"), bookmark("D")];
        let specs = vec![
            spec("D", InsetPosition::BottomRight, 0),
            spec("A", InsetPosition::TopRight, 1),
            spec("B", InsetPosition::TopRight, 1),
            spec("C", InsetPosition::TopLeft, 5),
        ];

        let first = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        let second = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        assert_eq!(first, second);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let bookmarks = vec![bookmark("A"), bookmark("B"), bookmark("C")];
        let specs = vec![
            spec("C", InsetPosition::TopRight, 1),
            spec("A", InsetPosition::TopRight, 1),
            spec("B", InsetPosition::TopRight, 1),
        ];

        let resolved = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        let names: Vec<_> = resolved.iter().map(|p| p.bookmark.name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_empty_specs_synthesize_defaults() {
        let bookmarks = vec![bookmark("A"), bookmark("B"), bookmark("C")];
        let resolved = resolve(&bookmarks, &[], SpatialReference::WGS84);

        assert_eq!(resolved.len(), 3);
        for (ordinal, placement) in resolved.iter().enumerate() {
            assert_eq!(placement.spec.name, placement.bookmark.name);
            assert!(placement.spec.enabled);
            assert_eq!(placement.spec.position, InsetPosition::BottomLeft);
            assert_eq!(placement.spec.index, ordinal as u32);
            assert_eq!(placement.spec.spatial_reference_id, 4326);
        }
        let names: Vec<_> = resolved.iter().map(|p| p.bookmark.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_dangling_spec_is_dropped() {
        let bookmarks = vec![bookmark("A")];
        let specs = vec![
            spec("X", InsetPosition::TopLeft, 0),
            spec("A", InsetPosition::TopLeft, 1),
        ];

        let resolved = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        assert_eq!(labels(&resolved), vec!["top-left#1:A"]);

        let missing = missing_bookmarks(&bookmarks, &specs);
        assert_eq!(missing.len(), 1);
        assert!(matches!(&missing[0], InsetError::MissingBookmark { name } if name == "X"));
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let bookmarks = vec![bookmark("Harbour")];
        let specs = vec![spec("harbour", InsetPosition::TopLeft, 0)];
        assert!(resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR).is_empty());
    }

    #[test]
    fn test_disabled_spec_is_excluded() {
        let bookmarks = vec![bookmark("A"), bookmark("B")];
        let mut disabled = spec("A", InsetPosition::TopLeft, 0);
        disabled.enabled = false;
        let specs = vec![disabled, spec("B", InsetPosition::TopLeft, 1)];

        let resolved = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        assert_eq!(labels(&resolved), vec!["top-left#1:B"]);
    }

    #[test]
    fn test_all_disabled_renders_nothing() {
        let bookmarks = vec![bookmark("A")];
        let mut disabled = spec("A", InsetPosition::TopLeft, 0);
        disabled.enabled = false;
        assert!(resolve(&bookmarks, &[disabled], SpatialReference::WEB_MERCATOR).is_empty());
    }

    #[test]
    fn test_repeated_names_keep_first_row() {
        let bookmarks = vec![bookmark("A")];
        let specs = vec![
            spec("A", InsetPosition::BottomRight, 0),
            spec("A", InsetPosition::TopLeft, 0),
        ];

        let resolved = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        assert_eq!(labels(&resolved), vec!["bottom-right#0:A"]);
    }

    #[test]
    fn test_disabled_first_row_hides_later_duplicate() {
        let bookmarks = vec![bookmark("A"), bookmark("B")];
        let mut disabled = spec("A", InsetPosition::TopLeft, 0);
        disabled.enabled = false;
        let specs = vec![
            disabled,
            spec("A", InsetPosition::TopLeft, 1),
            spec("B", InsetPosition::TopLeft, 2),
        ];

        let resolved = resolve(&bookmarks, &specs, SpatialReference::WEB_MERCATOR);
        assert_eq!(labels(&resolved), vec!["top-left#2:B"]);
    }
}
