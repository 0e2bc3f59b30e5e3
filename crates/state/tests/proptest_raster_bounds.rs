//! Property-based tests for raster selection bounds
//!
//! Validates the lazily cached bounding box:
//! - After any add/remove sequence the cached bounds equal a from-scratch
//!   min/max over the resulting set
//! - An empty selection has no bounds
//! - Repeated reads between mutations agree

use std::collections::HashSet;

use foxcore_core::{BoundingBox3, IVec3};
use foxcore_state::{RasterSelection, Selection};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add(Vec<IVec3>),
    Remove(Vec<IVec3>),
    Clear,
    Query,
}

fn position() -> impl Strategy<Value = IVec3> {
    (-8i32..8, -4i32..4, -8i32..8).prop_map(|(x, y, z)| IVec3::new(x, y, z))
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => prop::collection::vec(position(), 0..5).prop_map(Op::Add),
        3 => prop::collection::vec(position(), 0..5).prop_map(Op::Remove),
        1 => Just(Op::Clear),
        2 => Just(Op::Query),
    ]
}

fn expected_bounds(set: &HashSet<IVec3>) -> Option<BoundingBox3> {
    let mut iter = set.iter();
    let first = *iter.next()?;
    let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(*p), max.max(*p)));
    Some(BoundingBox3::from_corners(min, max))
}

proptest! {
    /// Property: bounds(selection) == min/max(set) after every step
    #[test]
    fn cached_bounds_match_recomputed(ops in prop::collection::vec(op(), 0..24)) {
        let mut selection = RasterSelection::new();
        let mut model = HashSet::new();

        for op in ops {
            match op {
                Op::Add(points) => {
                    let fresh = points.iter().filter(|p| !model.contains(*p)).collect::<HashSet<_>>().len();
                    prop_assert_eq!(selection.add(points.iter().copied()), fresh);
                    model.extend(points);
                }
                Op::Remove(points) => {
                    selection.remove(points.iter().copied());
                    for p in &points {
                        model.remove(p);
                    }
                }
                Op::Clear => {
                    selection.clear();
                    model.clear();
                }
                Op::Query => {
                    let first = selection.bounds();
                    prop_assert_eq!(selection.bounds(), first);
                }
            }
            prop_assert_eq!(selection.size(), model.len());
            prop_assert_eq!(selection.bounds(), expected_bounds(&model));
        }
    }

    /// Property: every selected position lies inside the bounds
    #[test]
    fn bounds_contain_every_position(points in prop::collection::vec(position(), 1..32)) {
        let selection: RasterSelection = points.iter().copied().collect();
        let bounds = selection.bounds();
        prop_assert!(bounds.is_some());
        let bounds = bounds.unwrap();
        for p in selection.iter() {
            prop_assert!(bounds.contains(p));
            prop_assert!(selection.contains(p));
        }
    }
}

#[test]
fn empty_selection_has_no_bounds() {
    let mut selection = RasterSelection::new();
    assert_eq!(selection.bounds(), None);

    selection.add([IVec3::new(3, 3, 3)]);
    selection.remove([IVec3::new(3, 3, 3)]);
    assert_eq!(selection.bounds(), None);
    assert!(selection.is_empty());
}
