//! Geometric selections owned by state fields.

use std::cell::Cell;
use std::collections::HashSet;
use std::fmt;

use foxcore_command::ProcessResult;
use foxcore_core::{block_pos, BoundingBox3, CommandSource, DVec3, IVec3};

use crate::StateError;

/// A geometric collection of block positions with derived bounds.
pub trait Selection: fmt::Debug + Send {
    /// Short kind label, e.g. `raster`.
    fn kind(&self) -> &'static str;

    /// Number of positions in the selection.
    fn size(&self) -> usize;

    /// Whether the selection holds no positions.
    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Bounding box of all positions; `None` when empty.
    fn bounds(&self) -> Option<BoundingBox3>;

    /// Whether the block position is selected.
    fn contains(&self, pos: IVec3) -> bool;

    /// Whether the block cell containing `point` is selected (floored).
    /// Non-finite points are never selected.
    fn contains_point(&self, point: DVec3) -> bool {
        block_pos(point).is_some_and(|pos| self.contains(pos))
    }

    /// Apply a textual mutation in the selection's own grammar
    /// (e.g. `sphere 5`).
    fn modify(
        &mut self,
        source: &dyn CommandSource,
        arguments: &str,
    ) -> Result<ProcessResult, StateError>;

    /// Completions for [`Selection::modify`].
    fn modify_suggestions(
        &self,
        source: &dyn CommandSource,
        arguments: &str,
    ) -> Result<Vec<String>, StateError>;
}

/// Selection backed by an explicit set of block positions.
///
/// Bounds are computed lazily: mutations only mark the cache dirty, and the
/// next [`Selection::bounds`] call rescans the set once.
#[derive(Debug, Default, Clone)]
pub struct RasterSelection {
    positions: HashSet<IVec3>,
    bounds: Cell<Option<BoundingBox3>>,
    dirty: Cell<bool>,
}

impl RasterSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert positions, returning how many were not already selected.
    pub fn add<I>(&mut self, positions: I) -> usize
    where
        I: IntoIterator<Item = IVec3>,
    {
        self.dirty.set(true);
        positions
            .into_iter()
            .filter(|pos| self.positions.insert(*pos))
            .count()
    }

    /// Remove positions, returning how many were selected.
    pub fn remove<I>(&mut self, positions: I) -> usize
    where
        I: IntoIterator<Item = IVec3>,
    {
        self.dirty.set(true);
        positions
            .into_iter()
            .filter(|pos| self.positions.remove(pos))
            .count()
    }

    /// Remove every position.
    pub fn clear(&mut self) {
        self.positions.clear();
        self.dirty.set(true);
    }

    /// Iterate over the selected positions in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = IVec3> + '_ {
        self.positions.iter().copied()
    }

    fn recalculate_bounds(&self) {
        if self.dirty.get() {
            self.bounds
                .set(BoundingBox3::from_points(self.positions.iter().copied()));
            self.dirty.set(false);
        }
    }
}

impl FromIterator<IVec3> for RasterSelection {
    fn from_iter<I: IntoIterator<Item = IVec3>>(iter: I) -> Self {
        let mut selection = Self::new();
        selection.add(iter);
        selection
    }
}

impl Selection for RasterSelection {
    fn kind(&self) -> &'static str {
        "raster"
    }

    fn size(&self) -> usize {
        self.positions.len()
    }

    fn bounds(&self) -> Option<BoundingBox3> {
        self.recalculate_bounds();
        self.bounds.get()
    }

    fn contains(&self, pos: IVec3) -> bool {
        self.positions.contains(&pos)
    }

    fn modify(
        &mut self,
        _source: &dyn CommandSource,
        arguments: &str,
    ) -> Result<ProcessResult, StateError> {
        Err(unsupported(self.kind(), arguments))
    }

    fn modify_suggestions(
        &self,
        _source: &dyn CommandSource,
        arguments: &str,
    ) -> Result<Vec<String>, StateError> {
        Err(unsupported(self.kind(), arguments))
    }
}

fn unsupported(kind: &'static str, arguments: &str) -> StateError {
    let operation = arguments
        .split_whitespace()
        .next()
        .unwrap_or("modify")
        .to_string();
    StateError::UnsupportedOperation { kind, operation }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foxcore_testkit::TestSource;

    #[test]
    fn empty_selection_has_no_bounds() {
        let selection = RasterSelection::new();
        assert!(selection.is_empty());
        assert_eq!(selection.bounds(), None);
    }

    #[test]
    fn bounds_follow_mutations() {
        let mut selection = RasterSelection::new();
        assert_eq!(selection.add([IVec3::new(1, 2, 3)]), 1);
        assert_eq!(
            selection.bounds(),
            Some(BoundingBox3::from_corners(IVec3::new(1, 2, 3), IVec3::new(1, 2, 3)))
        );

        selection.add([IVec3::new(-5, 10, 0), IVec3::new(1, 2, 3)]);
        assert_eq!(selection.size(), 2);
        assert_eq!(
            selection.bounds(),
            Some(BoundingBox3::from_corners(IVec3::new(-5, 2, 0), IVec3::new(1, 10, 3)))
        );

        assert_eq!(selection.remove([IVec3::new(-5, 10, 0), IVec3::new(9, 9, 9)]), 1);
        assert_eq!(
            selection.bounds(),
            Some(BoundingBox3::from_corners(IVec3::new(1, 2, 3), IVec3::new(1, 2, 3)))
        );

        selection.clear();
        assert_eq!(selection.bounds(), None);
    }

    #[test]
    fn cached_bounds_are_reused_until_dirty() {
        let mut selection: RasterSelection = [IVec3::ZERO, IVec3::ONE].into_iter().collect();
        let first = selection.bounds();
        assert!(!selection.dirty.get());
        assert_eq!(selection.bounds(), first);

        selection.add([IVec3::ZERO]);
        assert!(selection.dirty.get());
        assert_eq!(selection.bounds(), first);
        assert!(!selection.dirty.get());
    }

    #[test]
    fn contains_floors_float_points() {
        let selection: RasterSelection = [IVec3::new(-1, 0, -1)].into_iter().collect();
        assert!(selection.contains(IVec3::new(-1, 0, -1)));
        assert!(selection.contains_point(DVec3::new(-0.5, 0.5, -0.01)));
        assert!(!selection.contains_point(DVec3::new(0.5, 0.5, -0.5)));
    }

    #[test]
    fn non_finite_points_are_never_selected() {
        let selection: RasterSelection = [IVec3::ZERO].into_iter().collect();
        assert!(selection.contains_point(DVec3::ZERO));
        assert!(!selection.contains_point(DVec3::NAN));
        assert!(!selection.contains_point(DVec3::new(0.2, f64::NAN, 0.2)));
        assert!(!selection.contains_point(DVec3::INFINITY));
        assert!(!selection.contains_point(DVec3::NEG_INFINITY));
    }

    #[test]
    fn modify_is_unsupported() {
        let source = TestSource::new("alice");
        let mut selection = RasterSelection::new();
        let err = selection.modify(&source, "sphere 5").unwrap_err();
        assert_eq!(
            err,
            StateError::UnsupportedOperation {
                kind: "raster",
                operation: "sphere".to_string()
            }
        );
        assert!(selection.modify_suggestions(&source, "").is_err());
    }
}
