//! Axis-aligned integer bounding boxes.
//!
//! Both corners are inclusive block positions: a box built from a single
//! position contains exactly that one block. A collection with no positions has
//! no box at all, so callers deal in `Option<BoundingBox3>` rather than a
//! zero-sized sentinel.

use std::fmt;

use glam::{DVec3, IVec3};

use crate::block_pos;

/// Inclusive axis-aligned box over block positions.
///
/// Invariant: `min` is component-wise `<=` `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundingBox3 {
    min: IVec3,
    max: IVec3,
}

impl BoundingBox3 {
    /// Build a box from two opposite corners given in any order.
    pub fn from_corners(a: IVec3, b: IVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = IVec3>,
    {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Lowest corner.
    pub fn min(&self) -> IVec3 {
        self.min
    }

    /// Highest corner.
    pub fn max(&self) -> IVec3 {
        self.max
    }

    /// Smallest box containing both boxes.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Whether the boxes share at least one block.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Overlapping region of both boxes, if any.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }
        Some(Self {
            min: self.min.max(other.min),
            max: self.max.min(other.max),
        })
    }

    /// Whether the block position lies inside the box.
    pub fn contains(&self, pos: IVec3) -> bool {
        self.min.cmple(pos).all() && pos.cmple(self.max).all()
    }

    /// Whether the block cell containing `point` lies inside the box.
    /// Non-finite points are never contained.
    pub fn contains_point(&self, point: DVec3) -> bool {
        block_pos(point).is_some_and(|pos| self.contains(pos))
    }

    /// Extent in blocks along each axis.
    pub fn size(&self) -> [u64; 3] {
        let extent = |lo: i32, hi: i32| (i64::from(hi) - i64::from(lo) + 1) as u64;
        [
            extent(self.min.x, self.max.x),
            extent(self.min.y, self.max.y),
            extent(self.min.z, self.max.z),
        ]
    }

    /// Number of blocks inside the box, saturating at `u64::MAX`.
    pub fn volume(&self) -> u64 {
        let [x, y, z] = self.size();
        x.saturating_mul(y).saturating_mul(z)
    }

    /// Every block position in the box, x fastest, then z, then y.
    pub fn positions(&self) -> impl Iterator<Item = IVec3> {
        let (min, max) = (self.min, self.max);
        (min.y..=max.y).flat_map(move |y| {
            (min.z..=max.z).flat_map(move |z| (min.x..=max.x).map(move |x| IVec3::new(x, y, z)))
        })
    }
}

impl fmt::Display for BoundingBox3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}) -> ({}, {}, {})",
            self.min.x, self.min.y, self.min.z, self.max.x, self.max.y, self.max.z
        )
    }
}
