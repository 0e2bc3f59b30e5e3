#![warn(missing_docs)]
//! Core primitives shared across the workspace: coordinates, bounding boxes
//! and the identity of whoever issues a command.

pub mod bounds;
pub mod source;

// Re-export commonly used types
pub use bounds::BoundingBox3;
pub use glam::{DVec3, IVec3};
pub use source::{permission_matches, CommandSource, SourceId};

/// Block cell containing a world-space point.
///
/// Uses floor (toward negative infinity) so `-0.5` lands in cell `-1`, not `0`.
/// NaN and infinite points lie in no cell.
pub fn block_pos(point: DVec3) -> Option<IVec3> {
    point.is_finite().then(|| point.floor().as_ivec3())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_pos_floors_negative_coordinates() {
        assert_eq!(block_pos(DVec3::new(1.9, 64.2, 0.0)), Some(IVec3::new(1, 64, 0)));
        assert_eq!(
            block_pos(DVec3::new(-0.5, -1.0, -1.01)),
            Some(IVec3::new(-1, -1, -2))
        );
    }

    #[test]
    fn non_finite_points_have_no_cell() {
        assert_eq!(block_pos(DVec3::NAN), None);
        assert_eq!(block_pos(DVec3::new(0.0, f64::NAN, 0.0)), None);
        assert_eq!(block_pos(DVec3::INFINITY), None);
        assert_eq!(block_pos(DVec3::new(0.0, 0.0, f64::NEG_INFINITY)), None);
    }
}
