//! Block coordinate arguments with `~` relative syntax.

use foxcore_core::IVec3;

use crate::CommandError;

/// One block coordinate: absolute, or an offset from the source's block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockCoordArg {
    /// Absolute block coordinate.
    Absolute(i32),
    /// Offset from the base coordinate (`~`, `~3`, `~-2`).
    Relative(i32),
}

impl BlockCoordArg {
    /// Resolve against a base coordinate.
    pub fn resolve(self, base: i32) -> i32 {
        match self {
            Self::Absolute(v) => v,
            Self::Relative(delta) => base.saturating_add(delta),
        }
    }

    /// Whether resolving needs a base position.
    pub fn is_relative(self) -> bool {
        matches!(self, Self::Relative(_))
    }
}

/// Parse `12`, `-3`, `~` or `~-2`.
pub fn parse_block_coord(s: &str) -> Result<BlockCoordArg, CommandError> {
    let s = s.trim();
    if let Some(rest) = s.strip_prefix('~') {
        if rest.is_empty() {
            return Ok(BlockCoordArg::Relative(0));
        }
        let delta = rest
            .parse::<i32>()
            .map_err(|_| CommandError::new(format!("Invalid relative block coordinate: {s}")))?;
        return Ok(BlockCoordArg::Relative(delta));
    }
    let value = s
        .parse::<i32>()
        .map_err(|_| CommandError::new(format!("Invalid block coordinate: {s}")))?;
    Ok(BlockCoordArg::Absolute(value))
}

/// Resolve three coordinate arguments into a block position.
///
/// `base` is the source's own block position; relative coordinates without one
/// are an error.
pub fn resolve_block_pos<S: AsRef<str>>(
    args: &[S],
    base: Option<IVec3>,
) -> Result<IVec3, CommandError> {
    let [x, y, z] = args else {
        return Err(CommandError::new("Usage: <x> <y> <z>"));
    };
    let coords = [
        parse_block_coord(x.as_ref())?,
        parse_block_coord(y.as_ref())?,
        parse_block_coord(z.as_ref())?,
    ];
    let base = match base {
        Some(base) => base,
        None if coords.iter().any(|c| c.is_relative()) => {
            return Err(CommandError::new(
                "Relative coordinates need a source with a position",
            ));
        }
        None => IVec3::ZERO,
    };
    Ok(IVec3::new(
        coords[0].resolve(base.x),
        coords[1].resolve(base.y),
        coords[2].resolve(base.z),
    ))
}
