//! Command sources.
//!
//! A source is whoever issues a command: a connected player, the console, a
//! script. Per-source working state is keyed by [`SourceId`], so two sources
//! with the same display name but different ids never share state.

use std::fmt;

use glam::{DVec3, IVec3};

use crate::block_pos;

/// Stable identity of a command source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Wrap an identifier (player UUID, `"console"`, ...).
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity issuing a command.
pub trait CommandSource {
    /// Key used for per-source state isolation.
    fn id(&self) -> &SourceId;

    /// Human-readable name used in messages.
    fn name(&self) -> &str;

    /// Whether the source holds the permission node (e.g. `foxcore.command.state.flush`).
    fn has_permission(&self, node: &str) -> bool;

    /// World position of the source, if it has one. The console does not.
    fn position(&self) -> Option<DVec3> {
        None
    }

    /// Block cell the source is standing in.
    fn block_position(&self) -> Option<IVec3> {
        self.position().and_then(block_pos)
    }
}

/// Check a granted permission pattern against a requested node.
///
/// Patterns are exact nodes, `*` (everything) or `prefix.*` (the prefix node
/// and everything below it).
pub fn permission_matches(granted: &str, node: &str) -> bool {
    if granted == "*" || granted == node {
        return true;
    }
    match granted.strip_suffix(".*") {
        Some(prefix) => {
            node == prefix
                || node
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('.'))
        }
        None => false,
    }
}
