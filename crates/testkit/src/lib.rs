#![warn(missing_docs)]
//! Testing surfaces shared by the workspace crates.

use foxcore_core::{permission_matches, CommandSource, DVec3, SourceId};

/// In-memory command source with configurable permissions and position.
///
/// `TestSource::new` grants every permission and has no position, like a
/// console; narrow it with [`TestSource::with_permissions`] and place it with
/// [`TestSource::at`].
#[derive(Debug, Clone, PartialEq)]
pub struct TestSource {
    id: SourceId,
    name: String,
    permissions: Vec<String>,
    position: Option<DVec3>,
}

impl TestSource {
    /// Source named `name` (also its id) holding `*`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: SourceId::new(name.clone()),
            name,
            permissions: vec!["*".to_string()],
            position: None,
        }
    }

    /// Place the source at a world position.
    pub fn at(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = Some(DVec3::new(x, y, z));
        self
    }

    /// Replace the granted permission patterns.
    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Use a different state key than the display name.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = SourceId::new(id);
        self
    }
}

impl CommandSource for TestSource {
    fn id(&self) -> &SourceId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn has_permission(&self, node: &str) -> bool {
        self.permissions
            .iter()
            .any(|granted| permission_matches(granted, node))
    }

    fn position(&self) -> Option<DVec3> {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use foxcore_core::IVec3;

    #[test]
    fn defaults_to_console_like_source() {
        let source = TestSource::new("console");
        assert_eq!(source.id().as_str(), "console");
        assert!(source.has_permission("foxcore.command.state.flush"));
        assert_eq!(source.block_position(), None);
    }

    #[test]
    fn permissions_and_position_are_configurable() {
        let source = TestSource::new("alice")
            .with_id("uuid-1")
            .with_permissions(["foxcore.command.state.*"])
            .at(-0.5, 70.2, 3.0);
        assert_eq!(source.id().as_str(), "uuid-1");
        assert_eq!(source.name(), "alice");
        assert!(source.has_permission("foxcore.command.state.add"));
        assert!(!source.has_permission("foxcore.admin"));
        assert_eq!(source.block_position(), Some(IVec3::new(-1, 70, 3)));
    }
}
