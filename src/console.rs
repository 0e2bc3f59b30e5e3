use foxcore_core::{permission_matches, CommandSource, DVec3, SourceId};

use crate::config::ConsoleConfig;

/// A command source living in this process: the interactive console or a
/// named script participant.
#[derive(Debug, Clone)]
pub struct LocalSource {
    id: SourceId,
    name: String,
    permissions: Vec<String>,
    position: Option<DVec3>,
}

impl LocalSource {
    pub fn from_config(config: &ConsoleConfig) -> Self {
        Self {
            id: SourceId::new(config.name.clone()),
            name: config.name.clone(),
            permissions: config.permissions.clone(),
            position: config.position.map(DVec3::from_array),
        }
    }

    /// Same grants and position as `template`, under another identity.
    pub fn named(template: &Self, name: &str) -> Self {
        Self {
            id: SourceId::new(name),
            name: name.to_string(),
            ..template.clone()
        }
    }
}

impl CommandSource for LocalSource {
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
