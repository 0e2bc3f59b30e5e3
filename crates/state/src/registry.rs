//! State field registry.
//!
//! Field types are registered once during startup under a stable ID plus any
//! number of aliases. Every name resolves to exactly one field type: a
//! registration that would reuse a taken name is rejected as a whole. Names
//! are matched case-insensitively.

use std::collections::HashMap;
use std::fmt;

use tracing::{info, warn};

use crate::{FieldFactory, StateError, StateField};

/// Registration record for one field type.
pub struct FieldDescriptor {
    id: String,
    primary_alias: Option<String>,
    aliases: Vec<String>,
    factory: Box<dyn FieldFactory>,
}

impl FieldDescriptor {
    /// Describe a field type with its canonical ID and factory.
    pub fn new(id: &str, factory: impl FieldFactory + 'static) -> Self {
        Self {
            id: normalize(id),
            primary_alias: None,
            aliases: Vec::new(),
            factory: Box::new(factory),
        }
    }

    /// Add lookup aliases.
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for alias in aliases {
            let alias = normalize(alias.as_ref());
            if !alias.is_empty() && alias != self.id && !self.aliases.contains(&alias) {
                self.aliases.push(alias);
            }
        }
        self
    }

    /// Set the name shown to users in suggestions. Defaults to the ID.
    pub fn with_primary_alias(mut self, alias: &str) -> Self {
        let alias = normalize(alias);
        self = self.with_aliases([alias.as_str()]);
        self.primary_alias = Some(alias);
        self
    }

    /// Canonical ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Aliases, excluding the ID itself.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Display name for suggestions.
    pub fn primary_alias(&self) -> &str {
        self.primary_alias.as_deref().unwrap_or(&self.id)
    }

    /// Create a fresh, empty field instance.
    pub fn create(&self) -> Box<dyn StateField> {
        self.factory.create()
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.id.as_str()).chain(self.aliases.iter().map(String::as_str))
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("id", &self.id)
            .field("primary_alias", &self.primary_alias())
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

/// Mapping from field IDs and aliases to field types.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    descriptors: Vec<FieldDescriptor>,
    names: HashMap<String, usize>,
}

impl FieldRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field type.
    ///
    /// Fails with [`StateError::DuplicateIdentifier`] if the ID or any alias
    /// is already taken; the registry is left unchanged in that case.
    pub fn register(&mut self, descriptor: FieldDescriptor) -> Result<(), StateError> {
        if let Some((name, &index)) = descriptor
            .names()
            .find_map(|name| self.names.get(name).map(|index| (name, index)))
        {
            let existing = self.descriptors[index].id.clone();
            warn!(
                field = descriptor.id(),
                identifier = name,
                existing = existing.as_str(),
                "Rejected state field registration"
            );
            return Err(StateError::DuplicateIdentifier {
                identifier: name.to_string(),
                existing,
            });
        }

        let index = self.descriptors.len();
        for name in descriptor.names() {
            self.names.insert(name.to_string(), index);
        }
        info!(
            field = descriptor.id(),
            aliases = ?descriptor.aliases(),
            "Registered state field"
        );
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Canonical ID for an ID or alias.
    pub fn resolve_id(&self, name: &str) -> Option<&str> {
        self.resolve(name).map(FieldDescriptor::id)
    }

    /// Descriptor for an ID or alias.
    pub fn resolve(&self, name: &str) -> Option<&FieldDescriptor> {
        let index = *self.names.get(&normalize(name))?;
        self.descriptors.get(index)
    }

    /// One display alias per field type, in registration order.
    pub fn primary_aliases(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .map(FieldDescriptor::primary_alias)
            .collect()
    }

    /// Registered descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.descriptors.iter()
    }

    /// Number of registered field types.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true when no field types are registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
