//! Per-source state map.
//!
//! Every command source owns an isolated set of field instances, created on
//! first use. The outer lock is held only long enough to find or create the
//! source's entry; every field operation then runs under that source's own
//! mutex, so a `flush` and a `subtract` from the same source never interleave
//! while different sources proceed independently.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use foxcore_core::SourceId;
use tracing::debug;

use crate::{FieldRegistry, StateError, StateField};

#[derive(Debug, Default)]
struct SourceState {
    fields: BTreeMap<String, Box<dyn StateField>>,
}

/// Owner of every source's field instances.
#[derive(Debug)]
pub struct StateMap {
    registry: Arc<FieldRegistry>,
    sources: Mutex<HashMap<SourceId, Arc<Mutex<SourceState>>>>,
}

impl StateMap {
    /// Create an empty map resolving field names through `registry`.
    pub fn new(registry: Arc<FieldRegistry>) -> Self {
        Self {
            registry,
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Registry used to resolve field names.
    pub fn registry(&self) -> &Arc<FieldRegistry> {
        &self.registry
    }

    /// Handle to the source's field set, creating an empty one if absent.
    pub fn state_for(&self, source: &SourceId) -> SourceStateHandle {
        let state = {
            let mut sources = self.sources();
            Arc::clone(sources.entry(source.clone()).or_insert_with(|| {
                debug!(source = source.as_str(), "Created source state");
                Arc::default()
            }))
        };
        SourceStateHandle {
            source: source.clone(),
            state,
            registry: Arc::clone(&self.registry),
        }
    }

    /// Reset every field of the source. Untouched sources are left absent.
    pub fn flush(&self, source: &SourceId) {
        let state = self.sources().get(source).cloned();
        if let Some(state) = state {
            SourceFields {
                source,
                state: state.lock().unwrap_or_else(PoisonError::into_inner),
                registry: &self.registry,
            }
            .flush();
        }
    }

    /// Reset one field of the source, creating it empty if needed.
    pub fn flush_field(&self, source: &SourceId, name: &str) -> Result<(), StateError> {
        self.state_for(source).lock().flush_field(name)
    }

    /// Drop all state of a departing source. Returns whether it had any.
    pub fn release(&self, source: &SourceId) -> bool {
        let released = self.sources().remove(source).is_some();
        if released {
            debug!(source = source.as_str(), "Released source state");
        }
        released
    }

    /// Number of sources currently holding state.
    pub fn source_count(&self) -> usize {
        self.sources().len()
    }

    fn sources(&self) -> MutexGuard<'_, HashMap<SourceId, Arc<Mutex<SourceState>>>> {
        self.sources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A source's field set, detached from the map's outer lock.
#[derive(Debug, Clone)]
pub struct SourceStateHandle {
    source: SourceId,
    state: Arc<Mutex<SourceState>>,
    registry: Arc<FieldRegistry>,
}

impl SourceStateHandle {
    /// Source owning this state.
    pub fn source(&self) -> &SourceId {
        &self.source
    }

    /// Take the source's lock for the duration of one operation.
    pub fn lock(&self) -> SourceFields<'_> {
        SourceFields {
            source: &self.source,
            state: self.state.lock().unwrap_or_else(PoisonError::into_inner),
            registry: &self.registry,
        }
    }
}

/// Locked view of one source's fields.
#[derive(Debug)]
pub struct SourceFields<'a> {
    source: &'a SourceId,
    state: MutexGuard<'a, SourceState>,
    registry: &'a FieldRegistry,
}

impl SourceFields<'_> {
    /// Reset every field back to empty.
    pub fn flush(&mut self) {
        let count = self.state.fields.len();
        self.state.fields.clear();
        debug!(source = self.source.as_str(), fields = count, "Flushed all fields");
    }

    /// Reinitialize exactly one field, creating it empty if it did not exist.
    pub fn flush_field(&mut self, name: &str) -> Result<(), StateError> {
        let descriptor = self
            .registry
            .resolve(name)
            .ok_or_else(|| StateError::UnknownFieldType(name.to_string()))?;
        self.state
            .fields
            .insert(descriptor.id().to_string(), descriptor.create());
        debug!(
            source = self.source.as_str(),
            field = descriptor.id(),
            "Flushed field"
        );
        Ok(())
    }

    /// Field for an ID or alias, created on first access.
    pub fn get_or_create_from_alias(
        &mut self,
        name: &str,
    ) -> Result<&mut dyn StateField, StateError> {
        let (registry, source) = (self.registry, self.source);
        let descriptor = registry
            .resolve(name)
            .ok_or_else(|| StateError::UnknownFieldType(name.to_string()))?;
        let field = self
            .state
            .fields
            .entry(descriptor.id().to_string())
            .or_insert_with(|| {
                debug!(source = source.as_str(), field = descriptor.id(), "Created field");
                descriptor.create()
            });
        Ok(field.as_mut())
    }

    /// Existing field for an ID or alias, without creating it.
    pub fn get(&self, name: &str) -> Option<&dyn StateField> {
        let id = self.registry.resolve_id(name)?;
        self.state.fields.get(id).map(|field| field.as_ref())
    }

    /// Instantiated fields ordered by ID.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &dyn StateField)> + '_ {
        self.state
            .fields
            .iter()
            .map(|(id, field)| (id.as_str(), field.as_ref()))
    }

    /// Number of instantiated fields.
    pub fn len(&self) -> usize {
        self.state.fields.len()
    }

    /// Returns true when no field has been instantiated.
    pub fn is_empty(&self) -> bool {
        self.state.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldDescriptor, PositionsField};
    use foxcore_core::CommandSource;
    use foxcore_testkit::TestSource;

    fn map() -> StateMap {
        let mut registry = FieldRegistry::new();
        registry.register(PositionsField::descriptor()).unwrap();
        StateMap::new(Arc::new(registry))
    }

    #[test]
    fn fields_are_created_lazily_and_cached() {
        let map = map();
        let alice = TestSource::new("alice");
        let handle = map.state_for(alice.id());
        let mut fields = handle.lock();
        assert!(fields.is_empty());
        assert!(fields.get("pos").is_none());

        fields
            .get_or_create_from_alias("pos")
            .unwrap()
            .add(&alice, "1 2 3");
        assert_eq!(fields.len(), 1);
        assert!(!fields.get_or_create_from_alias("POSITIONS").unwrap().is_empty());
        assert_eq!(fields.fields().map(|(id, _)| id).collect::<Vec<_>>(), vec!["positions"]);
    }

    #[test]
    fn unknown_field_type() {
        let map = map();
        let handle = map.state_for(&SourceId::new("alice"));
        let mut fields = handle.lock();
        assert_eq!(
            fields.get_or_create_from_alias("wand").unwrap_err(),
            StateError::UnknownFieldType("wand".to_string())
        );
        assert_eq!(
            fields.flush_field("wand").unwrap_err().to_string(),
            "\"wand\" is not a valid field type!"
        );
    }

    #[test]
    fn flush_field_on_untouched_field_succeeds() {
        let map = map();
        let alice = SourceId::new("alice");
        map.flush_field(&alice, "p").unwrap();
        let handle = map.state_for(&alice);
        let fields = handle.lock();
        assert!(fields.get("positions").is_some_and(|field| field.is_empty()));
    }

    #[test]
    fn flush_of_unknown_source_does_not_create_it() {
        let map = map();
        map.flush(&SourceId::new("ghost"));
        assert_eq!(map.source_count(), 0);
    }

    #[test]
    fn release_drops_state() {
        let map = map();
        let alice = TestSource::new("alice");
        map.state_for(alice.id())
            .lock()
            .get_or_create_from_alias("pos")
            .unwrap()
            .add(&alice, "0 0 0");
        assert_eq!(map.source_count(), 1);
        assert!(map.release(alice.id()));
        assert!(!map.release(alice.id()));

        let handle = map.state_for(alice.id());
        assert!(handle.lock().is_empty());
    }

    #[test]
    fn custom_factories_are_used() {
        let mut registry = FieldRegistry::new();
        registry
            .register(
                FieldDescriptor::new("points", || -> Box<dyn StateField> {
                    Box::new(PositionsField::new())
                })
                .with_aliases(["pts"]),
            )
            .unwrap();
        let map = StateMap::new(Arc::new(registry));
        let handle = map.state_for(&SourceId::new("alice"));
        let mut fields = handle.lock();
        assert_eq!(fields.get_or_create_from_alias("pts").unwrap().name(), "positions");
    }
}
