#![warn(missing_docs)]
//! Per-source working state: field types registered by ID and alias, one
//! lazily created instance per source, and the geometric selections fields
//! own.

mod error;
mod field;
mod map;
mod positions;
mod registry;
mod selection;
mod selection_field;

use std::collections::BTreeMap;

pub use error::StateError;
pub use field::{FieldFactory, StateField};
pub use map::{SourceFields, SourceStateHandle, StateMap};
pub use positions::{PositionsField, POSITIONS_ALIASES, POSITIONS_ID};
pub use registry::{FieldDescriptor, FieldRegistry};
pub use selection::{RasterSelection, Selection};
pub use selection_field::{SelectionField, DEFAULT_MAX_FILL, SELECTION_ALIASES, SELECTION_ID};

/// Tunables for the built-in field types.
#[derive(Debug, Clone)]
pub struct FieldOptions {
    /// Largest cuboid a single selection operation may touch.
    pub max_fill: u64,
    /// Extra aliases keyed by built-in field ID.
    pub extra_aliases: BTreeMap<String, Vec<String>>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            max_fill: DEFAULT_MAX_FILL,
            extra_aliases: BTreeMap::new(),
        }
    }
}

/// Register `positions` and `selection` with any configured extra aliases.
///
/// A collision aborts with [`StateError::DuplicateIdentifier`]; extra aliases
/// keyed by an unknown ID yield [`StateError::UnknownFieldType`].
pub fn register_builtin_fields(
    registry: &mut FieldRegistry,
    options: &FieldOptions,
) -> Result<(), StateError> {
    if let Some(id) = options
        .extra_aliases
        .keys()
        .find(|id| !matches!(id.to_lowercase().as_str(), POSITIONS_ID | SELECTION_ID))
    {
        return Err(StateError::UnknownFieldType(id.clone()));
    }

    let extra = |id: &str| {
        options
            .extra_aliases
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(id))
            .flat_map(|(_, aliases)| aliases.iter().cloned())
            .collect::<Vec<_>>()
    };

    registry.register(PositionsField::descriptor().with_aliases(extra(POSITIONS_ID)))?;
    registry.register(
        SelectionField::descriptor(options.max_fill).with_aliases(extra(SELECTION_ID)),
    )?;
    Ok(())
}
