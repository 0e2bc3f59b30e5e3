//! State field capability and factories.

use std::fmt;

use foxcore_command::{parse, ElementType, ParseConfig, ProcessResult};
use foxcore_core::CommandSource;

use crate::Selection;

/// A named, per-source piece of working state.
///
/// `add` and `subtract` receive the argument text left over after the field
/// name and interpret it in the field's own grammar.
pub trait StateField: fmt::Debug + Send {
    /// Display name used in messages.
    fn name(&self) -> &str;

    /// Whether the field holds nothing.
    fn is_empty(&self) -> bool;

    /// Human-readable lines describing the current contents.
    fn details(&self) -> Vec<String>;

    /// Add data to the field.
    fn add(&mut self, source: &dyn CommandSource, arguments: &str) -> ProcessResult;

    /// Remove data from the field.
    fn subtract(&mut self, source: &dyn CommandSource, arguments: &str) -> ProcessResult;

    /// Completions for [`StateField::add`].
    fn add_suggestions(&self, _source: &dyn CommandSource, _arguments: &str) -> Vec<String> {
        Vec::new()
    }

    /// Completions for [`StateField::subtract`].
    fn subtract_suggestions(&self, _source: &dyn CommandSource, _arguments: &str) -> Vec<String> {
        Vec::new()
    }

    /// Geometry held by the field, for fields that own a selection.
    fn selection(&self) -> Option<&dyn Selection> {
        None
    }
}

/// Produces fresh, empty field instances.
pub trait FieldFactory: Send + Sync {
    /// Create an empty instance.
    fn create(&self) -> Box<dyn StateField>;
}

impl<F> FieldFactory for F
where
    F: Fn() -> Box<dyn StateField> + Send + Sync,
{
    fn create(&self) -> Box<dyn StateField> {
        self()
    }
}

/// Completions for a run of block coordinates (`x y z`, possibly repeated).
///
/// Offers `~` and the source's own coordinate on the matching axis for the
/// first `arity` arguments.
pub(crate) fn coordinate_suggestions(
    source: &dyn CommandSource,
    arguments: &str,
    arity: usize,
) -> Vec<String> {
    let parse = parse(arguments, &ParseConfig::completion().with_flags(false));
    let current = &parse.current;
    match current.kind {
        ElementType::Argument if current.index < arity => {
            let mut candidates = vec!["~".to_string()];
            if let Some(pos) = source.block_position() {
                candidates.push(pos.to_array()[current.index % 3].to_string());
            }
            candidates.retain(|c| c.starts_with(current.token.as_str()));
            candidates
        }
        ElementType::Complete => vec![format!("{} ", current.prefix)],
        _ => Vec::new(),
    }
}
