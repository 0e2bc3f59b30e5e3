use thiserror::Error;

/// Errors raised by the state registry, the per-source map and selections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// A field ID or alias is already taken. Fatal during startup.
    #[error("\"{identifier}\" is already registered to field type \"{existing}\"")]
    DuplicateIdentifier {
        /// The colliding ID or alias.
        identifier: String,
        /// Canonical ID of the field type that already owns it.
        existing: String,
    },
    /// No field type is registered under the name.
    #[error("\"{0}\" is not a valid field type!")]
    UnknownFieldType(String),
    /// The selection variant does not implement the requested mutation.
    #[error("{kind} selections do not support \"{operation}\"")]
    UnsupportedOperation {
        /// Selection kind, e.g. `raster`.
        kind: &'static str,
        /// The rejected operation.
        operation: String,
    },
}
