#![warn(missing_docs)]
//! Command plumbing shared by every command adapter: the argument parser,
//! process results and the relative coordinate grammar.

mod coord;
mod parse;
mod result;

use std::fmt;

pub use coord::{parse_block_coord, resolve_block_pos, BlockCoordArg};
pub use parse::{
    parse, quote_argument, CurrentElement, ElementType, ParseAmbiguity, ParseConfig, ParseResult,
};
pub use result::ProcessResult;

/// User-facing command failure (bad usage, unknown names, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandError {
    message: String,
}

impl CommandError {
    /// Create an error carrying a message shown to the source.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Message shown to the source.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CommandError {}

/// Keep the candidates that start with `token`, ignoring ASCII case.
pub fn starting_with<'a, I>(candidates: I, token: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let token = token.to_ascii_lowercase();
    candidates
        .into_iter()
        .filter(|c| c.to_ascii_lowercase().starts_with(&token))
        .map(str::to_string)
        .collect()
}
