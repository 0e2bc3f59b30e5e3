//! The `positions` field: an ordered list of block positions.

use foxcore_command::{
    parse, resolve_block_pos, starting_with, ElementType, ParseConfig, ProcessResult,
};
use foxcore_core::{BoundingBox3, CommandSource, IVec3};

use crate::field::coordinate_suggestions;
use crate::{FieldDescriptor, StateField};

/// Canonical ID of the positions field.
pub const POSITIONS_ID: &str = "positions";

/// Lookup aliases of the positions field.
pub const POSITIONS_ALIASES: [&str; 4] = ["position", "pos", "p", "points"];

/// Ordered block positions, duplicates allowed.
#[derive(Debug, Default, Clone)]
pub struct PositionsField {
    positions: Vec<IVec3>,
}

impl PositionsField {
    /// Create an empty field.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registration record with the built-in ID and aliases.
    pub fn descriptor() -> FieldDescriptor {
        FieldDescriptor::new(POSITIONS_ID, || -> Box<dyn StateField> { Box::new(Self::new()) })
            .with_aliases(POSITIONS_ALIASES)
    }

    /// Positions in insertion order.
    pub fn positions(&self) -> &[IVec3] {
        &self.positions
    }

    /// Box around every position.
    pub fn bounds(&self) -> Option<BoundingBox3> {
        BoundingBox3::from_points(self.positions.iter().copied())
    }
}

impl StateField for PositionsField {
    fn name(&self) -> &str {
        "positions"
    }

    fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn details(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .positions
            .iter()
            .enumerate()
            .map(|(i, p)| format!("#{}: ({}, {}, {})", i + 1, p.x, p.y, p.z))
            .collect();
        if let Some(bounds) = self.bounds() {
            lines.push(format!("Bounds: {bounds}"));
        }
        lines
    }

    fn add(&mut self, source: &dyn CommandSource, arguments: &str) -> ProcessResult {
        let parse = parse(arguments, &ParseConfig::default().with_flags(false));
        let pos = if parse.args.is_empty() {
            match source.block_position() {
                Some(pos) => pos,
                None => {
                    return ProcessResult::failure_with(
                        "You must specify coordinates when you have no position!",
                    )
                }
            }
        } else {
            match resolve_block_pos(&parse.args, source.block_position()) {
                Ok(pos) => pos,
                Err(err) => return ProcessResult::failure_with(err.message()),
            }
        };

        self.positions.push(pos);
        ProcessResult::success_with(format!(
            "Successfully added position ({}, {}, {}) as #{}!",
            pos.x,
            pos.y,
            pos.z,
            self.positions.len()
        ))
    }

    fn subtract(&mut self, _source: &dyn CommandSource, arguments: &str) -> ProcessResult {
        if self.positions.is_empty() {
            return ProcessResult::failure_with("You don't have any positions!");
        }
        let parse = parse(arguments, &ParseConfig::default().with_flags(false));
        match parse.args.as_slice() {
            [] => {
                let len = self.positions.len();
                self.positions.pop();
                ProcessResult::success_with(format!("Successfully removed position #{len}!"))
            }
            [all] if all == "all" || all == "*" => {
                let count = self.positions.len();
                self.positions.clear();
                ProcessResult::success_with(format!("Successfully removed {count} positions!"))
            }
            [index] => match index.parse::<usize>() {
                Ok(n) if (1..=self.positions.len()).contains(&n) => {
                    self.positions.remove(n - 1);
                    ProcessResult::success_with(format!("Successfully removed position #{n}!"))
                }
                _ => ProcessResult::failure_with(format!("\"{index}\" is not a valid position index!")),
            },
            _ => ProcessResult::failure_with("Usage: subtract positions [index|all]"),
        }
    }

    fn add_suggestions(&self, source: &dyn CommandSource, arguments: &str) -> Vec<String> {
        coordinate_suggestions(source, arguments, 3)
    }

    fn subtract_suggestions(&self, _source: &dyn CommandSource, arguments: &str) -> Vec<String> {
        let parse = parse(arguments, &ParseConfig::completion().with_flags(false));
        match parse.current.kind {
            ElementType::Argument if parse.current.index == 0 => {
                let mut candidates: Vec<String> =
                    (1..=self.positions.len()).map(|n| n.to_string()).collect();
                candidates.push("all".to_string());
                starting_with(candidates.iter().map(String::as_str), &parse.current.token)
            }
            _ => Vec::new(),
        }
    }
}
