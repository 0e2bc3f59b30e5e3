//! The `selection` field: a raster selection built block by block or cuboid by
//! cuboid.

use foxcore_command::{parse, parse_block_coord, resolve_block_pos, ParseConfig, ProcessResult};
use foxcore_core::{BoundingBox3, CommandSource, IVec3};

use crate::field::coordinate_suggestions;
use crate::{FieldDescriptor, RasterSelection, Selection, StateField};

/// Canonical ID of the selection field.
pub const SELECTION_ID: &str = "selection";

/// Lookup aliases of the selection field.
pub const SELECTION_ALIASES: [&str; 3] = ["sel", "raster", "region"];

/// Default cap on positions touched by one cuboid operation.
pub const DEFAULT_MAX_FILL: u64 = 65_536;

/// Raster selection owned by a source.
///
/// Grammar for `add` / `subtract`:
/// - nothing: the source's own block;
/// - `x y z`: one block;
/// - `x1 y1 z1 x2 y2 z2`: every block of the cuboid.
///
/// Anything that does not start with a coordinate goes to
/// [`Selection::modify`].
#[derive(Debug)]
pub struct SelectionField {
    selection: RasterSelection,
    max_fill: u64,
}

enum Target {
    Block(IVec3),
    Cuboid(BoundingBox3),
}

impl SelectionField {
    /// Create an empty field refusing cuboids above `max_fill` blocks.
    pub fn new(max_fill: u64) -> Self {
        Self {
            selection: RasterSelection::new(),
            max_fill,
        }
    }

    /// Registration record with the built-in ID and aliases.
    pub fn descriptor(max_fill: u64) -> FieldDescriptor {
        FieldDescriptor::new(SELECTION_ID, move || -> Box<dyn StateField> {
            Box::new(Self::new(max_fill))
        })
        .with_aliases(SELECTION_ALIASES)
    }

    /// The underlying raster selection.
    pub fn raster(&self) -> &RasterSelection {
        &self.selection
    }

    fn target(&self, source: &dyn CommandSource, args: &[String]) -> Result<Target, String> {
        let base = source.block_position();
        match args.len() {
            0 => base
                .map(Target::Block)
                .ok_or_else(|| "You must specify coordinates when you have no position!".to_string()),
            3 => resolve_block_pos(args, base)
                .map(Target::Block)
                .map_err(|err| err.to_string()),
            6 => {
                let a = resolve_block_pos(&args[..3], base).map_err(|err| err.to_string())?;
                let b = resolve_block_pos(&args[3..], base).map_err(|err| err.to_string())?;
                let cuboid = BoundingBox3::from_corners(a, b);
                if cuboid.volume() > self.max_fill {
                    return Err(format!(
                        "That region holds {} blocks; the limit is {}!",
                        cuboid.volume(),
                        self.max_fill
                    ));
                }
                Ok(Target::Cuboid(cuboid))
            }
            _ => Err("Usage: [x y z] or <x1 y1 z1 x2 y2 z2>".to_string()),
        }
    }

    fn delegates(args: &[String]) -> bool {
        args.first()
            .is_some_and(|first| parse_block_coord(first).is_err())
    }
}

impl StateField for SelectionField {
    fn name(&self) -> &str {
        "selection"
    }

    fn is_empty(&self) -> bool {
        self.selection.is_empty()
    }

    fn details(&self) -> Vec<String> {
        match self.selection.bounds() {
            Some(bounds) => vec![
                format!("{} {} positions", self.selection.size(), self.selection.kind()),
                format!("Bounds: {bounds}"),
            ],
            None => Vec::new(),
        }
    }

    fn add(&mut self, source: &dyn CommandSource, arguments: &str) -> ProcessResult {
        let parse = parse(arguments, &ParseConfig::default().with_flags(false));
        if Self::delegates(&parse.args) {
            return self
                .selection
                .modify(source, arguments)
                .unwrap_or_else(|err| ProcessResult::failure_with(err.to_string()));
        }
        let added = match self.target(source, &parse.args) {
            Ok(Target::Block(pos)) => self.selection.add([pos]),
            Ok(Target::Cuboid(cuboid)) => self.selection.add(cuboid.positions()),
            Err(message) => return ProcessResult::failure_with(message),
        };
        ProcessResult::success_with(format!(
            "Successfully added {added} positions to the selection ({} total)!",
            self.selection.size()
        ))
    }

    fn subtract(&mut self, source: &dyn CommandSource, arguments: &str) -> ProcessResult {
        let parse = parse(arguments, &ParseConfig::default().with_flags(false));
        if Self::delegates(&parse.args) {
            return self
                .selection
                .modify(source, arguments)
                .unwrap_or_else(|err| ProcessResult::failure_with(err.to_string()));
        }
        let removed = match self.target(source, &parse.args) {
            Ok(Target::Block(pos)) => self.selection.remove([pos]),
            Ok(Target::Cuboid(cuboid)) => self.selection.remove(cuboid.positions()),
            Err(message) => return ProcessResult::failure_with(message),
        };
        ProcessResult::success_with(format!(
            "Successfully removed {removed} positions from the selection ({} left)!",
            self.selection.size()
        ))
    }

    fn add_suggestions(&self, source: &dyn CommandSource, arguments: &str) -> Vec<String> {
        self.suggestions(source, arguments)
    }

    fn subtract_suggestions(&self, source: &dyn CommandSource, arguments: &str) -> Vec<String> {
        self.suggestions(source, arguments)
    }

    fn selection(&self) -> Option<&dyn Selection> {
        Some(&self.selection)
    }
}

impl SelectionField {
    fn suggestions(&self, source: &dyn CommandSource, arguments: &str) -> Vec<String> {
        let parse = parse(arguments, &ParseConfig::completion().with_flags(false));
        if Self::delegates(&parse.args) {
            return self
                .selection
                .modify_suggestions(source, arguments)
                .unwrap_or_default();
        }
        coordinate_suggestions(source, arguments, 6)
    }
}
