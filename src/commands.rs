use foxcore_command::{
    parse, starting_with, CommandError, ElementType, ParseConfig, ParseResult, ProcessResult,
};
use foxcore_core::CommandSource;
use foxcore_state::{StateMap, POSITIONS_ID};
use tracing::debug;

const PERM_FLUSH: &str = "foxcore.command.state.flush";
const PERM_ADD: &str = "foxcore.command.state.add";
const PERM_SUBTRACT: &str = "foxcore.command.state.subtract";
const PERM_INFO: &str = "foxcore.command.state.info";
const PERM_POSITION: &str = "foxcore.command.state.position";

const NO_PERMISSION: &str = "You don't have permission to use this command!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Help,
    Flush,
    Add,
    Subtract,
    Info,
    Position,
}

impl Label {
    /// Labels offered for completion, one per command.
    const ALL: [(&'static str, Label); 6] = [
        ("flush", Label::Flush),
        ("add", Label::Add),
        ("subtract", Label::Subtract),
        ("state", Label::Info),
        ("position", Label::Position),
        ("help", Label::Help),
    ];

    fn lookup(label: &str) -> Option<Self> {
        match label {
            "" | "help" | "?" => Some(Self::Help),
            "flush" | "clear" | "wipe" | "f" => Some(Self::Flush),
            "add" | "plus" => Some(Self::Add),
            "subtract" | "sub" | "minus" => Some(Self::Subtract),
            "state" | "buffer" | "s" => Some(Self::Info),
            "position" | "pos" | "p" => Some(Self::Position),
            _ => None,
        }
    }

    fn permission(self) -> Option<&'static str> {
        match self {
            Self::Help => None,
            Self::Flush => Some(PERM_FLUSH),
            Self::Add => Some(PERM_ADD),
            Self::Subtract => Some(PERM_SUBTRACT),
            Self::Info => Some(PERM_INFO),
            Self::Position => Some(PERM_POSITION),
        }
    }

    fn allowed(self, source: &dyn CommandSource) -> bool {
        self.permission()
            .map_or(true, |node| source.has_permission(node))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateCommand {
    Help,
    Flush { fields: Vec<String> },
    Add { field: String, arguments: String },
    Subtract { field: String, arguments: String },
    Info { fields: Vec<String> },
    Position { arguments: String },
}

impl StateCommand {
    fn label(&self) -> Label {
        match self {
            Self::Help => Label::Help,
            Self::Flush { .. } => Label::Flush,
            Self::Add { .. } => Label::Add,
            Self::Subtract { .. } => Label::Subtract,
            Self::Info { .. } => Label::Info,
            Self::Position { .. } => Label::Position,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub lines: Vec<String>,
}

impl CommandOutput {
    fn line(line: impl Into<String>) -> Self {
        Self {
            lines: vec![line.into()],
        }
    }
}

/// Split a command line into its label and the raw text after it.
fn split_label(input: &str) -> (String, String) {
    let input = input.trim_start();
    let input = input.strip_prefix('/').unwrap_or(input);
    let parse = parse(
        input,
        &ParseConfig::default()
            .with_flags(false)
            .with_limit(1)
            .with_leave_final_as_is(true),
    );
    let mut args = parse.args.into_iter();
    let label = args.next().unwrap_or_default().to_ascii_lowercase();
    (label, args.next().unwrap_or_default())
}

/// Field name plus the raw text handed to the field's own grammar.
fn field_and_rest(arguments: &str) -> ParseResult {
    parse(
        arguments,
        &ParseConfig::default()
            .with_flags(false)
            .with_limit(1)
            .with_leave_final_as_is(true),
    )
}

/// Field names; dashes are never flags here, so `--positions` stays a name.
fn field_names(arguments: &str) -> Vec<String> {
    parse(arguments, &ParseConfig::default().with_flags(false)).args
}

pub fn parse_command(input: &str) -> Result<StateCommand, CommandError> {
    let (label, rest) = split_label(input);
    let kind = Label::lookup(&label)
        .ok_or_else(|| CommandError::new(format!("Unknown command: {label}. Try help")))?;
    match kind {
        Label::Help => Ok(StateCommand::Help),
        Label::Flush => Ok(StateCommand::Flush {
            fields: field_names(&rest),
        }),
        Label::Info => Ok(StateCommand::Info {
            fields: field_names(&rest),
        }),
        Label::Add => {
            let mut args = field_and_rest(&rest).args.into_iter();
            let field = args
                .next()
                .ok_or_else(|| CommandError::new("Usage: add <field> [args...]"))?;
            Ok(StateCommand::Add {
                field,
                arguments: args.next().unwrap_or_default(),
            })
        }
        Label::Subtract => {
            let mut args = field_and_rest(&rest).args.into_iter();
            let field = args
                .next()
                .ok_or_else(|| CommandError::new("Usage: subtract <field> [args...]"))?;
            Ok(StateCommand::Subtract {
                field,
                arguments: args.next().unwrap_or_default(),
            })
        }
        Label::Position => Ok(StateCommand::Position { arguments: rest }),
    }
}

pub fn execute_command(
    states: &StateMap,
    source: &dyn CommandSource,
    cmd: StateCommand,
) -> CommandOutput {
    if !cmd.label().allowed(source) {
        debug!(source = source.id().as_str(), command = ?cmd, "Permission denied");
        return CommandOutput::line(NO_PERMISSION);
    }

    match cmd {
        StateCommand::Help => CommandOutput {
            lines: help_lines(),
        },
        StateCommand::Flush { fields } => flush(states, source, &fields),
        StateCommand::Info { fields } => info(states, source, &fields),
        StateCommand::Add { field, arguments } => {
            modify(states, source, &field, &arguments, Direction::Add)
        }
        StateCommand::Subtract { field, arguments } => {
            modify(states, source, &field, &arguments, Direction::Subtract)
        }
        StateCommand::Position { arguments } => {
            modify(states, source, POSITIONS_ID, &arguments, Direction::Add)
        }
    }
}

fn flush(states: &StateMap, source: &dyn CommandSource, fields: &[String]) -> CommandOutput {
    if fields.is_empty() {
        states.flush(source.id());
        return CommandOutput::line("Successfully flushed!");
    }

    let registry = states.registry();
    if let Some(unknown) = fields.iter().find(|name| registry.resolve_id(name).is_none()) {
        return CommandOutput::line(format!("\"{unknown}\" is not a valid type!"));
    }
    let handle = states.state_for(source.id());
    let mut state = handle.lock();
    for name in fields {
        if let Err(err) = state.flush_field(name) {
            return CommandOutput::line(err.to_string());
        }
    }
    CommandOutput::line("Successfully flushed!")
}

fn info(states: &StateMap, source: &dyn CommandSource, fields: &[String]) -> CommandOutput {
    let registry = states.registry();
    let ids = if fields.is_empty() {
        registry.descriptors().map(|d| d.id()).collect::<Vec<_>>()
    } else {
        let mut ids = Vec::with_capacity(fields.len());
        for name in fields {
            match registry.resolve_id(name) {
                Some(id) => ids.push(id),
                None => return CommandOutput::line(format!("\"{name}\" is not a valid type!")),
            }
        }
        ids
    };

    let handle = states.state_for(source.id());
    let state = handle.lock();
    let mut out = CommandOutput::default();
    for id in ids {
        match state.get(id).filter(|field| !field.is_empty()) {
            Some(field) => {
                out.lines.push(format!("{}:", field.name()));
                out.lines
                    .extend(field.details().into_iter().map(|line| format!("  {line}")));
            }
            None if !fields.is_empty() => out.lines.push(format!("{id}: (empty)")),
            None => {}
        }
    }
    if out.lines.is_empty() {
        out.lines.push("Your state buffer is empty.".to_string());
    }
    out
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Add,
    Subtract,
}

fn modify(
    states: &StateMap,
    source: &dyn CommandSource,
    field_name: &str,
    arguments: &str,
    direction: Direction,
) -> CommandOutput {
    let handle = states.state_for(source.id());
    let mut state = handle.lock();
    let field = match state.get_or_create_from_alias(field_name) {
        Ok(field) => field,
        Err(_) => {
            return CommandOutput::line(format!("\"{field_name}\" is not a valid category!"))
        }
    };
    let result = match direction {
        Direction::Add => field.add(source, arguments),
        Direction::Subtract => field.subtract(source, arguments),
    };
    CommandOutput::line(render(&result, field.name(), direction))
}

fn render(result: &ProcessResult, field: &str, direction: Direction) -> String {
    if let Some(message) = result.message() {
        return message.to_string();
    }
    match (result.is_success(), direction) {
        (true, Direction::Add) => format!("Successfully added data to the {field} field!"),
        (true, Direction::Subtract) => format!("Successfully removed data from the {field} field!"),
        (false, Direction::Add) => format!("Failed to add data to the {field} field!"),
        (false, Direction::Subtract) => format!("Failed to remove data from the {field} field!"),
    }
}

/// Completions for a partially typed command line.
pub fn complete_command(states: &StateMap, source: &dyn CommandSource, input: &str) -> Vec<String> {
    let input = input.trim_start();
    let input = input.strip_prefix('/').unwrap_or(input);
    let parse = parse(input, &ParseConfig::completion().with_flags(false).with_limit(1));
    match parse.current.kind {
        ElementType::Argument if parse.current.index == 0 => {
            let labels = Label::ALL
                .iter()
                .filter(|(_, kind)| kind.allowed(source))
                .map(|(label, _)| *label);
            starting_with(labels, &parse.current.token)
        }
        ElementType::Final => {
            let label = parse.arg(0).unwrap_or_default().to_ascii_lowercase();
            let rest = parse.current.token.as_str();
            match Label::lookup(&label) {
                Some(kind) if !kind.allowed(source) => Vec::new(),
                None | Some(Label::Help) => Vec::new(),
                Some(Label::Flush | Label::Info) => field_list_suggestions(states, rest),
                Some(Label::Add) => modify_suggestions(states, source, rest, Direction::Add),
                Some(Label::Subtract) => {
                    modify_suggestions(states, source, rest, Direction::Subtract)
                }
                Some(Label::Position) => {
                    let handle = states.state_for(source.id());
                    let mut state = handle.lock();
                    let suggestions = state
                        .get_or_create_from_alias(POSITIONS_ID)
                        .map(|field| field.add_suggestions(source, rest))
                        .unwrap_or_default();
                    suggestions
                }
            }
        }
        ElementType::Complete => vec![format!("{} ", parse.current.prefix)],
        _ => Vec::new(),
    }
}

fn field_list_suggestions(states: &StateMap, arguments: &str) -> Vec<String> {
    let parse = parse(arguments, &ParseConfig::completion().with_flags(false));
    match parse.current.kind {
        ElementType::Argument => {
            let registry = states.registry();
            let listed: Vec<&str> = parse
                .args
                .iter()
                .filter_map(|name| registry.resolve_id(name))
                .collect();
            let candidates = registry
                .descriptors()
                .filter(|d| !listed.contains(&d.id()))
                .map(|d| d.primary_alias());
            starting_with(candidates, &parse.current.token)
        }
        ElementType::Complete => vec![format!("{} ", parse.current.prefix)],
        _ => Vec::new(),
    }
}

fn modify_suggestions(
    states: &StateMap,
    source: &dyn CommandSource,
    arguments: &str,
    direction: Direction,
) -> Vec<String> {
    let parse = parse(
        arguments,
        &ParseConfig::completion().with_flags(false).with_limit(1),
    );
    match parse.current.kind {
        ElementType::Argument if parse.current.index == 0 => starting_with(
            states.registry().primary_aliases(),
            &parse.current.token,
        ),
        ElementType::Final => {
            let Some(name) = parse.arg(0) else {
                return Vec::new();
            };
            let handle = states.state_for(source.id());
            let mut state = handle.lock();
            let Ok(field) = state.get_or_create_from_alias(name) else {
                return Vec::new();
            };
            let rest = parse.arg(1).unwrap_or_default();
            match direction {
                Direction::Add => field.add_suggestions(source, rest),
                Direction::Subtract => field.subtract_suggestions(source, rest),
            }
        }
        ElementType::Complete => vec![format!("{} ", parse.current.prefix)],
        _ => Vec::new(),
    }
}

fn help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  flush|clear|wipe|f [fields...]      reset your state (all fields if none given)"
            .to_string(),
        "  add|plus <field> [args...]          add data to a field".to_string(),
        "  subtract|sub|minus <field> [args...]  remove data from a field".to_string(),
        "  state|buffer|s [fields...]          show your state".to_string(),
        "  position|pos|p [x y z]              add a position (supports ~offset)".to_string(),
        "Fields: positions (pos, p), selection (sel, region)".to_string(),
        "Selection: <x y z> for one block, <x1 y1 z1 x2 y2 z2> for a cuboid".to_string(),
    ]
}
