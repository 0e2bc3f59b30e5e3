//! foxcore - per-source working state and selections behind a command console
//!
//! Runs the state commands either interactively or from a JSON command script.

mod command_script;
mod commands;
mod config;
mod console;

use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use command_script::{CommandScriptPlayer, ScriptAction};
use commands::{complete_command, execute_command, parse_command};
use config::CoreConfig;
use console::LocalSource;
use foxcore_core::CommandSource;
use foxcore_state::{register_builtin_fields, FieldRegistry, StateMap};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Per-source state and selection console", long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// JSON command script to run instead of the interactive console
    #[arg(long)]
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = CoreConfig::try_load(&args.config);

    // RUST_LOG wins over the configured filter.
    let fallback_filter = loaded.as_ref().map_or("warn", |cfg| cfg.log_filter.as_str());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback_filter))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting foxcore v{}", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|err| CoreConfig::fallback(&args.config, &err));

    let mut registry = FieldRegistry::new();
    register_builtin_fields(&mut registry, &config.field_options())
        .context("failed to register state fields")?;
    let states = StateMap::new(Arc::new(registry));
    let console = LocalSource::from_config(&config.console);

    match args.script {
        Some(path) => {
            let script = CommandScriptPlayer::from_path(&path)?;
            run_script(&states, &console, script, &mut io::stdout().lock())
        }
        None => run_console(&states, &console),
    }
}

fn run_script(
    states: &StateMap,
    console: &LocalSource,
    mut script: CommandScriptPlayer,
    out: &mut impl Write,
) -> Result<()> {
    let mut sources: HashMap<String, LocalSource> = HashMap::new();
    while let Some(step) = script.next_step() {
        let source: &LocalSource = match step.source {
            Some(name) => sources
                .entry(name.clone())
                .or_insert_with(|| LocalSource::named(console, &name)),
            None => console,
        };
        match step.action {
            ScriptAction::Command(line) => {
                writeln!(out, "[{}] > {line}", source.name())?;
                for line in run_line(states, source, &line) {
                    writeln!(out, "{line}")?;
                }
            }
            ScriptAction::Complete(partial) => {
                let suggestions = complete_command(states, source, &partial);
                writeln!(out, "[{}] ? {partial:?} -> {suggestions:?}", source.name())?;
            }
            ScriptAction::Disconnect => {
                states.release(source.id());
                writeln!(out, "[{}] disconnected", source.name())?;
            }
        }
    }
    Ok(())
}

fn run_console(states: &StateMap, console: &LocalSource) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("foxcore console. Type help for commands, ?<input> for completions, quit to exit.");
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim() == "quit" {
            break;
        }
        if let Some(partial) = line.strip_prefix('?') {
            for suggestion in complete_command(states, console, partial) {
                println!("  {suggestion}");
            }
            continue;
        }
        for output in run_line(states, console, line) {
            println!("{output}");
        }
    }
    Ok(())
}

fn run_line(states: &StateMap, source: &dyn CommandSource, line: &str) -> Vec<String> {
    match parse_command(line) {
        Ok(cmd) => execute_command(states, source, cmd).lines,
        Err(err) => vec![format!("Error: {err}")],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;

    #[test]
    fn script_runs_against_isolated_sources() {
        let mut registry = FieldRegistry::new();
        register_builtin_fields(&mut registry, &Default::default()).unwrap();
        let states = StateMap::new(Arc::new(registry));
        let console = LocalSource::from_config(&ConsoleConfig::default());
        let script = CommandScriptPlayer::from_str(
            r#"{
                "steps": [
                    {"source": "alice", "command": "pos 1 2 3"},
                    {"source": "bob", "command": "state"},
                    {"source": "alice", "complete": "sub pos "},
                    {"source": "alice", "disconnect": true},
                    {"source": "alice", "command": "state"},
                    {"command": "teleport"}
                ]
            }"#,
        )
        .unwrap();

        let mut out = Vec::new();
        run_script(&states, &console, script, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines,
            vec![
                "[alice] > pos 1 2 3",
                "Successfully added position (1, 2, 3) as #1!",
                "[bob] > state",
                "Your state buffer is empty.",
                "[alice] ? \"sub pos \" -> [\"1\", \"all\"]",
                "[alice] disconnected",
                "[alice] > state",
                "Your state buffer is empty.",
                "[console] > teleport",
                "Error: Unknown command: teleport. Try help",
            ]
        );
    }
}
