use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::VecDeque, fs, path::Path};

#[derive(Debug, Deserialize)]
struct CommandScriptFile {
    steps: Vec<CommandScriptStepDef>,
}

#[derive(Debug, Clone, Deserialize)]
struct CommandScriptStepDef {
    source: Option<String>,
    command: Option<String>,
    complete: Option<String>,
    #[serde(default)]
    disconnect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptAction {
    /// Run a command line.
    Command(String),
    /// Print completions for a partial command line.
    Complete(String),
    /// Release the source's state.
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandScriptStep {
    /// Issuing source; `None` means the console.
    pub source: Option<String>,
    pub action: ScriptAction,
}

/// Command script runner.
///
/// Scripts are a list of `{source, command | complete | disconnect}` steps,
/// executed in file order.
#[derive(Debug)]
pub struct CommandScriptPlayer {
    pending: VecDeque<CommandScriptStep>,
}

impl CommandScriptPlayer {
    /// Load a command script from a JSON file on disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read command script {}", path.display()))?;
        Self::from_str(&contents)
    }

    /// Load a command script from an in-memory JSON string.
    pub fn from_str(contents: &str) -> Result<Self> {
        let file: CommandScriptFile = serde_json::from_str(contents)?;
        if file.steps.is_empty() {
            anyhow::bail!("command script contains no steps");
        }

        let mut pending = VecDeque::with_capacity(file.steps.len());
        for (index, step) in file.steps.into_iter().enumerate() {
            let action = match (step.command, step.complete, step.disconnect) {
                (Some(command), None, false) => {
                    let command = command.trim().to_string();
                    if command.is_empty() {
                        anyhow::bail!("command script step {index} has an empty command");
                    }
                    ScriptAction::Command(command)
                }
                (None, Some(partial), false) => ScriptAction::Complete(partial),
                (None, None, true) => ScriptAction::Disconnect,
                (None, None, false) => {
                    anyhow::bail!("command script step {index} has no action")
                }
                _ => anyhow::bail!("command script step {index} has more than one action"),
            };
            let source = step
                .source
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            pending.push_back(CommandScriptStep { source, action });
        }

        Ok(Self { pending })
    }

    /// Pop the next step, if any.
    pub fn next_step(&mut self) -> Option<CommandScriptStep> {
        self.pending.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_script_rejects_empty_and_ambiguous_steps() {
        let err = CommandScriptPlayer::from_str(r#"{"steps": []}"#).unwrap_err();
        assert!(err.to_string().contains("no steps"), "unexpected error: {err:#}");

        let err = CommandScriptPlayer::from_str(r#"{"steps": [{"source": "alice"}]}"#).unwrap_err();
        assert!(err.to_string().contains("no action"), "unexpected error: {err:#}");

        let json = r#"{"steps": [{"command": "flush", "disconnect": true}]}"#;
        let err = CommandScriptPlayer::from_str(json).unwrap_err();
        assert!(
            err.to_string().contains("more than one action"),
            "unexpected error: {err:#}"
        );
    }

    #[test]
    fn command_script_yields_steps_in_order() {
        let json = r#"{
            "steps": [
                {"source": "alice", "command": " pos 1 2 3 "},
                {"command": "state"},
                {"source": "alice", "complete": "add "},
                {"source": "alice", "disconnect": true}
            ]
        }"#;
        let mut script = CommandScriptPlayer::from_str(json).expect("script should parse");

        assert_eq!(
            script.next_step(),
            Some(CommandScriptStep {
                source: Some("alice".to_string()),
                action: ScriptAction::Command("pos 1 2 3".to_string()),
            })
        );
        assert_eq!(
            script.next_step().map(|s| (s.source, s.action)),
            Some((None, ScriptAction::Command("state".to_string())))
        );
        assert_eq!(
            script.next_step().map(|s| s.action),
            Some(ScriptAction::Complete("add ".to_string()))
        );
        assert_eq!(
            script.next_step().map(|s| s.action),
            Some(ScriptAction::Disconnect)
        );
        assert_eq!(script.next_step(), None);
        assert_eq!(script.next_step(), None);
    }
}
