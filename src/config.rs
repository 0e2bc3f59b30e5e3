use anyhow::{Context, Result};
use foxcore_state::{FieldOptions, DEFAULT_MAX_FILL};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/foxcore.toml";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,
    pub console: ConsoleConfig,
    pub fields: FieldsConfig,
    /// Extra aliases keyed by built-in field ID.
    pub aliases: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub name: String,
    /// Granted permission patterns (`*`, `foxcore.command.state.*`, ...).
    pub permissions: Vec<String>,
    /// World position; without one, relative coordinates are refused.
    pub position: Option<[f64; 3]>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldsConfig {
    /// Largest cuboid a single selection operation may touch.
    pub max_fill: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_filter: "warn".to_string(),
            console: ConsoleConfig::default(),
            fields: FieldsConfig::default(),
            aliases: BTreeMap::new(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            name: "console".to_string(),
            permissions: vec!["*".to_string()],
            position: None,
        }
    }
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            max_fill: DEFAULT_MAX_FILL,
        }
    }
}

impl CoreConfig {
    /// Read and parse a configuration file.
    pub fn try_load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Defaults after a failed load. A missing file at the default path is
    /// expected and not reported.
    pub fn fallback(path: &Path, err: &anyhow::Error) -> Self {
        let missing = err
            .downcast_ref::<std::io::Error>()
            .is_some_and(|io| io.kind() == std::io::ErrorKind::NotFound);
        if !missing || path != Path::new(DEFAULT_CONFIG_PATH) {
            warn!("{err:#}. Using defaults");
        }
        CoreConfig::default()
    }

    pub fn field_options(&self) -> FieldOptions {
        FieldOptions {
            max_fill: self.fields.max_fill,
            extra_aliases: self.aliases.clone(),
        }
    }
}
