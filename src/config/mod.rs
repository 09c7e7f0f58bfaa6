//! Configuration module
//!
//! Handles user settings, timing overrides and the fighter command tables.

pub mod commands;
pub mod settings;

use std::path::PathBuf;

pub use commands::{load_command_table, parse_command_table, TableFormat};
pub use settings::{seconds_to_ms, BridgeSettings, FarmLayout, FarmSettings, KofSettings, Settings};

/// Errors raised while loading configuration files
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("invalid command table: {0}")]
    Table(#[from] crate::game::ComboError),

    #[error("command table defines no fighters")]
    EmptyCommandTable,

    #[error("layout position `{name}` ({x}, {y}) is off screen")]
    OffScreen { name: String, x: f64, y: f64 },
}
