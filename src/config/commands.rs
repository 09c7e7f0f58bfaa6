//! Command table loading
//!
//! Tables map fighter → move name → button list. YAML is the usual format;
//! JSON is accepted for files ending in `.json`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::ConfigError;
use crate::game::combo::{CommandTable, MoveTable};

/// On-disk encoding of a command table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Yaml,
    Json,
}

impl TableFormat {
    /// Pick the format from a file extension, defaulting to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TableFormat::Json,
            _ => TableFormat::Yaml,
        }
    }
}

/// Parse a command table from text
pub fn parse_command_table(text: &str, format: TableFormat) -> Result<CommandTable, ConfigError> {
    let fighters: BTreeMap<String, MoveTable> = match format {
        TableFormat::Yaml => serde_yml::from_str(text)?,
        TableFormat::Json => serde_json::from_str(text)?,
    };

    let table = CommandTable::new(fighters)?;
    if table.is_empty() {
        return Err(ConfigError::EmptyCommandTable);
    }
    Ok(table)
}

/// Load the command table at `path`. Read once at startup.
pub fn load_command_table(path: impl AsRef<Path>) -> Result<CommandTable, ConfigError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let table = parse_command_table(&text, TableFormat::from_path(path))?;
    log::info!(
        "Loaded command table {} with fighters {:?}",
        path.display(),
        table.fighters()
    );
    Ok(table)
}
