//! Fighter command tables and chain validation
//!
//! A chain is typed as a string of move symbols (`1`, `2`, `3`, `S`). Two
//! consecutive combos form a true chain when the last button of one is the
//! first button of the next; the shared press is then sent only once.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use super::buttons::Button;

/// Move name to its ordered button presses
pub type MoveTable = BTreeMap<String, Vec<Button>>;

/// Errors from command table lookups
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComboError {
    #[error("unknown fighter `{fighter}` (supported: {})", supported.join(", "))]
    UnknownFighter {
        fighter: String,
        supported: Vec<String>,
    },

    #[error("fighter `{fighter}` has no move `{name}`")]
    UnknownMove { fighter: String, name: String },

    /// Two keys collapse to the same name once lowercased
    #[error("`{key}` is defined more than once (names are case-insensitive)")]
    DuplicateKey { key: String },
}

/// Fighter name to move table. Keys are lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CommandTable {
    fighters: BTreeMap<String, MoveTable>,
}

impl CommandTable {
    /// Build a table, lowercasing fighter and move names.
    ///
    /// Keys that only differ by case are rejected rather than merged.
    pub fn new(fighters: BTreeMap<String, MoveTable>) -> Result<Self, ComboError> {
        let mut table = BTreeMap::new();
        for (fighter, moves) in fighters {
            let mut lowered = MoveTable::new();
            for (name, buttons) in moves {
                let name = name.to_lowercase();
                if lowered.contains_key(&name) {
                    return Err(ComboError::DuplicateKey {
                        key: format!("{}.{}", fighter, name),
                    });
                }
                lowered.insert(name, buttons);
            }

            let fighter = fighter.to_lowercase();
            if table.contains_key(&fighter) {
                return Err(ComboError::DuplicateKey { key: fighter });
            }
            table.insert(fighter, lowered);
        }
        Ok(Self { fighters: table })
    }

    pub fn is_empty(&self) -> bool {
        self.fighters.is_empty()
    }

    pub fn fighters(&self) -> Vec<String> {
        self.fighters.keys().cloned().collect()
    }

    /// Case-insensitive fighter lookup
    pub fn moves(&self, fighter: &str) -> Result<&MoveTable, ComboError> {
        self.fighters
            .get(&fighter.to_lowercase())
            .ok_or_else(|| ComboError::UnknownFighter {
                fighter: fighter.to_string(),
                supported: self.fighters(),
            })
    }

    /// Button presses for one named move
    pub fn sequence(&self, fighter: &str, name: &str) -> Result<&[Button], ComboError> {
        self.moves(fighter)?
            .get(&name.to_lowercase())
            .map(Vec::as_slice)
            .ok_or_else(|| ComboError::UnknownMove {
                fighter: fighter.to_string(),
                name: name.to_string(),
            })
    }
}

/// Move referenced by a chain symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveKey {
    Combo1,
    Combo2,
    Combo3,
    Super,
}

impl MoveKey {
    /// `1`, `2`, `3`, or `s`/`S`
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '1' => Some(MoveKey::Combo1),
            '2' => Some(MoveKey::Combo2),
            '3' => Some(MoveKey::Combo3),
            's' | 'S' => Some(MoveKey::Super),
            _ => None,
        }
    }

    /// Name used as the key in command tables
    pub fn name(&self) -> &'static str {
        match self {
            MoveKey::Combo1 => "combo1",
            MoveKey::Combo2 => "combo2",
            MoveKey::Combo3 => "combo3",
            MoveKey::Super => "super",
        }
    }
}

impl fmt::Display for MoveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of validating one chain string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainResult {
    /// No rejected symbols
    pub is_valid: bool,
    /// Every adjacent pair of combos shares its boundary button
    pub is_true_chain: bool,
    /// Presses to send, with shared boundaries collapsed
    pub sequence: Vec<Button>,
    /// Symbols that mapped to no move for this fighter
    pub rejected: Vec<char>,
}

/// Expand a chain string into button presses for `fighter`.
///
/// The walk never aborts: unknown symbols are recorded and skipped, and a
/// broken link only clears `is_true_chain` while the full combo is still
/// appended. The caller decides whether a non-true chain is worth running.
pub fn validate_chain(
    raw: &str,
    table: &CommandTable,
    fighter: &str,
) -> Result<ChainResult, ComboError> {
    let moves = table.moves(fighter)?;

    let mut result = ChainResult {
        is_valid: true,
        is_true_chain: true,
        sequence: Vec::new(),
        rejected: Vec::new(),
    };

    for symbol in raw.chars() {
        let Some(combo) = MoveKey::from_symbol(symbol).and_then(|key| moves.get(key.name()))
        else {
            result.is_valid = false;
            result.rejected.push(symbol);
            continue;
        };

        let mut presses = combo.as_slice();
        if let (Some(last), Some(first)) = (result.sequence.last(), presses.first()) {
            if last == first {
                presses = &presses[1..];
            } else {
                result.is_true_chain = false;
            }
        }
        result.sequence.extend_from_slice(presses);
    }

    if !result.is_valid {
        log::error!(
            "The chain ( {} ) contains invalid characters {:?}! [supported = 1,2,3,S]",
            raw,
            result.rejected
        );
    }

    Ok(result)
}
