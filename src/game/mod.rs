//! Game macros
//!
//! Button layouts, combo tables and the two automation loops: the overworld
//! farmer and the KOF Symphony battle menu.

pub mod buttons;
pub mod combo;
pub mod kof;
pub mod overworld;
pub mod prompt;

use std::thread;
use std::time::Duration;

use crate::android::AndroidError;

pub use buttons::{Button, ButtonMap, FractionalPoint, KofLayout};
pub use combo::{validate_chain, ChainResult, ComboError, CommandTable, MoveKey, MoveTable};
pub use kof::{run_kof, KofBattler};
pub use overworld::{run_farm, FarmPlan, OverworldFarmer};
pub use prompt::{ConsoleInput, InputSource, ScriptedInput};

/// Log a failed device step and carry on. Rejected input was already
/// reported by the gesture driver.
pub(crate) fn log_failure(step: &str, result: Result<(), AndroidError>) {
    if let Err(e) = result {
        if !e.is_rejected_input() {
            log::warn!("{} failed: {}", step, e);
        }
    }
}

pub(crate) fn pause(ms: u64) {
    if ms > 0 {
        thread::sleep(Duration::from_millis(ms));
    }
}
