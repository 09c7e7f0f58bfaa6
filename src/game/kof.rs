//! KOF Symphony battle menu
//!
//! Interactive loop for Another Force combos: pick a fighter, pick a move or
//! type a chain, and the macro taps it out. The menu has no view of the
//! game, so it is up to the player to call it on their turn with the bar
//! filled.

use crate::android::geometry::DISPLAY_FRAME_MARKER;
use crate::android::{AndroidError, Bridge, DeviceSession, GestureDriver};
use crate::config::KofSettings;

use super::buttons::{Button, ButtonMap};
use super::combo::{validate_chain, CommandTable};
use super::prompt::{is_quit, is_yes, InputSource};
use super::{log_failure, pause};

const CHAIN_COMMAND: &str = "chain";

/// Drives KOF combos for one screen layout
pub struct KofBattler<'a, B: Bridge> {
    driver: GestureDriver<'a, B>,
    buttons: ButtonMap,
    table: &'a CommandTable,
    settings: &'a KofSettings,
}

impl<'a, B: Bridge> KofBattler<'a, B> {
    pub fn new(
        driver: GestureDriver<'a, B>,
        buttons: ButtonMap,
        table: &'a CommandTable,
        settings: &'a KofSettings,
    ) -> Self {
        Self {
            driver,
            buttons,
            table,
            settings,
        }
    }

    /// Enter Another Force, then press `sequence` in order.
    ///
    /// The press delay is only slept between presses. A failed tap is
    /// logged and the rest of the sequence is still sent.
    pub fn perform(&self, sequence: &[Button]) {
        log::info!(">> Pressing AF/MAX button...");
        log_failure(
            "Another Force",
            self.driver.tap_once(self.buttons.point(Button::AnotherForce)),
        );

        log::info!(
            ">> Waiting {} ms for AF animation to complete.",
            self.settings.another_force_wait_ms
        );
        pause(self.settings.another_force_wait_ms);

        let trail: Vec<&str> = sequence.iter().map(Button::name).collect();
        log::info!(">> Performing KOF Command! START->{}->END", trail.join("->"));

        for (i, button) in sequence.iter().enumerate() {
            log_failure(button.name(), self.driver.tap_once(self.buttons.point(*button)));
            if i + 1 < sequence.len() {
                pause(self.settings.button_press_delay_ms);
            }
        }
    }

    /// Run the menu until the input closes or the player quits.
    /// Returns the number of commands performed.
    pub fn run_menu(&self, input: &mut dyn InputSource) -> usize {
        println!("=====================================================");
        println!("----- KOF Battle CLI Interface");
        println!("=====================================================");

        let mut performed = 0;
        while let Some(fighter) = self.select_fighter(input) {
            loop {
                let Some(sequence) = self.select_sequence(input, &fighter) else {
                    return performed;
                };
                self.perform(&sequence);
                performed += 1;

                match input.read_line("--> Change fighter? ") {
                    None => return performed,
                    Some(answer) if is_quit(&answer) => return performed,
                    Some(answer) if is_yes(&answer) => break,
                    Some(_) => {}
                }
            }
        }
        performed
    }

    /// Ask until a known fighter is named. Returns the lowercase key.
    fn select_fighter(&self, input: &mut dyn InputSource) -> Option<String> {
        let prompt = format!(
            "--> Please specify the fighter ({}): ",
            self.table.fighters().join(", ")
        );

        loop {
            let answer = input.read_line(&prompt)?;
            if is_quit(&answer) {
                return None;
            }

            let fighter = answer.trim().to_lowercase();
            match self.table.moves(&fighter) {
                Ok(_) => {
                    println!(">> SELECTED FIGHTER = [ {} ]", fighter);
                    return Some(fighter);
                }
                Err(e) => log::warn!("{}", e),
            }
        }
    }

    /// Ask for a move name or `chain` and resolve it to button presses
    fn select_sequence(&self, input: &mut dyn InputSource, fighter: &str) -> Option<Vec<Button>> {
        let moves = self.table.moves(fighter).ok()?;
        let mut commands: Vec<&str> = moves.keys().map(String::as_str).collect();
        commands.push(CHAIN_COMMAND);

        loop {
            println!(">> COMMAND LIST: {}", commands.join(", "));
            let answer = input.read_line("--> Please specify the command: ")?;
            if is_quit(&answer) {
                return None;
            }

            let command = answer.trim().to_lowercase();
            if command == CHAIN_COMMAND {
                return self.read_chain(input, fighter);
            }
            if let Some(sequence) = moves.get(&command) {
                println!(">>> Performing command: [ {} ]", command);
                return Some(sequence.clone());
            }
        }
    }

    /// Ask for a chain string until it validates and, when it is not a
    /// true chain, the player accepts it anyway
    fn read_chain(&self, input: &mut dyn InputSource, fighter: &str) -> Option<Vec<Button>> {
        loop {
            let answer = input.read_line("--> Enter the Chain Sequence (ie. 1,2,3, or S w/out spaces): ")?;
            if is_quit(&answer) {
                return None;
            }

            let raw: String = answer.chars().filter(|c| !c.is_whitespace()).collect();
            let result = match validate_chain(&raw, self.table, fighter) {
                Ok(result) => result,
                Err(e) => {
                    log::error!("{}", e);
                    return None;
                }
            };
            if !result.is_valid || result.sequence.is_empty() {
                continue;
            }

            if !result.is_true_chain {
                let confirm = input.read_line(
                    "--> The Chain you provided is NOT a true combo! Do you still want to continue? ",
                )?;
                if !is_yes(&confirm) {
                    continue;
                }
            }

            println!(">>> Performing chain: [ {} ]", raw);
            return Some(result.sequence);
        }
    }
}

/// Entry point for the `kof` command.
///
/// Resolves the screen, scales the button layout once and runs the menu.
pub fn run_kof<B: Bridge>(
    session: &mut DeviceSession<B>,
    input: &mut dyn InputSource,
    table: &CommandTable,
    settings: &KofSettings,
) -> Result<usize, AndroidError> {
    let geometry = session.refresh_geometry()?;
    if !geometry.is_resolved() {
        return Err(AndroidError::MarkerNotFound {
            marker: DISPLAY_FRAME_MARKER,
        });
    }

    log::info!(
        "[ANOTHER EDEN] AF wait time = {} ms, Button press time = {} ms.",
        settings.another_force_wait_ms,
        settings.button_press_delay_ms
    );

    let buttons = ButtonMap::derive(&settings.layout, geometry);
    let battler = KofBattler::new(GestureDriver::new(session), buttons, table, settings);
    Ok(battler.run_menu(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::android::bridge::fake::FakeBridge;
    use crate::config::parse_command_table;
    use crate::config::TableFormat;
    use crate::game::prompt::ScriptedInput;

    const TABLE: &str = "\
kyo:
  combo1: [LP, HP, LK]
  combo2: [LK, HK]
  combo3: [HP, LP]
  super: [HK, HK, AF]
";

    const AF: &str = "-s SERIAL shell input tap 2088 162";
    const LP: &str = "-s SERIAL shell input tap 840 810";
    const HP: &str = "-s SERIAL shell input tap 1200 810";
    const LK: &str = "-s SERIAL shell input tap 1560 810";
    const HK: &str = "-s SERIAL shell input tap 2040 810";

    fn instant() -> KofSettings {
        KofSettings {
            another_force_wait_ms: 0,
            button_press_delay_ms: 0,
            ..Default::default()
        }
    }

    fn session() -> DeviceSession<FakeBridge> {
        let bridge = FakeBridge::new()
            .respond("dumpsys input", "Viewport INTERNAL: orientation=1, isActive=true")
            .respond("dumpsys window", "mDisplayFrame=(0, 0) - (1080, 2400)");
        DeviceSession::new(bridge, "SERIAL")
    }

    fn play(answers: &[&str]) -> (usize, Vec<String>, ScriptedInput) {
        let table = parse_command_table(TABLE, TableFormat::Yaml).unwrap();
        let mut session = session();
        let mut input = ScriptedInput::new(answers.iter().copied());

        let performed = run_kof(&mut session, &mut input, &table, &instant()).unwrap();
        let taps = session.bridge().calls_matching("input tap");
        (performed, taps, input)
    }

    #[test]
    fn test_named_command() {
        let (performed, taps, _) = play(&["Kyo", "combo1", "n", "quit"]);

        assert_eq!(performed, 1);
        assert_eq!(taps, vec![AF, LP, HP, LK]);
    }

    #[test]
    fn test_true_chain_runs_without_confirmation() {
        // combo1 ends LK, combo2 starts LK
        let (performed, taps, input) = play(&["kyo", "chain", "1 2"]);

        assert_eq!(performed, 1);
        assert_eq!(taps, vec![AF, LP, HP, LK, HK]);
        assert!(!input.prompts().iter().any(|p| p.contains("NOT a true combo")));
    }

    #[test]
    fn test_non_true_chain_needs_confirmation() {
        // 13: LK then HP is not a link; first refused, then accepted
        let (performed, taps, _) = play(&["kyo", "chain", "13", "no", "13", "y"]);

        assert_eq!(performed, 1);
        assert_eq!(taps, vec![AF, LP, HP, LK, HP, LP]);
    }

    #[test]
    fn test_invalid_chain_reprompts() {
        let (performed, taps, input) = play(&["kyo", "chain", "1X", "S"]);

        assert_eq!(performed, 1);
        assert_eq!(taps, vec![AF, HK, HK, AF]);
        let chain_prompts = input
            .prompts()
            .iter()
            .filter(|p| p.contains("Chain Sequence"))
            .count();
        assert_eq!(chain_prompts, 2);
    }

    #[test]
    fn test_unknown_fighter_and_command_reprompt() {
        let (performed, taps, input) = play(&["terry", "kyo", "combo9", "combo2"]);

        assert_eq!(performed, 1);
        assert_eq!(taps, vec![AF, LK, HK]);
        assert_eq!(input.prompts().len(), 5);
    }

    #[test]
    fn test_change_fighter_returns_to_selection() {
        let (performed, _, input) = play(&["kyo", "combo2", "yes", "kyo", "combo2", "no"]);

        assert_eq!(performed, 2);
        let fighter_prompts = input
            .prompts()
            .iter()
            .filter(|p| p.starts_with("--> Please specify the fighter"))
            .count();
        assert_eq!(fighter_prompts, 2);
    }

    #[test]
    fn test_quit_at_fighter_prompt() {
        let (performed, taps, _) = play(&["q"]);
        assert_eq!(performed, 0);
        assert!(taps.is_empty());
    }

    #[test]
    fn test_unresolved_screen_is_an_error() {
        let table = parse_command_table(TABLE, TableFormat::Yaml).unwrap();
        let mut session = DeviceSession::new(FakeBridge::new(), "SERIAL");
        let result = run_kof(&mut session, &mut ScriptedInput::default(), &table, &instant());

        assert!(matches!(result, Err(AndroidError::MarkerNotFound { .. })));
    }
}
