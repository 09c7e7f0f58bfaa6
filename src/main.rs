//! Eden Macro CLI
//!
//! Connects to one device by serial number and runs a macro or a single
//! device action.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use eden_macro::android::{AdbBridge, DeviceSession, GestureDriver};
use eden_macro::config::{load_command_table, seconds_to_ms, Settings};
use eden_macro::game::{run_farm, run_kof, ConsoleInput, InputSource, ScriptedInput};

#[derive(Parser)]
#[command(name = "eden", version)]
#[command(about = "Runs Android macros for the ANOTHER EDEN mobile game over adb")]
struct Cli {
    /// Serial number of the Android device as seen by adb
    #[arg(short = 's', long = "serial_number")]
    serial_number: String,

    /// Echo every command sent to the device
    #[arg(long)]
    verbose: bool,

    /// Restart the adb server before connecting
    #[arg(long = "restart_bridge")]
    restart_bridge: bool,

    /// JSON settings file; missing fields keep their defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk the overworld and auto-clear random encounters
    Farm {
        /// Seconds to wait for the battle to start
        #[arg(long = "battle_start_time")]
        battle_start_time: Option<f64>,

        /// Seconds to wait for the battle to end
        #[arg(long = "battle_end_time")]
        battle_end_time: Option<f64>,

        /// Seconds to wait to return to the battlefield
        #[arg(long = "return_to_battlefield_time")]
        return_to_battlefield_time: Option<f64>,

        /// Stop after this many battles (0 = never)
        #[arg(long = "max_loops")]
        max_loops: Option<u32>,

        /// Start without waiting for ENTER
        #[arg(long = "no_wait")]
        no_wait: bool,
    },

    /// Interactive KOF Symphony combo menu
    Kof {
        /// Seconds to wait for the Another Force animation
        #[arg(long = "another_force_wait_time")]
        another_force_wait_time: Option<f64>,

        /// Seconds between button presses
        #[arg(long = "button_press_click_time")]
        button_press_click_time: Option<f64>,

        /// Command table (YAML, or JSON by extension)
        #[arg(long = "command_list")]
        command_list: Option<PathBuf>,

        /// Replay menu answers from a file, one per line
        #[arg(long)]
        replay: Option<PathBuf>,
    },

    /// Capture the screen, optionally pulling it to the host
    Screenshot {
        /// File name on the device
        #[arg(default_value = "screenshot.png")]
        name: String,

        /// Host path to pull to; the device copy is deleted afterwards
        #[arg(long)]
        pull: Option<PathBuf>,
    },

    /// Send a named key event (back, home, vol_up, ...)
    Event { name: String },

    /// Type text into the focused field
    Text { text: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::from_json_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };

    let bridge = AdbBridge::new(settings.bridge.program.clone());
    let mut session = DeviceSession::new(bridge, cli.serial_number).verbose(cli.verbose);
    session
        .open(cli.restart_bridge)
        .context("Failed to connect to the device")?;

    match cli.command {
        Commands::Farm {
            battle_start_time,
            battle_end_time,
            return_to_battlefield_time,
            max_loops,
            no_wait,
        } => {
            let farm = &mut settings.farm;
            if let Some(s) = battle_start_time {
                farm.battle_start_wait_ms = seconds_to_ms(s);
            }
            if let Some(s) = battle_end_time {
                farm.battle_end_wait_ms = seconds_to_ms(s);
            }
            if let Some(s) = return_to_battlefield_time {
                farm.return_to_battlefield_wait_ms = seconds_to_ms(s);
            }
            if let Some(n) = max_loops {
                farm.max_loops = n;
            }
            if no_wait {
                farm.wait_for_enter = false;
            }

            let mut console = ConsoleInput::new().context("Failed to open the terminal")?;
            let battles = run_farm(&mut session, &mut console, &settings.farm)?;
            log::info!("[ANOTHER EDEN] Finished after {} battles.", battles);
        }

        Commands::Kof {
            another_force_wait_time,
            button_press_click_time,
            command_list,
            replay,
        } => {
            let kof = &mut settings.kof;
            if let Some(s) = another_force_wait_time {
                kof.another_force_wait_ms = seconds_to_ms(s);
            }
            if let Some(s) = button_press_click_time {
                kof.button_press_delay_ms = seconds_to_ms(s);
            }
            if let Some(path) = command_list {
                kof.command_list = path;
            }

            let table = load_command_table(&settings.kof.command_list)?;
            let mut input: Box<dyn InputSource> = match replay {
                Some(path) => Box::new(
                    ScriptedInput::from_file(&path)
                        .with_context(|| format!("Failed to read replay {}", path.display()))?,
                ),
                None => Box::new(ConsoleInput::new().context("Failed to open the terminal")?),
            };

            let performed = run_kof(&mut session, input.as_mut(), &table, &settings.kof)?;
            log::info!("[ANOTHER EDEN] Performed {} commands.", performed);
        }

        Commands::Screenshot { name, pull } => {
            let driver = GestureDriver::new(&session)
                .with_screenshot_dir(settings.bridge.screenshot_dir.clone());
            let path = driver.screenshot(&name)?;
            match pull {
                Some(destination) => driver.pull_and_delete(&name, destination)?,
                None => println!("{}", path),
            }
        }

        Commands::Event { name } => GestureDriver::new(&session).send_event(&name)?,

        Commands::Text { text } => GestureDriver::new(&session).type_text(&text)?,
    }

    Ok(())
}
