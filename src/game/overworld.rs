//! Overworld auto-battler
//!
//! Walks back and forth on the field to trigger random encounters, clears
//! each battle with a one-tap team and returns to the field. Expects a team
//! that wins on turn one without switching or Another Force.

use crate::android::{AndroidError, Bridge, DeviceSession, GestureDriver, Point, ScreenGeometry};
use crate::config::{FarmLayout, FarmSettings};

use super::prompt::InputSource;
use super::{log_failure, pause};
use std::time::Duration;

/// Absolute positions for one farming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FarmPlan {
    pub left: Point,
    pub right: Point,
    pub attack: Point,
}

impl FarmPlan {
    pub fn derive(layout: &FarmLayout, geometry: ScreenGeometry) -> Self {
        Self {
            left: layout.swipe_left.scale(geometry),
            right: layout.swipe_right.scale(geometry),
            attack: layout.attack.scale(geometry),
        }
    }
}

/// Runs the walk-fight-return loop
pub struct OverworldFarmer<'a, B: Bridge> {
    driver: GestureDriver<'a, B>,
    plan: FarmPlan,
    settings: &'a FarmSettings,
}

impl<'a, B: Bridge> OverworldFarmer<'a, B> {
    pub fn new(driver: GestureDriver<'a, B>, geometry: ScreenGeometry, settings: &'a FarmSettings) -> Self {
        Self {
            driver,
            plan: FarmPlan::derive(&settings.layout, geometry),
            settings,
        }
    }

    pub fn plan(&self) -> &FarmPlan {
        &self.plan
    }

    /// Play one encounter. Device errors are logged and the round carries on.
    pub fn run_round(&self, battle: u32) {
        let s = self.settings;

        log::info!("[ANOTHER EDEN] Moving left and right on field {} times...", s.swipe_passes);
        for pass in 0..s.swipe_passes {
            let (from, to) = if pass % 2 == 0 {
                (self.plan.left, self.plan.right)
            } else {
                (self.plan.right, self.plan.left)
            };
            log_failure("Swipe", self.driver.swipe(from, to, s.swipe_duration_ms));
        }

        log::info!("[ANOTHER EDEN] Wait {} ms for battle to start.", s.battle_start_wait_ms);
        pause(s.battle_start_wait_ms);

        log::info!("[ANOTHER EDEN] ========= STARTED OVERWORLD BATTLE # {} =========", battle);
        log::info!("[ANOTHER EDEN] Press attack button.");
        log_failure(
            "Attack",
            self.driver.tap(
                self.plan.attack,
                s.attack_taps,
                Duration::from_millis(s.attack_tap_interval_ms),
            ),
        );

        log::info!("[ANOTHER EDEN] Wait {} ms for battle to end.", s.battle_end_wait_ms);
        pause(s.battle_end_wait_ms);

        log::info!("[ANOTHER EDEN] Press attack button once to leave the results.");
        log_failure("Dismiss results", self.driver.tap_once(self.plan.attack));

        log::info!(
            "[ANOTHER EDEN] Wait {} ms to return to the battlefield.",
            s.return_to_battlefield_wait_ms
        );
        pause(s.return_to_battlefield_wait_ms);
    }

    /// Loop rounds until `max_loops` is reached, or forever when it is 0.
    /// Input is not read between rounds. Returns the number of battles
    /// played.
    pub fn run(&self) -> u32 {
        let mut battles = 0;
        while self.settings.max_loops == 0 || battles < self.settings.max_loops {
            battles += 1;
            self.run_round(battles);
        }
        battles
    }
}

/// Entry point for the `farm` command.
///
/// Waits for ENTER when configured, resolves the screen once, then farms.
/// A source that is already closed at the ENTER prompt plays nothing.
/// An unresolved screen size stops here since every gesture would be
/// rejected.
pub fn run_farm<B: Bridge>(
    session: &mut DeviceSession<B>,
    input: &mut dyn InputSource,
    settings: &FarmSettings,
) -> Result<u32, AndroidError> {
    if settings.wait_for_enter
        && input
            .read_line("================ Press ENTER to start the auto-battler ================ ")
            .is_none()
    {
        return Ok(0);
    }

    let geometry = session.refresh_geometry()?;
    if !geometry.is_resolved() {
        return Err(AndroidError::MarkerNotFound {
            marker: crate::android::geometry::DISPLAY_FRAME_MARKER,
        });
    }

    let farmer = OverworldFarmer::new(GestureDriver::new(session), geometry, settings);
    Ok(farmer.run())
}
