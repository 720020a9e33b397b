//! Agent polling loop.
//!
//! The agent simulates the physical fertilizer bot: it polls the
//! coordinator for commands on a fixed interval, executes them with
//! stepped movement and battery drain, and reports telemetry back.
//! Each tick runs to completion before the next fires; there is no
//! mid-command cancellation.

mod drain;
mod transport;

pub use drain::{DrainSource, RandomDrain, ScriptedDrain};
pub use transport::{Coordinator, HttpCoordinator, LocalCoordinator};

use std::time::Duration;

use tokio::time::{interval, sleep};
use tracing::{debug, error, info, warn};

use crate::config::AgentConfig;
use crate::command::{Command, CommandKind};
use crate::status::{TelemetryReport, BATTERY_MAX, BATTERY_MIN};

/// Polling state machine for one field agent.
///
/// Holds the agent's local view of its own position and battery; the
/// coordinator's status record is only ever updated from here via
/// telemetry reports.
pub struct Agent<C> {
    coordinator: C,
    drain: Box<dyn DrainSource>,

    x: i64,
    y: i64,
    battery: i64,
    is_moving: bool,

    step_interval: Duration,
    drop_duration: Duration,
    low_battery_threshold: i64,
}

impl<C: Coordinator + 'static> Agent<C> {
    /// Creates an agent at the base position with a full battery.
    pub fn new(coordinator: C, drain: Box<dyn DrainSource>, config: &AgentConfig) -> Self {
        Self {
            coordinator,
            drain,
            x: 0,
            y: 0,
            battery: BATTERY_MAX,
            is_moving: false,
            step_interval: Duration::from_millis(config.step_interval_ms),
            drop_duration: Duration::from_millis(config.drop_duration_ms),
            low_battery_threshold: config.low_battery_threshold,
        }
    }

    /// Current local position (x, y).
    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }

    /// Current local battery percentage.
    pub fn battery(&self) -> i64 {
        self.battery
    }

    /// Starts the polling loop (non-blocking).
    ///
    /// Spawns a background task that ticks on `poll_interval`. Returns
    /// a JoinHandle used for shutdown via abort; a tick always runs to
    /// completion or fails fast, so aborting between ticks is safe.
    pub fn start(self, poll_interval: Duration) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_ms = poll_interval.as_millis() as u64,
                "Starting agent polling loop"
            );

            let mut ticker = interval(poll_interval);
            let mut agent = self;

            loop {
                ticker.tick().await;
                agent.tick().await;
            }
        })
    }

    /// Runs one tick: fetch, execute, report, passive drain, failsafe
    /// check, heartbeat.
    ///
    /// Transport errors are logged and the affected step abandoned; the
    /// loop simply tries again next tick. Every coordinator call is
    /// idempotent or harmless to repeat, so nothing is retried in-tick.
    pub async fn tick(&mut self) {
        match self.coordinator.fetch_next_command().await {
            Ok(Some(command)) => {
                info!(
                    command_id = %command.id,
                    kind = ?command.kind,
                    "Received command"
                );
                if let Err(e) = self.execute(&command).await {
                    error!(command_id = %command.id, error = %e, "Error executing command");
                    self.is_moving = false;
                }
            }
            Ok(None) => {}
            Err(e) => {
                error!(error = %e, "Error fetching commands");
            }
        }

        self.passive_drain();
        self.failsafe_check();

        // Heartbeat so the coordinator sees idle drain and failsafe
        // recharges without waiting for the next command
        if let Err(e) = self.report_state(None, false).await {
            error!(error = %e, "Error updating status");
        }
    }

    /// Executes one command and reports completion.
    ///
    /// Movement is reported as started before execution so external
    /// observers see `isMoving` flip before the command completes.
    async fn execute(&mut self, command: &Command) -> anyhow::Result<()> {
        self.is_moving = true;
        self.report_state(None, false).await?;

        match command.kind {
            CommandKind::Move => {
                let target_x = command.x.unwrap_or(self.x);
                let target_y = command.y.unwrap_or(self.y);
                self.drive_to(target_x, target_y).await;
            }
            CommandKind::Drop => {
                self.drop_fertilizer().await;
            }
        }

        self.is_moving = false;
        self.report_state(
            Some(command.id.clone()),
            command.kind == CommandKind::Drop,
        )
        .await?;

        info!(command_id = %command.id, "Command executed");
        Ok(())
    }

    /// Steps toward the target one cell per step interval.
    ///
    /// `x` and `y` each move one cell toward the target per step, so
    /// diagonal progress is free and total steps equal the Chebyshev
    /// distance. Each step costs one battery unit, clamped at zero.
    /// Already at target means zero steps.
    async fn drive_to(&mut self, target_x: i64, target_y: i64) {
        info!(
            from_x = self.x,
            from_y = self.y,
            to_x = target_x,
            to_y = target_y,
            "Moving"
        );

        while self.x != target_x || self.y != target_y {
            self.x += (target_x - self.x).signum();
            self.y += (target_y - self.y).signum();

            sleep(self.step_interval).await;
            self.battery = (self.battery - 1).max(BATTERY_MIN);

            debug!(x = self.x, y = self.y, battery = self.battery, "Step");
        }

        info!(x = self.x, y = self.y, "Arrived at destination");
    }

    /// Drops fertilizer at the current cell. Costs two battery units.
    ///
    /// Drops always succeed; battery level does not fail a drop.
    async fn drop_fertilizer(&mut self) {
        info!(x = self.x, y = self.y, "Dropping fertilizer");

        sleep(self.drop_duration).await;
        self.battery = (self.battery - 2).max(BATTERY_MIN);

        info!(battery = self.battery, "Fertilizer dropped");
    }

    /// Passive drain: with a per-tick random draw, lose one battery
    /// unit even when idle.
    fn passive_drain(&mut self) {
        if self.drain.should_drain() && self.battery > BATTERY_MIN {
            self.battery -= 1;
            debug!(battery = self.battery, "Passive battery drain");
        }
    }

    /// Failsafe: at or below the low-battery threshold, recharge to
    /// full and return to base. Fires every tick regardless of state;
    /// since a tick executes commands to completion before this check,
    /// it only ever fires between commands.
    fn failsafe_check(&mut self) {
        if self.battery <= self.low_battery_threshold {
            warn!(battery = self.battery, "Battery low, returning to base for recharge");
            self.battery = BATTERY_MAX;
            self.x = 0;
            self.y = 0;
            info!("Battery recharged, back at base (0, 0)");
        }
    }

    /// Reports the agent's full local state, optionally completing a
    /// command and flagging a fertilizer drop.
    async fn report_state(
        &self,
        command_id: Option<String>,
        fertilizer_dropped: bool,
    ) -> anyhow::Result<()> {
        self.coordinator
            .report(&TelemetryReport {
                x: Some(self.x),
                y: Some(self.y),
                battery: Some(self.battery),
                is_moving: Some(self.is_moving),
                command_id,
                fertilizer_dropped,
            })
            .await
    }
}
