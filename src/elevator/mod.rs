pub mod config;
pub mod debounce;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::device::{ElevatorIo, SensorSnapshot};
use crate::setpoint::Setpoint;
use config::ElevatorConfig;
use debounce::Debouncer;

/// What one polling cycle produced: the raw snapshot plus the logical
/// reference and the debounced zero flag. Published on a watch channel so
/// predicates can be awaited level-triggered, one re-check per cycle.
#[derive(Debug, Clone)]
pub struct Observed {
    pub snapshot: SensorSnapshot,
    pub reference: Setpoint,
    pub at_zero: bool,
}

/// How a homing run ended. Limits are restored on every path; only
/// `Calibrated` commits a new zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HomingOutcome {
    Calibrated,
    Cancelled,
    TimedOut,
}

/// Telemetry surface handed to the upstream scheduler.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub reference: Setpoint,
    pub at_setpoint: bool,
    #[serde(rename = "unsafe")]
    pub is_unsafe: bool,
    pub at_zero: bool,
    pub snapshot: SensorSnapshot,
}

/// The elevator subsystem controller.
///
/// Owns the latest sensor snapshot and the current reference setpoint. Goals
/// are clamped into the soft-limit range before they reach the device; the
/// unclamped setpoint is kept as the logical reference for identity checks.
pub struct Elevator {
    io: Arc<dyn ElevatorIo>,
    config: ElevatorConfig,
    observed: watch::Sender<Observed>,
    zero_debouncer: Mutex<Debouncer>,
}

impl Elevator {
    pub fn new(io: Arc<dyn ElevatorIo>, config: ElevatorConfig) -> Self {
        let debouncer = Debouncer::new(config.zero_debounce);
        let (observed, _) = watch::channel(Observed {
            snapshot: SensorSnapshot::default(),
            reference: Setpoint::Stow,
            at_zero: false,
        });
        Self {
            io,
            config,
            observed,
            zero_debouncer: Mutex::new(debouncer),
        }
    }

    pub fn config(&self) -> &ElevatorConfig {
        &self.config
    }

    /// Refreshes the snapshot from the device and feeds the zero debouncer.
    /// Called once per control cycle by the service poll loop; has no other
    /// side effects.
    pub async fn poll(&self) {
        let snapshot = self.io.update_snapshot().await;
        // Keep polling even if a panic elsewhere poisoned the lock.
        let at_zero = self
            .zero_debouncer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .update(snapshot.range_detected);
        self.observed.send_modify(|o| {
            o.snapshot = snapshot;
            o.at_zero = at_zero;
        });
    }

    /// Commands a move toward `setpoint`, clamped to the travel bounds.
    /// The unclamped setpoint becomes the logical reference even when the
    /// physical goal was clamped. Await [`Elevator::await_setpoint`] for
    /// arrival.
    pub async fn move_to(&self, setpoint: Setpoint) {
        let limits = self.config.soft_limits;
        let goal = setpoint.position().min(limits.forward).max(limits.reverse);
        debug!(?setpoint, goal, "commanding move");
        self.io.command_position(goal).await;
        self.observed.send_modify(|o| o.reference = setpoint);
    }

    /// True when the observed position is within tolerance of the reference.
    pub fn at_setpoint(&self) -> bool {
        Self::within_tolerance(&self.observed.borrow(), self.config.tolerance)
    }

    /// True when the elevator has arrived *and* the reference is `setpoint`;
    /// guards against "near enough" hits while pursuing a different goal.
    pub fn ready(&self, setpoint: Setpoint) -> bool {
        let o = self.observed.borrow();
        o.reference == setpoint && Self::within_tolerance(&o, self.config.tolerance)
    }

    /// True when either the observed position or the reference is at or
    /// above the unsafe height. External mechanisms gate on this.
    pub fn is_unsafe(&self) -> bool {
        let o = self.observed.borrow();
        o.snapshot.position >= self.config.unsafe_height
            || o.reference.position() >= self.config.unsafe_height
    }

    /// Debounced zero-proximity detection.
    pub fn at_zero(&self) -> bool {
        self.observed.borrow().at_zero
    }

    pub fn status(&self) -> StatusReport {
        let o = self.observed.borrow().clone();
        StatusReport {
            reference: o.reference,
            at_setpoint: Self::within_tolerance(&o, self.config.tolerance),
            is_unsafe: o.snapshot.position >= self.config.unsafe_height
                || o.reference.position() >= self.config.unsafe_height,
            at_zero: o.at_zero,
            snapshot: o.snapshot,
        }
    }

    /// Suspends until [`Elevator::at_setpoint`] holds, re-checked once per
    /// polling cycle.
    pub async fn await_setpoint(&self) {
        let tolerance = self.config.tolerance;
        let mut rx = self.observed.subscribe();
        // The sender lives in self, so this cannot fail while we are borrowed.
        let _ = rx.wait_for(|o| Self::within_tolerance(o, tolerance)).await;
    }

    /// Suspends until the debounced zero flag asserts.
    pub async fn await_zero(&self) {
        let mut rx = self.observed.subscribe();
        let _ = rx.wait_for(|o| o.at_zero).await;
    }

    /// Homes the elevator against its bottom hard stop.
    ///
    /// Moves to the zero setpoint, suspends the soft limits, then free-runs
    /// downward at a low open-loop voltage until the debounced proximity flag
    /// asserts. However the run ends (completion, cancellation through
    /// `cancel`, or the timeout expiring), the drive is stopped and the soft
    /// limits are restored before this returns. Zero is recalibrated only on
    /// a clean completion, so an aborted run can never commit a wrong zero.
    pub async fn auto_zero(&self, cancel: &CancellationToken) -> HomingOutcome {
        info!("homing started");
        let descent = async {
            self.move_to(Setpoint::Zero).await;
            self.await_setpoint().await;
            self.io.disable_limits().await;
            self.io.command_voltage(self.config.zero_voltage).await;
            self.await_zero().await;
        };

        let outcome = tokio::select! {
            _ = cancel.cancelled() => HomingOutcome::Cancelled,
            timed = tokio::time::timeout(self.config.homing_timeout, descent) => {
                match timed {
                    Ok(()) => HomingOutcome::Calibrated,
                    Err(_) => HomingOutcome::TimedOut,
                }
            }
        };

        // Unconditional cleanup: kill the open-loop drive, restore limits.
        self.io.command_voltage(0.0).await;
        self.io.enable_limits().await;

        match outcome {
            HomingOutcome::Calibrated => {
                self.io.recalibrate_zero().await;
                info!("homing complete, zero recalibrated");
            }
            HomingOutcome::Cancelled => info!("homing cancelled, limits restored"),
            HomingOutcome::TimedOut => {
                warn!(timeout = ?self.config.homing_timeout, "homing timed out before zero detect");
            }
        }
        outcome
    }

    fn within_tolerance(o: &Observed, tolerance: f64) -> bool {
        (o.reference.position() - o.snapshot.position).abs() < tolerance
    }
}
