pub mod config;
pub mod hardware;
pub mod sim;

use serde::Serialize;

/// Everything the elevator observes about its devices on one polling cycle.
///
/// The controller overwrites this wholesale every cycle. Disconnected devices
/// show up as cleared `*_connected` flags with their last-known values kept in
/// place; nothing in this struct is ever an error.
#[derive(Debug, Clone, Serialize)]
pub struct SensorSnapshot {
    pub left_connected: bool,
    pub right_connected: bool,
    pub left_voltage: f64,
    pub right_voltage: f64,
    pub left_current: f64,
    pub right_current: f64,
    pub left_temp: f64,
    pub right_temp: f64,
    pub left_velocity: f64,
    pub right_velocity: f64,
    pub left_position: f64,
    pub right_position: f64,
    /// Fused carriage position used for control decisions.
    pub position: f64,
    /// Last position reference handed to the device, for telemetry.
    pub reference: f64,
    pub range_connected: bool,
    pub range_detected: bool,
    pub range_distance: f64,
    pub range_strength: f64,
}

impl Default for SensorSnapshot {
    fn default() -> Self {
        Self {
            left_connected: true,
            right_connected: true,
            left_voltage: 0.0,
            right_voltage: 0.0,
            left_current: 0.0,
            right_current: 0.0,
            left_temp: 0.0,
            right_temp: 0.0,
            left_velocity: 0.0,
            right_velocity: 0.0,
            left_position: 0.0,
            right_position: 0.0,
            position: 0.0,
            reference: 0.0,
            range_connected: true,
            range_detected: false,
            range_distance: 0.0,
            range_strength: 0.0,
        }
    }
}

/// Device contract for the elevator, with one hardware and one simulated
/// implementation selected at construction time.
///
/// No method here validates its argument: goal clamping is the controller's
/// job, and transport failures surface as snapshot flags rather than errors.
#[async_trait::async_trait]
pub trait ElevatorIo: Send + Sync {
    /// Reads the current device state. Never blocks on an unhealthy
    /// transport; stale values come back with their connected flag cleared.
    async fn update_snapshot(&self) -> SensorSnapshot;

    /// Issues a motion-profiled move toward `position` in mechanism units
    /// and remembers it as the last reference.
    async fn command_position(&self, position: f64);

    /// Open-loop voltage override, used while homing when the position
    /// feedback cannot be trusted.
    async fn command_voltage(&self, voltage: f64);

    /// Suspends software travel bounds so the carriage can reach the
    /// physical hard stop below the nominal range.
    async fn disable_limits(&self);

    /// Restores software travel bounds.
    async fn enable_limits(&self);

    /// Redefines the device's zero reference as the current physical
    /// position. Idempotent.
    async fn recalibrate_zero(&self);
}
