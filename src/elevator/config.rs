use std::time::Duration;

use crate::device::config::SoftLimits;

/// Controller-side tuning. Soft limits appear here as well as in the device
/// config: the controller clamps goals before they ever reach the device,
/// the device enforces the same bounds as a backstop.
#[derive(Debug, Clone)]
pub struct ElevatorConfig {
    /// Arrival window around the reference position.
    pub tolerance: f64,
    pub soft_limits: SoftLimits,
    /// Height at or above which the carriage blocks arm swing.
    pub unsafe_height: f64,
    /// Open-loop voltage used to drive into the hard stop while homing.
    pub zero_voltage: f64,
    /// How long the raw proximity flag must hold before at-zero is trusted.
    pub zero_debounce: Duration,
    /// Upper bound on the whole homing sequence; expiry aborts the open-loop
    /// descent rather than driving into the stop forever.
    pub homing_timeout: Duration,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.1,
            soft_limits: SoftLimits {
                forward: 9.9,
                reverse: 0.0,
            },
            unsafe_height: 5.0,
            zero_voltage: -1.0,
            zero_debounce: Duration::from_millis(60),
            homing_timeout: Duration::from_millis(3500),
        }
    }
}
