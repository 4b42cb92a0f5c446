/// Position controller gains, applied once to the motor controller at
/// construction. Feedback runs in the vendor firmware, not in this crate.
#[derive(Debug, Clone, Copy)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub ks: f64,
    pub kv: f64,
    pub ka: f64,
    pub kg: f64,
}

/// Motion-profile bounds forwarded with every position command.
#[derive(Debug, Clone, Copy)]
pub struct MotionProfile {
    pub cruise_velocity: f64,
    pub acceleration: f64,
    pub jerk: f64,
}

/// Software travel bounds enforced at the device level.
#[derive(Debug, Clone, Copy)]
pub struct SoftLimits {
    pub forward: f64,
    pub reverse: f64,
}

#[derive(Debug, Clone)]
pub struct MotorConfig {
    pub left_id: u8,
    pub right_id: u8,
    pub invert_left: bool,
    pub supply_current_limit: f64,
    pub gear_ratio: f64,
    pub gains: Gains,
    pub profile: MotionProfile,
    pub soft_limits: SoftLimits,
}

/// Proximity sensor tuning: field of view, the minimum signal strength a
/// measurement must have to count, and the detection threshold/hysteresis.
#[derive(Debug, Clone)]
pub struct RangeConfig {
    pub id: u8,
    pub fov_x: f64,
    pub fov_y: f64,
    pub min_signal_strength: f64,
    pub proximity_threshold: f64,
    pub proximity_hysteresis: f64,
}

#[derive(Debug, Clone)]
pub struct DeviceConfig {
    pub motor: MotorConfig,
    pub range: RangeConfig,
}

const DRUM_RADIUS: f64 = 0.0254 * 2.256 / 2.0;
const DRUM_CIRCUMFERENCE: f64 = DRUM_RADIUS * 2.0 * std::f64::consts::PI;

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            left_id: 51,
            right_id: 52,
            invert_left: true,
            supply_current_limit: 100.0,
            gear_ratio: 5.2,
            gains: Gains {
                kp: 20.0,
                ki: 0.0,
                kd: 0.0,
                ks: 0.125,
                kv: 3.59 * DRUM_CIRCUMFERENCE,
                ka: 0.05 * DRUM_CIRCUMFERENCE,
                kg: 0.42,
            },
            profile: MotionProfile {
                cruise_velocity: 8.0,
                acceleration: 18.0,
                jerk: 90.0,
            },
            soft_limits: SoftLimits {
                forward: 9.9,
                reverse: 0.0,
            },
        }
    }
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            id: 53,
            fov_x: 6.75,
            fov_y: 6.75,
            min_signal_strength: 3500.0,
            proximity_threshold: 0.13,
            proximity_hysteresis: 0.0,
        }
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            motor: MotorConfig::default(),
            range: RangeConfig::default(),
        }
    }
}
