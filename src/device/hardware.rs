use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::debug;

use super::config::{DeviceConfig, MotorConfig, RangeConfig, SoftLimits};
use super::{ElevatorIo, SensorSnapshot};

/// One telemetry frame from a position actuator. `None` from
/// [`PositionMotor::telemetry`] means the transport is unhealthy.
#[derive(Debug, Clone, Copy)]
pub struct MotorTelemetry {
    pub voltage: f64,
    pub current: f64,
    pub temp: f64,
    pub velocity: f64,
    pub position: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct RangeReading {
    pub detected: bool,
    pub distance: f64,
    pub strength: f64,
}

/// Transport seam for a motion-profiled position actuator. Implementations
/// own their bus handle exclusively; reads must not block on a dead bus.
#[async_trait::async_trait]
pub trait PositionMotor: Send + Sync {
    async fn apply_config(&self, config: &MotorConfig) -> Result<()>;
    /// Mirror another motor's output, optionally inverted.
    async fn follow(&self, leader_id: u8, invert: bool) -> Result<()>;
    async fn telemetry(&self) -> Option<MotorTelemetry>;
    async fn set_position_reference(&self, position: f64);
    async fn set_voltage(&self, voltage: f64);
    /// `None` disables soft-limit enforcement entirely.
    async fn set_soft_limits(&self, limits: Option<SoftLimits>);
    /// Declares the current physical position to be zero.
    async fn zero_position(&self);
}

/// Transport seam for the zero-proximity range sensor.
#[async_trait::async_trait]
pub trait RangeSensor: Send + Sync {
    async fn apply_config(&self, config: &RangeConfig) -> Result<()>;
    async fn reading(&self) -> Option<RangeReading>;
}

/// Real-hardware backend: two motors (left follows right, inverted) and one
/// range sensor watching the bottom of travel.
pub struct HardwareIo {
    config: DeviceConfig,
    left: Arc<dyn PositionMotor>,
    right: Arc<dyn PositionMotor>,
    range: Arc<dyn RangeSensor>,
    reference: RwLock<f64>,
    last: RwLock<SensorSnapshot>,
}

impl HardwareIo {
    pub async fn new(
        config: DeviceConfig,
        left: Arc<dyn PositionMotor>,
        right: Arc<dyn PositionMotor>,
        range: Arc<dyn RangeSensor>,
    ) -> Result<Self> {
        right.apply_config(&config.motor).await?;
        left.apply_config(&config.motor).await?;
        left.follow(config.motor.right_id, config.motor.invert_left)
            .await?;
        right.zero_position().await;
        left.zero_position().await;
        range.apply_config(&config.range).await?;

        Ok(Self {
            config,
            left,
            right,
            range,
            // No reference commanded yet.
            reference: RwLock::new(f64::NAN),
            last: RwLock::new(SensorSnapshot::default()),
        })
    }
}

#[async_trait::async_trait]
impl ElevatorIo for HardwareIo {
    async fn update_snapshot(&self) -> SensorSnapshot {
        // Start from the previous snapshot so a disconnected device keeps
        // reporting its last-known values, flagged as stale.
        let mut snap = self.last.read().await.clone();

        match self.left.telemetry().await {
            Some(t) => {
                snap.left_connected = true;
                snap.left_voltage = t.voltage;
                snap.left_current = t.current;
                snap.left_temp = t.temp;
                snap.left_velocity = t.velocity;
                snap.left_position = t.position;
            }
            None => snap.left_connected = false,
        }

        match self.right.telemetry().await {
            Some(t) => {
                snap.right_connected = true;
                snap.right_voltage = t.voltage;
                snap.right_current = t.current;
                snap.right_temp = t.temp;
                snap.right_velocity = t.velocity;
                snap.right_position = t.position;
            }
            None => snap.right_connected = false,
        }

        // The right motor carries the fused mechanism position.
        snap.position = snap.right_position;
        snap.reference = *self.reference.read().await;

        match self.range.reading().await {
            Some(r) => {
                snap.range_connected = true;
                snap.range_detected = r.detected;
                snap.range_distance = r.distance;
                snap.range_strength = r.strength;
            }
            None => snap.range_connected = false,
        }

        *self.last.write().await = snap.clone();
        snap
    }

    async fn command_position(&self, position: f64) {
        self.right.set_position_reference(position).await;
        *self.reference.write().await = position;
    }

    async fn command_voltage(&self, voltage: f64) {
        self.right.set_voltage(voltage).await;
    }

    async fn disable_limits(&self) {
        debug!("suspending soft limits");
        self.right.set_soft_limits(None).await;
        self.left.set_soft_limits(None).await;
    }

    async fn enable_limits(&self) {
        debug!("restoring soft limits");
        self.right
            .set_soft_limits(Some(self.config.motor.soft_limits))
            .await;
        self.left
            .set_soft_limits(Some(self.config.motor.soft_limits))
            .await;
    }

    async fn recalibrate_zero(&self) {
        self.right.zero_position().await;
        self.left.zero_position().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct FakeMotor {
        connected: Mutex<bool>,
        telemetry: MotorTelemetry,
        commands: Mutex<Vec<String>>,
    }

    impl FakeMotor {
        fn new(position: f64) -> Self {
            Self {
                connected: Mutex::new(true),
                telemetry: MotorTelemetry {
                    voltage: 1.5,
                    current: 10.0,
                    temp: 32.0,
                    velocity: 0.2,
                    position,
                },
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl PositionMotor for FakeMotor {
        async fn apply_config(&self, _config: &MotorConfig) -> Result<()> {
            Ok(())
        }

        async fn follow(&self, leader_id: u8, invert: bool) -> Result<()> {
            self.commands
                .lock()
                .unwrap()
                .push(format!("follow {leader_id} {invert}"));
            Ok(())
        }

        async fn telemetry(&self) -> Option<MotorTelemetry> {
            self.connected.lock().unwrap().then_some(self.telemetry)
        }

        async fn set_position_reference(&self, position: f64) {
            self.commands.lock().unwrap().push(format!("pos {position}"));
        }

        async fn set_voltage(&self, voltage: f64) {
            self.commands.lock().unwrap().push(format!("volt {voltage}"));
        }

        async fn set_soft_limits(&self, limits: Option<SoftLimits>) {
            let desc = match limits {
                Some(l) => format!("limits {} {}", l.reverse, l.forward),
                None => "limits off".to_string(),
            };
            self.commands.lock().unwrap().push(desc);
        }

        async fn zero_position(&self) {
            self.commands.lock().unwrap().push("zero".to_string());
        }
    }

    struct FakeRange {
        reading: Mutex<Option<RangeReading>>,
    }

    #[async_trait::async_trait]
    impl RangeSensor for FakeRange {
        async fn apply_config(&self, _config: &RangeConfig) -> Result<()> {
            Ok(())
        }

        async fn reading(&self) -> Option<RangeReading> {
            *self.reading.lock().unwrap()
        }
    }

    async fn build(
        left: Arc<FakeMotor>,
        right: Arc<FakeMotor>,
        range: Arc<FakeRange>,
    ) -> HardwareIo {
        HardwareIo::new(DeviceConfig::default(), left, right, range)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn snapshot_reflects_healthy_devices() {
        let left = Arc::new(FakeMotor::new(1.2));
        let right = Arc::new(FakeMotor::new(1.25));
        let range = Arc::new(FakeRange {
            reading: Mutex::new(Some(RangeReading {
                detected: true,
                distance: 0.05,
                strength: 4000.0,
            })),
        });
        let io = build(left, right.clone(), range).await;

        io.command_position(2.0).await;
        let snap = io.update_snapshot().await;

        assert!(snap.left_connected && snap.right_connected && snap.range_connected);
        assert_eq!(snap.position, 1.25);
        assert_eq!(snap.reference, 2.0);
        assert!(snap.range_detected);
        assert!(right
            .commands
            .lock()
            .unwrap()
            .iter()
            .any(|c| c == "pos 2"));
    }

    #[tokio::test]
    async fn disconnect_is_flagged_and_keeps_stale_values() {
        let left = Arc::new(FakeMotor::new(0.5));
        let right = Arc::new(FakeMotor::new(0.5));
        let range = Arc::new(FakeRange {
            reading: Mutex::new(Some(RangeReading {
                detected: false,
                distance: 0.4,
                strength: 3600.0,
            })),
        });
        let io = build(left.clone(), right.clone(), range.clone()).await;

        let healthy = io.update_snapshot().await;
        assert!(healthy.right_connected);

        *right.connected.lock().unwrap() = false;
        *range.reading.lock().unwrap() = None;
        let degraded = io.update_snapshot().await;

        assert!(!degraded.right_connected);
        assert!(!degraded.range_connected);
        // Last-known values survive the outage.
        assert_eq!(degraded.position, healthy.position);
        assert_eq!(degraded.range_distance, healthy.range_distance);
    }

    #[tokio::test]
    async fn limit_toggles_and_calibration_reach_both_motors() {
        let left = Arc::new(FakeMotor::new(0.0));
        let right = Arc::new(FakeMotor::new(0.0));
        let range = Arc::new(FakeRange {
            reading: Mutex::new(None),
        });
        let io = build(left.clone(), right.clone(), range).await;

        io.disable_limits().await;
        io.enable_limits().await;
        io.recalibrate_zero().await;

        for motor in [&left, &right] {
            let cmds = motor.commands.lock().unwrap();
            assert!(cmds.iter().any(|c| c == "limits off"));
            assert!(cmds.iter().any(|c| c.starts_with("limits 0")));
            // Once at construction, once from recalibration.
            assert_eq!(cmds.iter().filter(|c| *c == "zero").count(), 2);
        }
    }
}
