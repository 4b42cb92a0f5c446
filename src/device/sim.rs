use tokio::sync::RwLock;

use super::{ElevatorIo, SensorSnapshot};

/// Simulated backend: first-order lag toward the commanded reference on each
/// polling cycle, with the zero-proximity flag synthesized from position.
///
/// Voltage commands, limit toggles and recalibration are deliberate no-ops;
/// the sim has no notion of open-loop drive or travel enforcement, and it
/// performs no clamping.
pub struct SimIo {
    state: RwLock<SimState>,
}

struct SimState {
    position: f64,
    reference: f64,
}

impl SimIo {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(SimState {
                position: 0.0,
                reference: 0.0,
            }),
        }
    }
}

impl Default for SimIo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ElevatorIo for SimIo {
    async fn update_snapshot(&self) -> SensorSnapshot {
        let mut state = self.state.write().await;
        state.position = 0.9 * state.position + 0.1 * state.reference;

        SensorSnapshot {
            position: state.position,
            left_position: state.position,
            right_position: state.position,
            reference: state.reference,
            range_detected: state.position < 1e-3,
            ..SensorSnapshot::default()
        }
    }

    async fn command_position(&self, position: f64) {
        self.state.write().await.reference = position;
    }

    async fn command_voltage(&self, _voltage: f64) {}

    async fn disable_limits(&self) {}

    async fn enable_limits(&self) {}

    async fn recalibrate_zero(&self) {}
}
