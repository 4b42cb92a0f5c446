use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Fixed control period for the poll loop.
    pub poll_period: Duration,
    pub command_queue_depth: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            poll_period: Duration::from_millis(20),
            command_queue_depth: 100,
        }
    }
}
