use anyhow::Result;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::setpoint::Setpoint;

/// Commands accepted by the service loop. Replies for `Move` and `Home` are
/// held until the operation finishes (or is cancelled/superseded); the other
/// replies are immediate.
#[derive(Debug)]
pub enum Command {
    Move {
        setpoint: Setpoint,
        resp: oneshot::Sender<Result<Value>>,
    },
    Home {
        resp: oneshot::Sender<Result<Value>>,
    },
    Cancel {
        resp: oneshot::Sender<Result<Value>>,
    },
    Status {
        resp: oneshot::Sender<Result<Value>>,
    },
}
