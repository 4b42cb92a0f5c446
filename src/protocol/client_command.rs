use serde::{Deserialize, Serialize};

use crate::setpoint::Setpoint;

/// One JSON line from the upstream scheduler. The optional `id` is echoed
/// back in the matching response so the scheduler can correlate replies to
/// in-flight operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Move to a named setpoint; replied to on arrival or cancellation.
    #[serde(rename = "move")]
    Move {
        setpoint: Setpoint,
        #[serde(default)]
        id: Option<String>,
    },
    /// Run the homing sequence; replied to with the homing outcome.
    #[serde(rename = "home")]
    Home {
        #[serde(default)]
        id: Option<String>,
    },
    /// Cancel the in-flight move or homing run.
    #[serde(rename = "cancel")]
    Cancel {
        #[serde(default)]
        id: Option<String>,
    },
    /// Snapshot plus derived readiness predicates.
    #[serde(rename = "status")]
    Status {
        #[serde(default)]
        id: Option<String>,
    },
    #[serde(rename = "ping")]
    Ping {
        #[serde(default)]
        id: Option<String>,
    },
}

impl ClientCommand {
    pub fn id(&self) -> Option<&String> {
        match self {
            ClientCommand::Move { id, .. }
            | ClientCommand::Home { id, .. }
            | ClientCommand::Cancel { id, .. }
            | ClientCommand::Status { id, .. }
            | ClientCommand::Ping { id, .. } => id.as_ref(),
        }
    }
}
