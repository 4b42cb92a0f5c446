#[derive(Debug)]
pub enum ProtocolError {
    /// Line was not valid JSON or did not match any known command shape
    /// (unknown type, unknown setpoint name, missing field).
    InvalidCommand(String),
    Io(std::io::Error),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProtocolError::InvalidCommand(msg) => write!(f, "invalid command: {}", msg),
            ProtocolError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl std::error::Error for ProtocolError {}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::InvalidCommand(err.to_string())
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        ProtocolError::Io(err)
    }
}
