/// The fatal errors of a client session. Malformed lines are not errors
/// (they decode to an unhandled event and are skipped), and play-recording
/// drift is a logged no-op in the state layer.
#[derive(Debug)]
pub enum SessionError {
    /// The server answered a join or rejoin attempt with an ERROR line.
    JoinRejected { reason: String },
    /// The stream yielded EOF; the session cannot continue.
    ConnectionClosed,
}

impl std::error::Error for SessionError {}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::JoinRejected { reason } => {
                write!(f, "Server rejected the join request: {}", reason)
            }
            SessionError::ConnectionClosed => write!(f, "Server closed the connection"),
        }
    }
}
