//! Error kinds (C11), modeled as a `thiserror` enum so handlers can match on
//! kind without string-sniffing.

use thiserror::Error;

/// Everything that can go wrong while handling a request.
///
/// `Protocol` and `Policy` are expected, data-driven outcomes — they map
/// directly onto a `NOK`/`ERR` wire response and are never logged above
/// `Verbose`. `Io` is an unexpected but recoverable failure touching the
/// filesystem for a single request. `Fatal` only ever arises at startup,
/// before the listener loop begins accepting requests.
#[derive(Debug, Error)]
pub enum GameError {
    /// Malformed request: wrong verb, wrong arity, unparsable field.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Well-formed request rejected by game-state rules (no such PLID,
    /// game already running, wrong number of trials, etc.).
    #[error("policy error: {0}")]
    Policy(String),

    /// Filesystem or I/O failure while servicing one request.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Unrecoverable condition encountered during startup.
    #[error("fatal error: {0}")]
    Fatal(String),
}

impl GameError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        GameError::Protocol(msg.into())
    }

    pub fn policy(msg: impl Into<String>) -> Self {
        GameError::Policy(msg.into())
    }

    pub fn is_protocol(&self) -> bool {
        matches!(self, GameError::Protocol(_))
    }

    pub fn is_policy(&self) -> bool {
        matches!(self, GameError::Policy(_))
    }
}
