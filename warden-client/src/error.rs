//! # Error Taxonomy
//!
//! Purpose: Give every failure mode a distinguishable kind so callers can
//! pattern-match (map a status code to a boolean, decide whether to retry at
//! their layer) without parsing message strings.
//!
//! The taxonomy also encodes the session-disposal rule: [`RconError::is_fatal`]
//! says whether the session that produced an error must be discarded instead
//! of returned to the pool.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use warden_proto::{Response, StatusCode, WireError};

/// Result type used across the client.
pub type RconResult<T> = Result<T, RconError>;

/// Errors surfaced by sessions, the pool, and the facade.
#[derive(Debug, Error)]
pub enum RconError {
    /// Connecting or handshaking with the server failed.
    #[error("connection failed: {0}")]
    Connection(#[from] ConnectError),

    /// The server rejected the `Login` credentials.
    #[error("login rejected ({status}): {message}")]
    Auth {
        status: StatusCode,
        message: String,
    },

    /// The server answered a command with a non-OK status.
    #[error("command {name:?} failed ({status}): {message}")]
    Command {
        name: String,
        status: StatusCode,
        message: String,
    },

    /// A response frame violated the expected shape.
    #[error("malformed response: {0}")]
    Message(#[from] WireError),

    /// The socket failed mid-frame (EOF, short write, or an OS error).
    #[error("connection lost: {0}")]
    ConnectionLost(#[source] io::Error),

    /// No session became available within the wait budget.
    #[error("no session available within {0:?}")]
    PoolTimeout(Duration),

    /// The pool was shut down and no longer hands out sessions.
    #[error("pool is closed")]
    PoolClosed,
}

/// Connect-phase failures, kept distinct so operators can tell DNS problems
/// from refused ports from handshake rejections.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Hostname did not resolve.
    #[error("could not resolve {host}: {source}")]
    Resolve { host: String, source: io::Error },

    /// Hostname resolved to an empty address set.
    #[error("{host} resolved to no addresses")]
    NoAddress { host: String },

    /// Server actively refused the connection.
    #[error("connection refused by {addr}")]
    Refused { addr: SocketAddr, source: io::Error },

    /// Connect did not complete within the configured timeout.
    #[error("timed out connecting to {addr} after {timeout:?}")]
    Timeout { addr: SocketAddr, timeout: Duration },

    /// Server answered the `ServerConnect` key exchange with a non-OK status.
    #[error("handshake rejected ({status}): {message}")]
    Handshake {
        status: StatusCode,
        message: String,
    },

    /// Any other socket-level failure while establishing the connection.
    #[error("io error connecting to {addr}: {source}")]
    Io { addr: SocketAddr, source: io::Error },
}

impl RconError {
    /// Builds the mid-frame transport error.
    pub(crate) fn lost(source: io::Error) -> Self {
        RconError::ConnectionLost(source)
    }

    /// Mid-frame EOF: the peer closed the socket.
    pub(crate) fn peer_closed() -> Self {
        RconError::ConnectionLost(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "peer closed the connection",
        ))
    }

    /// The kernel accepted fewer bytes than the frame holds.
    pub(crate) fn short_write(written: usize, expected: usize) -> Self {
        RconError::ConnectionLost(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short write: {written} of {expected} bytes"),
        ))
    }

    /// Maps a non-OK response onto a command failure.
    pub fn command(response: &Response) -> Self {
        RconError::Command {
            name: response.name.clone(),
            status: response.status,
            message: response.status_message.clone(),
        }
    }

    /// Whether the session that produced this error must be discarded.
    ///
    /// Transport and handshake failures poison the socket. A non-OK status
    /// or a malformed body arrives on a fully framed response, so the
    /// session stays usable. The exception is an oversized declared body
    /// length: the refused body is still sitting unread on the stream, so
    /// that session is desynced and must go. Pool errors carry no session
    /// at all.
    pub fn is_fatal(&self) -> bool {
        match self {
            RconError::Connection(_) | RconError::Auth { .. } | RconError::ConnectionLost(_) => {
                true
            }
            RconError::Message(WireError::BodyTooLarge { .. }) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatality_follows_the_disposal_rule() {
        assert!(RconError::peer_closed().is_fatal());
        assert!(RconError::Auth {
            status: StatusCode::Unauthorized,
            message: "bad password".to_string(),
        }
        .is_fatal());

        assert!(!RconError::Command {
            name: "PunishPlayer".to_string(),
            status: StatusCode::InternalError,
            message: "boom".to_string(),
        }
        .is_fatal());
        assert!(!RconError::Message(WireError::UnknownStatus(302)).is_fatal());
        assert!(!RconError::PoolTimeout(Duration::from_secs(1)).is_fatal());

        // A refused body length leaves the refused bytes on the stream.
        assert!(RconError::Message(WireError::BodyTooLarge {
            len: u32::MAX,
            max: 16 * 1024 * 1024,
        })
        .is_fatal());
    }
}
