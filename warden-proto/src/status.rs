//! Response status codes defined by the RCON protocol.

use std::fmt;

use crate::error::WireError;

/// Status code carried in every response body.
///
/// The numeric values are wire facts; the server sends them as plain JSON
/// integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Command was accepted and executed.
    Ok = 200,
    /// Command or payload was malformed.
    BadRequest = 400,
    /// Caller is not authenticated (or the login failed).
    Unauthorized = 401,
    /// Server-side failure while executing the command.
    InternalError = 500,
}

impl StatusCode {
    /// Converts a wire integer into a status code.
    pub fn from_u16(code: u16) -> Result<Self, WireError> {
        match code {
            200 => Ok(StatusCode::Ok),
            400 => Ok(StatusCode::BadRequest),
            401 => Ok(StatusCode::Unauthorized),
            500 => Ok(StatusCode::InternalError),
            other => Err(WireError::UnknownStatus(other)),
        }
    }

    /// Returns the wire integer for this status code.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// True for `200 OK`.
    pub fn is_ok(self) -> bool {
        matches!(self, StatusCode::Ok)
    }

    fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::InternalError => "Internal Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason())
    }
}
