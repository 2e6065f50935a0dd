//! Frame body JSON types.
//!
//! Both directions carry a single JSON object as the frame body. Field names
//! below are wire facts (`authToken`, `contentBody`, ...); the structs use
//! Rust naming and rename on (de)serialization.

use serde::{Deserialize, Serialize};

use crate::error::WireError;
use crate::status::StatusCode;

/// Request body as it goes onto the wire.
///
/// `content_body` is always a string at this level; structured payloads are
/// flattened to compact JSON before the body is built (see [`CommandBody`]),
/// so the serialized byte length is exactly what the frame header declares.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    /// Token obtained from `Login`; empty string before authentication.
    pub auth_token: String,
    /// Protocol version of the command.
    pub version: i64,
    /// Command name, e.g. `"ServerConnect"` or `"PunishPlayer"`.
    pub name: String,
    /// Command payload; empty string for commands without one.
    pub content_body: String,
}

/// Response body exactly as deserialized from the wire.
///
/// `status_code` stays a raw integer here; [`Response::from_wire`] converts
/// it and rejects values outside the protocol's set.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub name: String,
    pub version: i64,
    pub status_code: u16,
    pub status_message: String,
    pub content_body: String,
}

/// Fully decoded response: header packet id plus the typed body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Packet id echoed from the response header.
    pub request_id: u32,
    /// Command name the server is answering.
    pub name: String,
    /// Protocol version the server answered with.
    pub version: i64,
    /// Outcome of the command.
    pub status: StatusCode,
    /// Human-readable status detail.
    pub status_message: String,
    /// Opaque payload; callers may further JSON-decode it.
    pub content_body: String,
}

impl Response {
    /// Combines a decoded header and body into a typed response.
    pub fn from_wire(request_id: u32, body: ResponseBody) -> Result<Self, WireError> {
        let status = StatusCode::from_u16(body.status_code)?;
        Ok(Response {
            request_id,
            name: body.name,
            version: body.version,
            status,
            status_message: body.status_message,
            content_body: body.content_body,
        })
    }
}

/// Payload accepted by the send path: raw text or a structured value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandBody {
    /// Sent verbatim as `contentBody`.
    Text(String),
    /// Serialized to compact JSON (comma/colon separators, no whitespace)
    /// before it becomes `contentBody`.
    Structured(serde_json::Value),
}

impl CommandBody {
    /// Empty text payload, used by commands without arguments.
    pub fn empty() -> Self {
        CommandBody::Text(String::new())
    }

    /// Flattens the payload to the string that goes into `contentBody`.
    pub fn into_wire(self) -> Result<String, WireError> {
        match self {
            CommandBody::Text(text) => Ok(text),
            CommandBody::Structured(value) => Ok(serde_json::to_string(&value)?),
        }
    }
}

impl From<&str> for CommandBody {
    fn from(text: &str) -> Self {
        CommandBody::Text(text.to_string())
    }
}

impl From<String> for CommandBody {
    fn from(text: String) -> Self {
        CommandBody::Text(text)
    }
}

impl From<serde_json::Value> for CommandBody {
    fn from(value: serde_json::Value) -> Self {
        CommandBody::Structured(value)
    }
}
