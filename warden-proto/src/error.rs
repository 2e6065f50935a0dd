//! Codec-level failures shared by the framing and body modules.

use thiserror::Error;

/// Errors raised while packing or unpacking a frame.
#[derive(Debug, Error)]
pub enum WireError {
    /// Body bytes were not the JSON shape the protocol requires.
    #[error("invalid body json: {0}")]
    Json(#[from] serde_json::Error),

    /// Response carried a status code outside the protocol's set.
    #[error("unknown status code {0}")]
    UnknownStatus(u16),

    /// Handshake key material was not valid base64.
    #[error("xor key is not valid base64: {0}")]
    KeyEncoding(#[from] base64::DecodeError),

    /// Handshake key material decoded to zero bytes.
    #[error("xor key must not be empty")]
    EmptyKey,

    /// Response header declared a body larger than the codec will buffer.
    #[error("declared body length {len} exceeds limit {max}")]
    BodyTooLarge { len: u32, max: u32 },
}
