//! # Warden Wire Protocol
//!
//! Purpose: Encode RCON requests and decode RCON responses for the game
//! server's length-prefixed, XOR-obfuscated TCP protocol, without doing any
//! I/O.
//!
//! ## Design Principles
//! 1. **Pure Codec**: Every function here maps bytes to types and back; the
//!    socket lives in `warden-client`.
//! 2. **Bit-Exact Framing**: Header endianness and compact JSON bodies are
//!    protocol facts, not implementation choices.
//! 3. **Fail Fast**: Malformed bodies and unknown status codes surface as
//!    typed errors immediately.
//! 4. **Own-Inverse Obfuscation**: The XOR cipher encrypts and decrypts with
//!    the same call.

mod body;
mod error;
mod frame;
mod status;
mod xor;

pub use body::{CommandBody, RequestBody, Response, ResponseBody};
pub use error::WireError;
pub use frame::{
    decode_response_body, decode_response_header, encode_request, ResponseHeader, HEADER_LEN,
    MAX_BODY_LEN,
};
pub use status::StatusCode;
pub use xor::{apply, XorKey};
