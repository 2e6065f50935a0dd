//! Repeating-key XOR obfuscation of frame bodies.
//!
//! The server hands the key to the client once per connection (base64 inside
//! the `ServerConnect` response). Headers are never obfuscated, only bodies.
//! The cipher is not cryptography; it is the protocol's obfuscation layer and
//! must match the server bit for bit.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::WireError;

/// XORs `data` in place with a repeating key.
///
/// Byte `i` becomes `data[i] ^ key[i % key.len()]`, which makes the function
/// its own inverse. An empty key leaves the data untouched, matching the
/// pre-handshake state where frames travel in the clear.
pub fn apply(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }
    for (idx, byte) in data.iter_mut().enumerate() {
        *byte ^= key[idx % key.len()];
    }
}

/// XOR key established by the `ServerConnect` handshake step.
///
/// Set at most once per session and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XorKey(Vec<u8>);

impl XorKey {
    /// Builds a key from raw bytes, rejecting empty key material.
    pub fn new(bytes: Vec<u8>) -> Result<Self, WireError> {
        if bytes.is_empty() {
            return Err(WireError::EmptyKey);
        }
        Ok(XorKey(bytes))
    }

    /// Decodes the base64 key material delivered by the server.
    pub fn from_base64(encoded: &str) -> Result<Self, WireError> {
        Self::new(STANDARD.decode(encoded)?)
    }

    /// Returns the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Obfuscates (or deobfuscates) a body in place.
    pub fn apply(&self, data: &mut [u8]) {
        apply(data, &self.0);
    }
}
