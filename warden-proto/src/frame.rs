//! # Frame Assembly
//!
//! Purpose: Build request frames and take response frames apart. A frame is
//! one fixed 8-byte header followed by a variable-length, XOR-obfuscated
//! JSON body.
//!
//! ## Wire Layout
//!
//! ```text
//! Request frame:
//! +---------------------+---------------------+------------------+
//! | requestId: u32 BE   | bodyLength: u32 BE  | XOR(body bytes)  |
//! +---------------------+---------------------+------------------+
//!
//! Response frame:
//! +---------------------+---------------------+------------------+
//! | packetId: u32 LE    | bodyLength: u32 LE  | XOR(body bytes)  |
//! +---------------------+---------------------+------------------+
//! ```
//!
//! Request headers are big-endian, response headers little-endian. The
//! asymmetry is a bit-exact protocol detail and must not be "fixed". Headers
//! are never obfuscated; only bodies are.

use bytes::{Buf, BufMut};

use crate::body::{RequestBody, ResponseBody};
use crate::error::WireError;
use crate::xor;

/// Fixed header size for both directions.
pub const HEADER_LEN: usize = 8;

/// Upper bound on a declared response body length (16 MiB).
///
/// A header past this limit means a desynced or hostile peer; refusing it
/// keeps one bad length from forcing a giant allocation.
pub const MAX_BODY_LEN: u32 = 16 * 1024 * 1024;

/// Decoded response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Request id the server is answering.
    pub packet_id: u32,
    /// Byte length of the body that follows.
    pub body_len: u32,
}

/// Packs a request into a complete frame ready for a single write.
///
/// Serializes the body to compact JSON, obfuscates it with `key` (an empty
/// key passes the body through unchanged, the pre-handshake state), and
/// prepends the big-endian header.
pub fn encode_request(
    request_id: u32,
    body: &RequestBody,
    key: &[u8],
) -> Result<Vec<u8>, WireError> {
    let mut payload = serde_json::to_vec(body)?;
    xor::apply(&mut payload, key);

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.put_u32(request_id);
    frame.put_u32(payload.len() as u32);
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decodes the little-endian response header.
pub fn decode_response_header(bytes: &[u8; HEADER_LEN]) -> Result<ResponseHeader, WireError> {
    let mut buf = &bytes[..];
    let packet_id = buf.get_u32_le();
    let body_len = buf.get_u32_le();
    if body_len > MAX_BODY_LEN {
        return Err(WireError::BodyTooLarge {
            len: body_len,
            max: MAX_BODY_LEN,
        });
    }
    Ok(ResponseHeader {
        packet_id,
        body_len,
    })
}

/// Deobfuscates and parses a response body.
pub fn decode_response_body(mut payload: Vec<u8>, key: &[u8]) -> Result<ResponseBody, WireError> {
    xor::apply(&mut payload, key);
    Ok(serde_json::from_slice(&payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_body(name: &str) -> RequestBody {
        RequestBody {
            auth_token: String::new(),
            version: 2,
            name: name.to_string(),
            content_body: String::new(),
        }
    }

    #[test]
    fn request_header_is_big_endian() {
        // requestId=1 with a synthetic 2-byte body must yield
        // 00 00 00 01 00 00 00 02.
        let mut frame = Vec::new();
        frame.put_u32(1);
        frame.put_u32(2);
        assert_eq!(frame, [0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02]);
    }

    #[test]
    fn response_header_is_little_endian() {
        let header =
            decode_response_header(&[0x01, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(header.packet_id, 1);
        assert_eq!(header.body_len, 2);
    }

    #[test]
    fn encoded_request_declares_exact_body_length() {
        let frame = encode_request(7, &request_body("ServerConnect"), b"").unwrap();
        let declared = u32::from_be_bytes(frame[4..8].try_into().unwrap());
        assert_eq!(declared as usize, frame.len() - HEADER_LEN);
        assert_eq!(u32::from_be_bytes(frame[0..4].try_into().unwrap()), 7);
        // No key yet, so the body is readable JSON.
        assert_eq!(
            &frame[HEADER_LEN..],
            br#"{"authToken":"","version":2,"name":"ServerConnect","contentBody":""}"#
        );
    }

    #[test]
    fn encoded_body_is_obfuscated_with_key() {
        let key = [0x10, 0x20, 0x30];
        let clear = encode_request(0, &request_body("Login"), b"").unwrap();
        let masked = encode_request(0, &request_body("Login"), &key).unwrap();
        assert_eq!(clear[..HEADER_LEN], masked[..HEADER_LEN]);
        assert_ne!(clear[HEADER_LEN..], masked[HEADER_LEN..]);

        let mut body = masked[HEADER_LEN..].to_vec();
        crate::xor::apply(&mut body, &key);
        assert_eq!(body, clear[HEADER_LEN..]);
    }

    #[test]
    fn response_body_roundtrip_with_key() {
        let key = [0xaa, 0x55];
        let raw = br#"{"name":"Status","version":2,"statusCode":200,"statusMessage":"OK","contentBody":"idle"}"#;
        let mut masked = raw.to_vec();
        crate::xor::apply(&mut masked, &key);

        let body = decode_response_body(masked, &key).unwrap();
        assert_eq!(body.name, "Status");
        assert_eq!(body.status_code, 200);
        assert_eq!(body.content_body, "idle");
    }

    #[test]
    fn oversized_declared_body_is_rejected() {
        let mut raw = [0u8; HEADER_LEN];
        raw[..4].copy_from_slice(&5u32.to_le_bytes());
        raw[4..].copy_from_slice(&(MAX_BODY_LEN + 1).to_le_bytes());
        assert!(matches!(
            decode_response_header(&raw),
            Err(WireError::BodyTooLarge { .. })
        ));
    }
}
