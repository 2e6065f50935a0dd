//! Scripted RCON server for integration tests.
//!
//! The server side of the codec is deliberately hand-rolled here, so the
//! tests cross-check the client against the wire format rather than against
//! the client's own encoder.
#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Once};
use std::thread;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::Value;

use warden_client::{Credentials, PoolConfig};

/// XOR key every scripted server hands out.
pub const KEY: &[u8] = &[1, 2, 3, 4];

/// Password every scripted server expects.
pub const PASSWORD: &str = "secret";

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Spawns a server that accepts `connections` connections, handing each to
/// `handler` on its own thread.
pub fn spawn_server<F>(connections: usize, handler: F) -> SocketAddr
where
    F: Fn(usize, TcpStream) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let handler = Arc::new(handler);

    thread::spawn(move || {
        for idx in 0..connections {
            let (stream, _) = match listener.accept() {
                Ok(pair) => pair,
                Err(_) => return,
            };
            let handler = Arc::clone(&handler);
            thread::spawn(move || handler(idx, stream));
        }
    });

    addr
}

/// Pool configuration pointed at a scripted server, with test-sized budgets.
pub fn test_config(addr: SocketAddr, max_open: usize, max_idle: usize) -> PoolConfig {
    let mut config = PoolConfig::new(Credentials::new(
        addr.ip().to_string(),
        addr.port(),
        PASSWORD,
    ));
    config.max_open = max_open;
    config.max_idle = max_idle;
    config.connect_timeout = Duration::from_secs(2);
    config.io_timeout = Duration::from_secs(2);
    config.acquire_timeout = Duration::from_secs(5);
    config
}

fn xor(data: &mut [u8], key: &[u8]) {
    if key.is_empty() {
        return;
    }
    for (idx, byte) in data.iter_mut().enumerate() {
        *byte ^= key[idx % key.len()];
    }
}

/// Reads one request frame: big-endian header, XOR'd JSON body.
pub fn read_request(stream: &mut TcpStream, key: &[u8]) -> std::io::Result<(u32, Value)> {
    let mut header = [0u8; 8];
    stream.read_exact(&mut header)?;
    let request_id = u32::from_be_bytes(header[0..4].try_into().unwrap());
    let body_len = u32::from_be_bytes(header[4..8].try_into().unwrap()) as usize;

    let mut body = vec![0u8; body_len];
    stream.read_exact(&mut body)?;
    xor(&mut body, key);
    let value = serde_json::from_slice(&body)
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    Ok((request_id, value))
}

/// Writes one response frame: little-endian header, XOR'd JSON body.
pub fn write_response(
    stream: &mut TcpStream,
    request_id: u32,
    name: &str,
    status: u16,
    status_message: &str,
    content: &str,
    key: &[u8],
) -> std::io::Result<()> {
    let body = serde_json::json!({
        "name": name,
        "version": 2,
        "statusCode": status,
        "statusMessage": status_message,
        "contentBody": content,
    });
    let payload = serde_json::to_vec(&body).expect("serialize response");
    write_raw_response(stream, request_id, &payload, key)
}

/// Writes a response frame around arbitrary body bytes, for malformed-body
/// scenarios.
pub fn write_raw_response(
    stream: &mut TcpStream,
    request_id: u32,
    payload: &[u8],
    key: &[u8],
) -> std::io::Result<()> {
    let mut payload = payload.to_vec();
    xor(&mut payload, key);

    let mut frame = Vec::with_capacity(8 + payload.len());
    frame.extend_from_slice(&request_id.to_le_bytes());
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&payload);
    stream.write_all(&frame)?;
    stream.flush()
}

/// Runs the server side of the handshake: `ServerConnect` in the clear
/// (request id 0), then `Login` under the key (request id 1).
pub fn handshake(stream: &mut TcpStream) -> std::io::Result<()> {
    let (id, request) = read_request(stream, b"")?;
    assert_eq!(id, 0, "ServerConnect must carry the first request id");
    assert_eq!(request["name"], "ServerConnect");
    assert_eq!(request["version"], 2);
    assert_eq!(request["authToken"], "");
    assert_eq!(request["contentBody"], "");
    write_response(stream, id, "ServerConnect", 200, "OK", &STANDARD.encode(KEY), b"")?;

    let (id, request) = read_request(stream, KEY)?;
    assert_eq!(id, 1, "Login must carry the second request id");
    assert_eq!(request["name"], "Login");
    assert_eq!(request["version"], 2);
    assert_eq!(request["contentBody"], PASSWORD);
    write_response(stream, id, "Login", 200, "OK", "tok-abc", KEY)
}

/// Handshakes, then answers every command with `200 OK` and an empty body
/// until the client goes away.
pub fn serve_ok_until_eof(mut stream: TcpStream) {
    if handshake(&mut stream).is_err() {
        return;
    }
    loop {
        let (id, request) = match read_request(&mut stream, KEY) {
            Ok(frame) => frame,
            Err(_) => return,
        };
        let name = request["name"].as_str().unwrap_or_default().to_string();
        if write_response(&mut stream, id, &name, 200, "OK", "", KEY).is_err() {
            return;
        }
    }
}
