//! # Session
//!
//! Purpose: Own one authenticated TCP connection to the game server and run
//! exactly one command at a time over it.
//!
//! A session moves through `connect -> key exchange -> login` before it is
//! handed to anyone; a `Session` value you can reach is always ready. The
//! protocol is half-duplex per connection: send one frame, read one frame,
//! never overlapped, so the type needs no internal locking. Exclusive
//! ownership (pool while idle, one caller while borrowed) is the concurrency
//! model.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, trace, warn};

use warden_proto::{
    decode_response_body, decode_response_header, encode_request, CommandBody, RequestBody,
    Response, XorKey, HEADER_LEN,
};

use crate::config::PoolConfig;
use crate::error::{ConnectError, RconError, RconResult};

/// Protocol version used by both handshake commands.
const HANDSHAKE_VERSION: i64 = 2;

// Debug identifiers only; request ids are per-session.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// One authenticated connection, serving one in-flight command at a time.
pub struct Session {
    stream: TcpStream,
    peer: SocketAddr,
    key: Option<XorKey>,
    auth_token: Option<String>,
    request_counter: u32,
    closed: bool,
    id: u64,
}

impl Session {
    /// Opens a TCP connection and performs the full handshake.
    ///
    /// Every address the host resolves to is tried with the configured
    /// connect timeout; the last failure wins. Any handshake failure closes
    /// the socket before the error is returned, so a `Session` either comes
    /// back ready or not at all.
    pub fn connect(config: &PoolConfig) -> RconResult<Session> {
        let credentials = &config.credentials;
        let (stream, peer) = open_stream(config)?;

        stream
            .set_read_timeout(Some(config.io_timeout))
            .map_err(|source| ConnectError::Io { addr: peer, source })?;
        stream
            .set_write_timeout(Some(config.io_timeout))
            .map_err(|source| ConnectError::Io { addr: peer, source })?;
        // Command frames are small; don't let Nagle sit on them.
        stream
            .set_nodelay(true)
            .map_err(|source| ConnectError::Io { addr: peer, source })?;

        let mut session = Session {
            stream,
            peer,
            key: None,
            auth_token: None,
            request_counter: 0,
            closed: false,
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
        };
        debug!(session = session.id, peer = %peer, "connected");

        if let Err(err) = session.handshake(&credentials.password) {
            session.close();
            return Err(err);
        }
        debug!(session = session.id, "authenticated");
        Ok(session)
    }

    /// Sends one command and reads its response.
    ///
    /// The response is returned regardless of its status code; deciding
    /// whether a non-OK status is an error belongs to the caller (see
    /// [`RconError::command`]).
    pub fn send(
        &mut self,
        command: &str,
        version: i64,
        body: impl Into<CommandBody>,
    ) -> RconResult<Response> {
        let content = body.into().into_wire()?;
        self.round_trip(command, version, content)
    }

    /// Best-effort shutdown of the socket. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let _ = self.stream.shutdown(Shutdown::Both);
        trace!(session = self.id, "closed");
    }

    /// Opaque identifier for logs and tests.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Token obtained from `Login`; always set on a reachable session.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Address this session is connected to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Key exchange, then login. Runs once, right after the TCP connect.
    fn handshake(&mut self, password: &str) -> RconResult<()> {
        self.server_connect()?;
        self.login(password)
    }

    /// Handshake step 1: `ServerConnect` travels in the clear and brings
    /// back the XOR key as base64.
    fn server_connect(&mut self) -> RconResult<()> {
        let response = self.round_trip("ServerConnect", HANDSHAKE_VERSION, String::new())?;
        if !response.status.is_ok() {
            return Err(ConnectError::Handshake {
                status: response.status,
                message: response.status_message,
            }
            .into());
        }
        self.key = Some(XorKey::from_base64(&response.content_body)?);
        Ok(())
    }

    /// Handshake step 2: `Login` carries the raw password, now obfuscated,
    /// and brings back the auth token. Never retried at this layer.
    fn login(&mut self, password: &str) -> RconResult<()> {
        let response = self.round_trip("Login", HANDSHAKE_VERSION, password.to_string())?;
        if !response.status.is_ok() {
            return Err(RconError::Auth {
                status: response.status,
                message: response.status_message,
            });
        }
        self.auth_token = Some(response.content_body);
        Ok(())
    }

    /// One request/response exchange: assign the next request id, write the
    /// frame, read exactly one response frame.
    fn round_trip(&mut self, name: &str, version: i64, content_body: String) -> RconResult<Response> {
        let request_id = self.request_counter;
        self.request_counter = self.request_counter.wrapping_add(1);

        let body = RequestBody {
            auth_token: self.auth_token.clone().unwrap_or_default(),
            version,
            name: name.to_string(),
            content_body,
        };
        let frame = encode_request(request_id, &body, self.key_bytes())?;
        trace!(
            session = self.id,
            command = name,
            request_id,
            bytes = frame.len(),
            "sending request"
        );
        self.write_frame(&frame)?;

        let header = self.read_header()?;
        let mut payload = vec![0u8; header.body_len as usize];
        self.read_full(&mut payload)?;
        let wire = decode_response_body(payload, self.key_bytes())?;

        if header.packet_id != request_id {
            warn!(
                session = self.id,
                request_id,
                packet_id = header.packet_id,
                "response packet id does not match request id"
            );
        }

        let response = Response::from_wire(header.packet_id, wire)?;
        trace!(
            session = self.id,
            command = name,
            status = %response.status,
            "received response"
        );
        Ok(response)
    }

    fn key_bytes(&self) -> &[u8] {
        self.key.as_ref().map(XorKey::as_bytes).unwrap_or(&[])
    }

    /// Writes the whole frame with a single `write`. A short write poisons
    /// the stream (the peer would read a truncated frame), so it surfaces as
    /// a lost connection rather than being retried.
    fn write_frame(&mut self, frame: &[u8]) -> RconResult<()> {
        let written = self.stream.write(frame).map_err(RconError::lost)?;
        if written != frame.len() {
            return Err(RconError::short_write(written, frame.len()));
        }
        self.stream.flush().map_err(RconError::lost)?;
        Ok(())
    }

    fn read_header(&mut self) -> RconResult<warden_proto::ResponseHeader> {
        let mut raw = [0u8; HEADER_LEN];
        self.read_full(&mut raw)?;
        Ok(decode_response_header(&raw)?)
    }

    /// Accumulates reads until `buf` is full. A zero-length read anywhere
    /// mid-frame means the peer closed the socket.
    fn read_full(&mut self, buf: &mut [u8]) -> RconResult<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.stream.read(&mut buf[filled..]) {
                Ok(0) => return Err(RconError::peer_closed()),
                Ok(n) => filled += n,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(RconError::lost(err)),
            }
        }
        Ok(())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("peer", &self.peer)
            .field("authenticated", &self.auth_token.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

/// Resolves the host and tries each address with the connect timeout.
fn open_stream(config: &PoolConfig) -> RconResult<(TcpStream, SocketAddr)> {
    let credentials = &config.credentials;
    let host = format!("{}:{}", credentials.host, credentials.port);

    let addrs = host
        .to_socket_addrs()
        .map_err(|source| ConnectError::Resolve {
            host: host.clone(),
            source,
        })?;

    let mut last: Option<ConnectError> = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, config.connect_timeout) {
            Ok(stream) => return Ok((stream, addr)),
            Err(source) => {
                last = Some(match source.kind() {
                    io::ErrorKind::ConnectionRefused => ConnectError::Refused { addr, source },
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ConnectError::Timeout {
                        addr,
                        timeout: config.connect_timeout,
                    },
                    _ => ConnectError::Io { addr, source },
                });
            }
        }
    }
    Err(last.unwrap_or(ConnectError::NoAddress { host }).into())
}
