//! # Warden RCON Client
//!
//! Purpose: Administer a dedicated game server over its remote-console
//! protocol (a length-prefixed, XOR-obfuscated TCP framing with a two-step
//! authentication handshake) from many concurrent callers.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: A bounded pool multiplexes callers over a few
//!    authenticated sessions; excess demand blocks with a timeout instead of
//!    opening unbounded connections.
//! 2. **One Command In Flight**: A session is half-duplex and exclusively
//!    owned while borrowed; it needs no internal locking.
//! 3. **Failure-Aware Disposal**: Sessions that saw a transport error are
//!    closed, never reused.
//! 4. **Typed Failures**: Every error is a distinguishable [`RconError`]
//!    kind; nothing is retried silently.

mod client;
mod config;
mod error;
mod pool;
mod session;

pub use client::RconClient;
pub use config::{Credentials, PoolConfig};
pub use error::{ConnectError, RconError, RconResult};
pub use pool::{PooledSession, SessionPool};
pub use session::Session;

pub use warden_proto::{CommandBody, Response, StatusCode};
