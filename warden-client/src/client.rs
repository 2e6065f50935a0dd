//! # Execution Facade
//!
//! Purpose: Expose a compact, blocking API for issuing RCON commands.
//!
//! `RconClient` hides the pool and the session lifecycle. Each call acquires
//! a session, executes one command, and returns the session to the pool (or
//! discards it when the transport failed). Command wrappers (kick, ban, map
//! rotation and friends) live outside this crate and are built on
//! [`RconClient::execute`].

use warden_proto::{CommandBody, Response};

use crate::config::{Credentials, PoolConfig};
use crate::error::{RconError, RconResult};
use crate::pool::SessionPool;

/// Blocking RCON client with session pooling.
pub struct RconClient {
    pool: SessionPool,
}

impl RconClient {
    /// Creates a client with the default pool limits and timeouts.
    ///
    /// No connection is made yet; sessions are built lazily on first use.
    pub fn connect(credentials: Credentials) -> Self {
        Self::with_config(PoolConfig::new(credentials))
    }

    /// Creates a client with a custom configuration.
    pub fn with_config(config: PoolConfig) -> Self {
        RconClient {
            pool: SessionPool::new(config),
        }
    }

    /// Executes one command and returns its content body.
    ///
    /// A non-OK status becomes [`RconError::Command`]; the session is still
    /// healthy in that case and goes back to the pool.
    pub fn execute(
        &self,
        command: &str,
        version: i64,
        body: impl Into<CommandBody>,
    ) -> RconResult<String> {
        let response = self.execute_raw(command, version, body)?;
        if !response.status.is_ok() {
            return Err(RconError::command(&response));
        }
        Ok(response.content_body)
    }

    /// Executes one command and returns the full response without judging
    /// its status, for callers that map status codes themselves.
    pub fn execute_raw(
        &self,
        command: &str,
        version: i64,
        body: impl Into<CommandBody>,
    ) -> RconResult<Response> {
        let mut session = self.pool.acquire()?;
        session.send(command, version, body)
    }

    /// The underlying pool, for callers that need scoped acquisition.
    pub fn pool(&self) -> &SessionPool {
        &self.pool
    }

    /// Shuts the pool down; further calls fail with `PoolClosed`.
    pub fn close(&self) {
        self.pool.close();
    }
}
