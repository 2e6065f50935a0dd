//! Credentials and pool configuration.

use std::time::Duration;

/// Identifies one target server. Owned by whoever constructs the pool.
#[derive(Clone)]
pub struct Credentials {
    /// Hostname or IP of the game server's RCON listener.
    pub host: String,
    /// RCON TCP port.
    pub port: u16,
    /// RCON password, sent during the `Login` handshake step.
    pub password: String,
}

impl Credentials {
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Credentials {
            host: host.into(),
            port,
            password: password.into(),
        }
    }
}

// Manual Debug so the password cannot leak through logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Configuration for the session pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Target server and password.
    pub credentials: Credentials,
    /// Maximum sessions alive at once (idle + borrowed).
    pub max_open: usize,
    /// Maximum idle sessions kept warm; excess returns are closed.
    pub max_idle: usize,
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Read/write timeout applied to every socket operation.
    pub io_timeout: Duration,
    /// Default wait budget for `acquire`.
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    /// Builds a configuration with the default limits and timeouts.
    pub fn new(credentials: Credentials) -> Self {
        PoolConfig {
            credentials,
            max_open: 8,
            max_idle: 4,
            connect_timeout: Duration::from_secs(10),
            io_timeout: Duration::from_secs(20),
            acquire_timeout: Duration::from_secs(30),
        }
    }
}
