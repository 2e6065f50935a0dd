//! # Session Pool
//!
//! Purpose: Multiplex many concurrent callers over a small number of
//! authenticated sessions to one server.
//!
//! ## Design Principles
//! 1. **Object Pool Pattern**: Keep a bounded set of reusable sessions.
//! 2. **Minimal Locking**: Hold the mutex only while moving sessions; the
//!    connect/handshake runs with the lock released.
//! 3. **Bounded Blocking**: Exceeding `max_open` blocks on a condition
//!    variable until a session frees up or the wait budget runs out.
//! 4. **Failure-Aware Disposal**: A session that saw a fatal error is closed,
//!    never cached; only healthy sessions reach the idle stack.
//!
//! The idle stack is LIFO: a recently returned session sits on a socket that
//! just proved itself, and is preferred over one that has been idle long
//! enough for the server to have dropped it.

use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use warden_proto::{CommandBody, Response};

use crate::config::PoolConfig;
use crate::error::{RconError, RconResult};
use crate::session::Session;

struct PoolState {
    idle: Vec<Session>,
    open: usize,
    closed: bool,
}

struct PoolInner {
    config: PoolConfig,
    state: Mutex<PoolState>,
    available: Condvar,
}

/// Pool handle. Clones share the same pool.
#[derive(Clone)]
pub struct SessionPool {
    inner: Arc<PoolInner>,
}

impl SessionPool {
    /// Creates a pool for one target server. No connection is made until the
    /// first `acquire`.
    pub fn new(config: PoolConfig) -> Self {
        let state = PoolState {
            idle: Vec::with_capacity(config.max_idle),
            open: 0,
            closed: false,
        };
        SessionPool {
            inner: Arc::new(PoolInner {
                config,
                state: Mutex::new(state),
                available: Condvar::new(),
            }),
        }
    }

    /// Acquires a session, waiting up to the configured `acquire_timeout`.
    pub fn acquire(&self) -> RconResult<PooledSession> {
        self.acquire_timeout(self.inner.config.acquire_timeout)
    }

    /// Acquires a session, waiting up to `wait`.
    ///
    /// Preference order: most-recently-returned idle session, then a freshly
    /// created one if under `max_open`, then block until a waiter is woken
    /// or the deadline passes (`PoolTimeout`).
    pub fn acquire_timeout(&self, wait: Duration) -> RconResult<PooledSession> {
        let deadline = Instant::now() + wait;
        let mut state = self.inner.lock();
        loop {
            if state.closed {
                return Err(RconError::PoolClosed);
            }
            if let Some(session) = state.idle.pop() {
                trace!(session = session.id(), "acquired idle session");
                return Ok(PooledSession::new(Arc::clone(&self.inner), session));
            }
            if state.open < self.inner.config.max_open {
                // Reserve the slot before releasing the lock so concurrent
                // acquires cannot overshoot max_open while we handshake.
                state.open += 1;
                drop(state);
                return self.create_session();
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(RconError::PoolTimeout(wait));
            }
            let (guard, _) = self
                .inner
                .available
                .wait_timeout(state, deadline - now)
                .expect("pool mutex poisoned");
            state = guard;
        }
    }

    /// Closes the pool: drains and closes idle sessions, wakes all waiters,
    /// and makes further `acquire` calls fail with `PoolClosed`. Sessions
    /// still borrowed are closed when they come back.
    pub fn close(&self) {
        let drained = {
            let mut state = self.inner.lock();
            if state.closed {
                return;
            }
            state.closed = true;
            let drained = std::mem::take(&mut state.idle);
            state.open = state.open.saturating_sub(drained.len());
            drained
        };
        self.inner.available.notify_all();
        for mut session in drained {
            session.close();
        }
        debug!("pool closed");
    }

    /// Connect + handshake with the slot already reserved; roll the slot
    /// back if it fails.
    fn create_session(&self) -> RconResult<PooledSession> {
        match Session::connect(&self.inner.config) {
            Ok(session) => {
                debug!(session = session.id(), "created session");
                Ok(PooledSession::new(Arc::clone(&self.inner), session))
            }
            Err(err) => {
                let mut state = self.inner.lock();
                state.open = state.open.saturating_sub(1);
                drop(state);
                // The freed slot lets a waiter try to create its own.
                self.inner.available.notify_one();
                Err(err)
            }
        }
    }
}

impl PoolInner {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().expect("pool mutex poisoned")
    }

    /// Happy-path return. Caches the session unless idle is full or the pool
    /// has been closed, in which case the session is closed instead.
    ///
    /// `open` tracks sessions alive (idle + borrowed) and is decremented
    /// exactly once, when a session is closed. It deliberately does not move
    /// on idle/borrowed transitions.
    fn release(&self, mut session: Session) {
        {
            let mut state = self.lock();
            if !state.closed && state.idle.len() < self.config.max_idle {
                trace!(session = session.id(), "released session to idle");
                state.idle.push(session);
                drop(state);
                self.available.notify_one();
                return;
            }
            state.open = state.open.saturating_sub(1);
        }
        self.available.notify_one();
        debug!(session = session.id(), "idle full, closing returned session");
        session.close();
    }

    /// Failure-path return. The session is closed unconditionally; a session
    /// that raised an error must never reach idle.
    fn discard(&self, mut session: Session) {
        {
            let mut state = self.lock();
            state.open = state.open.saturating_sub(1);
        }
        self.available.notify_one();
        debug!(session = session.id(), "discarded session");
        session.close();
    }
}

/// Borrowed session with a guaranteed return.
///
/// Exactly one of release/discard happens per acquire: explicitly via
/// [`PooledSession::release`] / [`PooledSession::discard`], or on drop, where
/// the outcome follows what `send` observed. Any fatal error flips the
/// guard to the discard path.
pub struct PooledSession {
    pool: Arc<PoolInner>,
    session: Option<Session>,
    healthy: bool,
}

impl PooledSession {
    fn new(pool: Arc<PoolInner>, session: Session) -> Self {
        PooledSession {
            pool,
            session: Some(session),
            healthy: true,
        }
    }

    /// Sends one command on the borrowed session.
    ///
    /// A fatal error (lost connection) marks the guard so the session is
    /// discarded on return; command-level failures (non-OK status decided by
    /// the caller, malformed body) leave it healthy.
    pub fn send(
        &mut self,
        command: &str,
        version: i64,
        body: impl Into<CommandBody>,
    ) -> RconResult<Response> {
        let session = self.session.as_mut().expect("session present");
        let result = session.send(command, version, body);
        if let Err(err) = &result {
            if err.is_fatal() {
                self.healthy = false;
            }
        }
        result
    }

    /// Debug identifier of the borrowed session.
    pub fn id(&self) -> u64 {
        self.session.as_ref().expect("session present").id()
    }

    /// Read access to the borrowed session.
    pub fn session(&self) -> &Session {
        self.session.as_ref().expect("session present")
    }

    /// Returns the session to the pool for reuse.
    ///
    /// If this borrow already observed a fatal error, the session is
    /// discarded anyway; an errored session never reaches idle.
    pub fn release(self) {
        drop(self);
    }

    /// Closes the session instead of returning it.
    pub fn discard(mut self) {
        self.healthy = false;
    }
}

impl std::fmt::Debug for PooledSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledSession")
            .field("session", &self.session)
            .field("healthy", &self.healthy)
            .finish()
    }
}

impl Drop for PooledSession {
    fn drop(&mut self) {
        let session = match self.session.take() {
            Some(session) => session,
            None => return,
        };
        if self.healthy {
            self.pool.release(session);
        } else {
            self.pool.discard(session);
        }
    }
}
