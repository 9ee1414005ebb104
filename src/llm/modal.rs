//! Process-wide mode selector
//!
//! `ModalGateway` wraps a stateless adapter with a mutable "current mode".
//! All access goes through a [`ModeSession`], which holds the selector lock
//! for its whole lifetime, so set_mode + invoke + restore form one critical
//! section. Concurrent pipeline runs queue here instead of interleaving.
//!
//! Dropping a session always resets the selector to [`Mode::Generation`],
//! including during unwinding. A lock poisoned by a panicking holder is
//! recovered, since the restore already ran in that holder's `Drop`.

use crate::llm::{GatewayError, InferenceGateway, Mode};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, trace};

/// Adapter plus the shared mode selector
#[derive(Debug)]
pub struct ModalGateway<G> {
    inner: G,
    mode: Mutex<Mode>,
}

impl<G: InferenceGateway> ModalGateway<G> {
    /// Wrap an adapter; the selector starts in generation mode
    pub fn new(inner: G) -> Self {
        Self {
            inner,
            mode: Mutex::new(Mode::Generation),
        }
    }

    /// Mode currently selected
    ///
    /// Blocks while another session is open. Calling this from a thread that
    /// holds a session deadlocks; use [`ModeSession::mode`] there.
    pub fn current_mode(&self) -> Mode {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open an exclusive session on the selector
    pub fn session(&self) -> ModeSession<'_, G> {
        let guard = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
        trace!(provider = self.inner.provider_name(), "gateway session opened");
        ModeSession {
            inner: &self.inner,
            mode: guard,
        }
    }

    /// Underlying adapter
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

/// Exclusive hold on the selector
pub struct ModeSession<'a, G: InferenceGateway> {
    inner: &'a G,
    mode: MutexGuard<'a, Mode>,
}

impl<'a, G: InferenceGateway> ModeSession<'a, G> {
    /// Select the mode for subsequent invocations; no-op if already active
    pub fn set_mode(&mut self, mode: Mode) {
        let current = *self.mode;
        if current != mode {
            debug!(from = %current, to = %mode, "gateway mode switch");
            *self.mode = mode;
        }
    }

    pub fn mode(&self) -> Mode {
        *self.mode
    }

    /// Invoke the adapter with the mode in effect right now
    pub fn invoke(&self, prompt: &str) -> Result<String, GatewayError> {
        self.inner.invoke(*self.mode, prompt)
    }
}

impl<'a, G: InferenceGateway> Drop for ModeSession<'a, G> {
    fn drop(&mut self) {
        let current = *self.mode;
        if current != Mode::Generation {
            debug!(from = %current, "gateway mode restored to generation");
            *self.mode = Mode::Generation;
        }
    }
}
