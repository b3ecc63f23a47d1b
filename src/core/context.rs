//! Cancellation context shared by all store operations.
//!
//! An interrupt that arrives before a child process exists cancels pending
//! store calls. While a blocking local read runs (secret data from stdin or
//! a file), an interrupt terminates the process as it normally would. Once a
//! child is running, interrupts belong to the child: the supervisor relays
//! them, and the caller clears the flag with [`Context::reset`] when the
//! child has exited.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};

/// Cooperative cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    /// While set, SIGINT runs its default action.
    terminate: Arc<AtomicBool>,
}

impl Context {
    /// A context that is only cancelled through [`Context::cancel`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A context cancelled by SIGINT.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::Signals` if the handlers cannot be installed.
    #[cfg(unix)]
    pub fn with_interrupt() -> Result<Self> {
        use signal_hook::consts::SIGINT;
        use signal_hook::flag;

        let ctx = Self::new();
        flag::register_conditional_default(SIGINT, Arc::clone(&ctx.terminate))
            .map_err(crate::error::ProcessError::Signals)?;
        flag::register(SIGINT, Arc::clone(&ctx.cancelled))
            .map_err(crate::error::ProcessError::Signals)?;
        debug!("interrupt cancels pending store calls");
        Ok(ctx)
    }

    #[cfg(not(unix))]
    pub fn with_interrupt() -> Result<Self> {
        Ok(Self::new())
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Forget interrupts received so far.
    ///
    /// Called once a supervised child has exited; interrupts delivered
    /// while it ran were meant for it.
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    /// Fail with `Error::Cancelled` if an interrupt arrived.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    /// Run a blocking local read that an interrupt terminates outright.
    ///
    /// An interrupt that arrived earlier cancels before `read` starts.
    pub fn interruptible<T, E>(
        &self,
        read: impl FnOnce() -> std::result::Result<T, E>,
    ) -> Result<T>
    where
        Error: From<E>,
    {
        // Armed before the check, so no interrupt slips between the two.
        self.terminate.store(true, Ordering::SeqCst);
        let result = self.check().and_then(|()| read().map_err(Error::from));
        self.terminate.store(false, Ordering::SeqCst);
        result
    }
}
