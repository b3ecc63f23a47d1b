//! Child process supervision.
//!
//! Runs one child with inherited stdio and a given environment, relays
//! catchable signals to it while it runs, and maps its termination onto an
//! [`ExitOutcome`].
//!
//! The relay thread and the waiter share a single `Mutex<Option<Pid>>`.
//! Reaping and clearing the slot happen in one critical section, and every
//! forward happens under the same lock, so a signal is never sent to a pid
//! that has already been reaped.

use std::ffi::OsStr;
use std::process::{Child, Command, ExitStatus};

use tracing::debug;

use crate::core::env::Environment;
use crate::core::exit::ExitOutcome;
use crate::error::{Error, ProcessError};

/// Signals forwarded to the child.
///
/// Uncatchable signals, synchronous faults, `SIGPIPE` and `SIGCHLD` are not
/// relayed.
#[cfg(unix)]
pub const RELAYED_SIGNALS: &[i32] = {
    use signal_hook::consts::signal::*;
    &[
        SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGUSR1, SIGUSR2, SIGALRM, SIGWINCH, SIGCONT, SIGTSTP,
        SIGTTIN, SIGTTOU, SIGURG, SIGXCPU, SIGXFSZ, SIGVTALRM, SIGPROF, SIGIO,
    ]
};

#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Names the child in messages, e.g. "process" or "editor".
    pub label: String,
    /// Forward received signals to the child.
    pub relay_signals: bool,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            label: "process".to_string(),
            relay_signals: true,
        }
    }
}

/// Runs a child to completion.
#[derive(Debug, Clone, Default)]
pub struct Supervisor {
    config: SupervisorConfig,
}

impl Supervisor {
    pub fn new(config: SupervisorConfig) -> Self {
        Self { config }
    }

    /// Spawn `program` with `args` and exactly `env`, then wait for it.
    pub fn run<S: AsRef<OsStr>>(&self, program: S, args: &[S], env: &Environment) -> ExitOutcome {
        let program = program.as_ref();
        let mut command = Command::new(program);
        command.args(args).env_clear().envs(env.iter());

        debug!(
            label = %self.config.label,
            program = %program.to_string_lossy(),
            args = args.len(),
            vars = env.len(),
            "starting child"
        );

        match self.supervise(command, program) {
            Ok(status) => self.outcome(status),
            Err(err) => Error::from(err).into(),
        }
    }

    #[cfg(unix)]
    fn supervise(&self, command: Command, program: &OsStr) -> Result<ExitStatus, ProcessError> {
        if self.config.relay_signals {
            relay::supervise(&self.config.label, command, program)
        } else {
            let child = self.spawn(command, program)?;
            self.wait(child)
        }
    }

    #[cfg(not(unix))]
    fn supervise(&self, command: Command, program: &OsStr) -> Result<ExitStatus, ProcessError> {
        let child = self.spawn(command, program)?;
        self.wait(child)
    }

    fn spawn(&self, command: Command, program: &OsStr) -> Result<Child, ProcessError> {
        spawn(&self.config.label, command, program)
    }

    fn wait(&self, mut child: Child) -> Result<ExitStatus, ProcessError> {
        child.wait().map_err(|source| ProcessError::Wait {
            label: self.config.label.clone(),
            source,
        })
    }

    fn outcome(&self, status: ExitStatus) -> ExitOutcome {
        let label = &self.config.label;
        debug!(label = %label, status = %status, "child finished");
        match status.code() {
            Some(0) => ExitOutcome::Success,
            Some(code) => ExitOutcome::Passthrough {
                code,
                message: format!("{} exited non-zero: {}", label, status),
            },
            None => Error::from(ProcessError::Abnormal {
                label: label.clone(),
                status: status.to_string(),
            })
            .into(),
        }
    }
}

fn spawn(label: &str, mut command: Command, program: &OsStr) -> Result<Child, ProcessError> {
    command.spawn().map_err(|source| ProcessError::Spawn {
        label: label.to_string(),
        program: program.to_string_lossy().into_owned(),
        source,
    })
}

#[cfg(unix)]
mod relay {
    use std::ffi::OsStr;
    use std::process::{Command, ExitStatus};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex, PoisonError};
    use std::thread;
    use std::time::Duration;

    use nix::errno::Errno;
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    use signal_hook::consts::SIGCHLD;
    use signal_hook::iterator::Signals;
    use tracing::{debug, trace, warn};

    use super::{spawn, RELAYED_SIGNALS};
    use crate::error::ProcessError;

    const POLL_INTERVAL: Duration = Duration::from_millis(250);

    type Slot = Arc<Mutex<Option<Pid>>>;

    pub(super) fn supervise(
        label: &str,
        command: Command,
        program: &OsStr,
    ) -> Result<ExitStatus, ProcessError> {
        let mut subscribed = RELAYED_SIGNALS.to_vec();
        subscribed.push(SIGCHLD);

        // Subscribed before spawn so nothing sent in between is lost.
        let signals = Signals::new(&subscribed).map_err(ProcessError::Signals)?;
        let handle = signals.handle();

        let mut child = match spawn(label, command, program) {
            Ok(child) => child,
            Err(err) => {
                handle.close();
                return Err(err);
            }
        };

        let slot: Slot = Arc::new(Mutex::new(Some(Pid::from_raw(child.id() as i32))));
        let (wakeup_tx, wakeup_rx) = mpsc::channel::<()>();

        let relay_slot = Arc::clone(&slot);
        let relay = thread::spawn(move || {
            let mut signals = signals;
            for sig in signals.forever() {
                if sig == SIGCHLD {
                    let _ = wakeup_tx.send(());
                    continue;
                }
                forward(&relay_slot, sig);
            }
            trace!("signal relay stopped");
        });

        let result = loop {
            {
                let mut pid = slot.lock().unwrap_or_else(PoisonError::into_inner);
                match child.try_wait() {
                    Ok(Some(status)) => {
                        *pid = None;
                        break Ok(status);
                    }
                    Ok(None) => {}
                    Err(source) => {
                        *pid = None;
                        break Err(ProcessError::Wait {
                            label: label.to_string(),
                            source,
                        });
                    }
                }
            }
            let _ = wakeup_rx.recv_timeout(POLL_INTERVAL);
        };

        handle.close();
        if relay.join().is_err() {
            warn!("signal relay thread panicked");
        }

        result
    }

    fn forward(slot: &Slot, sig: i32) {
        let pid = slot.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(pid) = *pid else {
            debug!(signal = sig, "child already reaped, signal dropped");
            return;
        };

        let signal = match Signal::try_from(sig) {
            Ok(signal) => signal,
            Err(err) => {
                warn!(signal = sig, error = %err, "unknown signal not relayed");
                return;
            }
        };

        match kill(pid, signal) {
            Ok(()) => debug!(signal = %signal, pid = %pid, "signal relayed"),
            Err(Errno::ESRCH) => debug!(signal = %signal, pid = %pid, "child gone, signal dropped"),
            Err(err) => warn!(signal = %signal, pid = %pid, error = %err, "failed to relay signal"),
        }
    }
}
