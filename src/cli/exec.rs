//! Exec command.
//!
//! Resolves secret references into an environment and runs a command with
//! it under the supervisor.

use std::ffi::OsString;

use tracing::debug;

use crate::core::context::Context;
use crate::core::env::{Environment, EnvironmentResolver, Mode, ResolverConfig};
use crate::core::exit::ExitOutcome;
use crate::core::store::LocalStore;
use crate::core::supervisor::{Supervisor, SupervisorConfig};
use crate::error::{ConfigError, Result};

/// Resolve the environment and run `command` in it.
///
/// Nothing is spawned unless every reference resolves and no interrupt
/// arrived in the meantime.
pub fn execute(
    store: &LocalStore,
    ctx: &Context,
    local: bool,
    command: &[OsString],
) -> Result<ExitOutcome> {
    let (program, args) = command.split_first().ok_or(ConfigError::NoCommand)?;

    let mode = if local { Mode::Local } else { Mode::Runtime };
    debug!(?mode, "resolving environment");
    let env = EnvironmentResolver::new(store, ResolverConfig { mode })
        .resolve(ctx, Environment::current())?;

    ctx.check()?;
    let supervisor = Supervisor::new(SupervisorConfig::default());
    Ok(supervisor.run(program.clone(), args, &env))
}
