//! Access command.
//!
//! Prints a secret's plaintext to stdout exactly as stored.

use crate::cli::output;
use crate::core::context::Context;
use crate::core::reference::parse_locator;
use crate::core::store::{AccessRequest, LocalStore};
use crate::error::{InputError, Result};

/// Print a secret.
pub fn execute(
    store: &LocalStore,
    ctx: &Context,
    secret: &str,
    generation: Option<i64>,
) -> Result<()> {
    let reference = parse_locator(secret)?;

    let plaintext = store.access(
        ctx,
        &AccessRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
            generation,
        },
    )?;

    output::raw(&plaintext).map_err(InputError::Output)?;
    Ok(())
}
