//! Create, update and delete commands.

use tracing::debug;

use crate::cli::output;
use crate::core::context::Context;
use crate::core::input::read_data_stdin;
use crate::core::reference::parse_locator;
use crate::core::store::{CreateRequest, DeleteRequest, LocalStore, UpdateRequest};
use crate::error::Result;

/// Create a new secret from a data token.
pub fn create(store: &LocalStore, ctx: &Context, secret: &str, data: &str) -> Result<()> {
    let reference = parse_locator(secret)?;
    let plaintext = ctx.interruptible(|| read_data_stdin(data.trim()))?;
    debug!(bytes = plaintext.len(), "secret data read");

    let info = store.create(
        ctx,
        &CreateRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
            plaintext,
        },
    )?;

    output::success(&format!(
        "created {} at generation {}",
        reference, info.generation
    ));
    Ok(())
}

/// Write a new generation, or re-encrypt the current one when no data is given.
pub fn update(
    store: &LocalStore,
    ctx: &Context,
    secret: &str,
    data: Option<&str>,
    create_if_missing: bool,
) -> Result<()> {
    let reference = parse_locator(secret)?;
    let plaintext = match data {
        Some(d) => Some(ctx.interruptible(|| read_data_stdin(d.trim()))?),
        None => None,
    };

    let info = store.update(
        ctx,
        &UpdateRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
            plaintext,
            create_if_missing,
            generation: None,
            metageneration: None,
        },
    )?;

    output::success(&format!(
        "updated {} to generation {}",
        reference, info.generation
    ));
    Ok(())
}

/// Delete a secret; succeeds when it is already gone.
pub fn delete(store: &LocalStore, ctx: &Context, secret: &str) -> Result<()> {
    let reference = parse_locator(secret)?;

    store.delete(
        ctx,
        &DeleteRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
        },
    )?;

    output::success(&format!("deleted {}", reference));
    Ok(())
}
