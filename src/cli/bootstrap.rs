//! Bootstrap command.
//!
//! Creates a collection, generating the identity on first use.

use crate::cli::output;
use crate::core::context::Context;
use crate::core::reference::strip_scheme;
use crate::core::store::{BootstrapRequest, LocalStore};
use crate::error::Result;

/// Create a collection with the caller as its default recipient.
pub fn execute(
    store: &LocalStore,
    ctx: &Context,
    collection: &str,
    name: Option<String>,
    retain: usize,
) -> Result<()> {
    let collection = strip_scheme(collection).trim_end_matches('/');
    let label = name.unwrap_or_else(whoami::username);

    let created = store.bootstrap(
        ctx,
        &BootstrapRequest {
            collection: collection.to_string(),
            label: label.clone(),
            retain,
        },
    )?;

    output::success(&format!("collection {} bootstrapped", created.collection));
    output::kv("recipient: ", &label);
    output::kv("public key:", &created.public_key);
    output::kv("store:     ", store.root().join(&created.collection).display());
    if created.identity_created {
        output::kv("identity:  ", "generated");
    }

    eprintln!();
    eprintln!(
        "Next: {}",
        output::cmd(&format!(
            "cellar create {}/my-secret my-value",
            created.collection
        ))
    );
    eprintln!(
        "Then: {}",
        output::cmd(&format!(
            "cellar access {}/my-secret",
            created.collection
        ))
    );

    Ok(())
}
