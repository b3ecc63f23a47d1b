//! List command.

use std::io::{self, Write};

use chrono::Local;

use crate::cli::output;
use crate::core::context::Context;
use crate::core::reference::strip_scheme;
use crate::core::store::{ListRequest, LocalStore, SecretInfo};
use crate::error::{InputError, Result};

const UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// List the secrets in a collection as a table or JSON.
pub fn execute(
    store: &LocalStore,
    ctx: &Context,
    collection: &str,
    prefix: Option<String>,
    all_generations: bool,
    json: bool,
) -> Result<()> {
    let collection = strip_scheme(collection).trim_end_matches('/');

    let secrets = store.list(
        ctx,
        &ListRequest {
            collection: collection.to_string(),
            prefix,
            generations: all_generations,
        },
    )?;

    let mut stdout = io::stdout().lock();
    let written = if json {
        serde_json::to_writer_pretty(&mut stdout, &secrets)
            .map_err(io::Error::from)
            .and_then(|()| writeln!(stdout))
    } else if secrets.is_empty() {
        output::warn(&format!("no secrets in {}", collection));
        Ok(())
    } else {
        write_table(&mut stdout, &secrets)
    };

    written.map_err(InputError::Output)?;
    Ok(())
}

fn write_table<W: Write>(out: &mut W, secrets: &[SecretInfo]) -> io::Result<()> {
    let rows: Vec<(String, String, String)> = secrets
        .iter()
        .map(|s| {
            (
                s.name.clone(),
                s.generation.to_string(),
                s.updated_at.with_timezone(&Local).format(UPDATED_FORMAT).to_string(),
            )
        })
        .collect();

    let name_width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0).max(4);
    let gen_width = rows.iter().map(|r| r.1.len()).max().unwrap_or(0).max(10);

    writeln!(
        out,
        "{:<name_width$}  {:<gen_width$}  UPDATED",
        "NAME", "GENERATION"
    )?;
    for (name, generation, updated) in &rows {
        writeln!(out, "{:<name_width$}  {:<gen_width$}  {}", name, generation, updated)?;
    }
    Ok(())
}
