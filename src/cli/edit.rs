//! Edit command.
//!
//! Decrypts a secret into a private temporary file, opens it in the
//! user's editor, and writes the result back as a new generation. The
//! update is conditional on the generation and metageneration that were
//! read, so a concurrent change is reported rather than overwritten.

use std::ffi::OsString;
use std::io::Write;

use tracing::debug;
use zeroize::Zeroizing;

use crate::cli::output;
use crate::core::config::Settings;
use crate::core::constants::TEMPFILE_PREFIX;
use crate::core::context::Context;
use crate::core::env::Environment;
use crate::core::exit::ExitOutcome;
use crate::core::reference::parse_locator;
use crate::core::store::{LocalStore, ReadRequest, UpdateRequest};
use crate::core::supervisor::{Supervisor, SupervisorConfig};
use crate::error::{ConfigError, Error, InputError, Result, StoreError};

/// Edit a secret in place.
pub fn execute(
    store: &LocalStore,
    ctx: &Context,
    settings: &Settings,
    secret: &str,
    editor: Option<&str>,
    create_if_missing: bool,
) -> Result<ExitOutcome> {
    let editor = resolve_editor(editor, settings.editor.as_deref(), |key| {
        std::env::var(key).ok()
    })?;
    let reference = parse_locator(secret)?;

    let original = match store.read(
        ctx,
        &ReadRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
            generation: None,
        },
    ) {
        Ok(secret) => Some(secret),
        Err(Error::Store(StoreError::SecretNotFound { .. })) if create_if_missing => None,
        Err(err) => return Err(err),
    };
    let before: &[u8] = original
        .as_ref()
        .map(|s| s.plaintext.as_slice())
        .unwrap_or_default();

    // Removed when dropped, whatever the editor does.
    let mut file = tempfile::Builder::new()
        .prefix(TEMPFILE_PREFIX)
        .tempfile()
        .map_err(InputError::TempFile)?;
    file.write_all(before)
        .and_then(|()| file.as_file().sync_all())
        .map_err(InputError::TempFile)?;

    let (program, rest) = editor.split_first().ok_or(ConfigError::NoEditor)?;
    let program = OsString::from(program);
    let mut args: Vec<OsString> = rest.iter().map(OsString::from).collect();
    args.push(file.path().as_os_str().to_os_string());
    debug!(editor = %program.to_string_lossy(), path = %file.path().display(), "opening editor");

    ctx.check()?;
    let outcome = Supervisor::new(SupervisorConfig {
        label: "editor".to_string(),
        relay_signals: false,
    })
    .run(program, &args, &Environment::current());
    // The terminal delivers Ctrl-C to the editor too; it is the editor's to handle.
    ctx.reset();
    if !outcome.is_success() {
        return Ok(outcome);
    }

    let after = Zeroizing::new(std::fs::read(file.path()).map_err(|source| {
        InputError::ReadFile {
            path: file.path().to_path_buf(),
            source,
        }
    })?);
    if after.is_empty() {
        return Err(InputError::EmptySecret.into());
    }
    if after.as_slice() == before {
        return Err(InputError::Unchanged.into());
    }

    let info = store.update(
        ctx,
        &UpdateRequest {
            collection: reference.collection().to_string(),
            name: reference.name().to_string(),
            plaintext: Some(after),
            create_if_missing,
            generation: original.as_ref().map(|s| s.generation),
            metageneration: original.as_ref().map(|s| s.metageneration),
        },
    )?;

    output::success(&format!(
        "updated {} to generation {}",
        reference, info.generation
    ));
    Ok(ExitOutcome::Success)
}

/// Pick the editor command: flag, config, `VISUAL`, then `EDITOR`.
///
/// Returns the command split into words with shell quoting rules.
///
/// # Errors
///
/// Returns `ConfigError` when no editor is set, the command cannot be
/// split, or its program is not on `PATH`.
pub fn resolve_editor<F>(
    flag: Option<&str>,
    configured: Option<&str>,
    lookup: F,
) -> std::result::Result<Vec<String>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = flag
        .map(str::to_string)
        .filter(|e| !e.trim().is_empty())
        .or_else(|| configured.map(str::to_string).filter(|e| !e.trim().is_empty()))
        .or_else(|| lookup("VISUAL").filter(|e| !e.trim().is_empty()))
        .or_else(|| lookup("EDITOR").filter(|e| !e.trim().is_empty()))
        .ok_or(ConfigError::NoEditor)?;

    let words = shell_words::split(&raw)
        .map_err(|e| ConfigError::InvalidEditor(raw.clone(), e.to_string()))?;
    let program = words
        .first()
        .ok_or_else(|| ConfigError::InvalidEditor(raw.clone(), "empty command".to_string()))?;
    which::which(program).map_err(|_| ConfigError::EditorNotFound(program.clone()))?;

    Ok(words)
}
