//! Command-line interface.

pub mod access;
pub mod bootstrap;
pub mod completions;
pub mod edit;
pub mod exec;
pub mod list;
pub mod members;
pub mod output;
pub mod secrets;

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::core::config::{Overrides, Settings};
use crate::core::constants::DEFAULT_RETAIN;
use crate::core::context::Context;
use crate::core::exit::ExitOutcome;
use crate::core::store::LocalStore;
use crate::error::{Error, Result, RuntimeError, StoreError};

/// Cellar - resolve secret references into a child process environment.
#[derive(Parser, Debug)]
#[command(
    name = "cellar",
    about = "Store age-encrypted secrets and resolve them into a child process environment",
    version,
    after_help = "Exit codes: 60 store failure, 61 misuse, otherwise the child's exit code."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Log level
    #[arg(short, long, global = true, value_enum, default_value_t = LogLevel::Error)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(short = 'f', long, global = true, value_enum, default_value_t = LogFormat::Console)]
    pub log_format: LogFormat,

    /// Directory holding the collections
    #[arg(long, global = true, env = "CELLAR_ROOT")]
    pub root: Option<PathBuf>,

    /// age identity file used to decrypt
    #[arg(long, global = true, env = "CELLAR_IDENTITY")]
    pub identity: Option<PathBuf>,

    /// Config file
    #[arg(long, global = true, env = "CELLAR_CONFIG")]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            identity: self.identity.clone(),
            config: self.config.clone(),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Level name as a tracing filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Console,
    Json,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print a secret's plaintext
    Access {
        /// Secret as [gs://|cellar://]<collection>/<name>
        secret: String,
        /// Read a specific generation
        #[arg(long)]
        generation: Option<i64>,
    },

    /// Create a collection and make yourself its default recipient
    Bootstrap {
        /// Collection to create
        #[arg(short, long)]
        collection: String,
        /// Recipient label (defaults to your username)
        #[arg(short, long)]
        name: Option<String>,
        /// Generations kept per secret
        #[arg(long, default_value_t = DEFAULT_RETAIN)]
        retain: usize,
    },

    /// Create a new secret
    #[command(after_help = "DATA is @<file>, - (one line from stdin), \\<literal>, or a literal.")]
    Create {
        /// Secret as [gs://|cellar://]<collection>/<name>
        secret: String,
        /// Secret data
        data: String,
    },

    /// Write a new generation of a secret
    #[command(
        after_help = "Without DATA the current plaintext is re-encrypted for the current recipients."
    )]
    Update {
        /// Secret as [gs://|cellar://]<collection>/<name>
        secret: String,
        /// Secret data
        data: Option<String>,
        /// Create the secret if it does not exist
        #[arg(long)]
        create_if_missing: bool,
    },

    /// Edit a secret in your editor
    Edit {
        /// Secret as [gs://|cellar://]<collection>/<name>
        secret: String,
        /// Editor command (defaults to config, VISUAL, then EDITOR)
        #[arg(long)]
        editor: Option<String>,
        /// Create the secret if it does not exist
        #[arg(long)]
        create_if_missing: bool,
    },

    /// Delete a secret
    Delete {
        /// Secret as [gs://|cellar://]<collection>/<name>
        secret: String,
    },

    /// Run a command with secret references resolved in its environment
    Exec {
        /// Resolve references in the current environment instead of the
        /// detected runtime
        #[arg(long)]
        local: bool,
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<OsString>,
    },

    /// List secrets in a collection
    List {
        /// Collection, optionally prefixed with gs:// or cellar://
        collection: String,
        /// Only names starting with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
        /// Show every retained generation
        #[arg(short, long)]
        all_generations: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Allow members to decrypt a secret
    Grant {
        /// Secret as [gs://|cellar://]<collection>/<name>
        secret: String,
        /// Member as <label>=<age public key>
        #[arg(short, long = "member", required = true)]
        members: Vec<String>,
    },

    /// Stop members from decrypting a secret
    Revoke {
        /// Secret as [gs://|cellar://]<collection>/<name>
        secret: String,
        /// Member label
        #[arg(short, long = "member", required = true)]
        members: Vec<String>,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Run a parsed command line and report its outcome.
///
/// Prints the message of a non-success outcome, plus a hint when one
/// applies, and returns the outcome for the caller to exit with.
pub fn execute(cli: Cli) -> ExitOutcome {
    let (outcome, hint) = match dispatch(cli) {
        Ok(outcome) => (outcome, None),
        Err(err) => {
            let hint = hint_for(&err);
            (ExitOutcome::from(err), hint)
        }
    };

    if let Some(msg) = outcome.message() {
        output::error(msg);
    }
    if let Some(hint) = hint {
        output::hint(hint);
    }

    outcome
}

fn dispatch(cli: Cli) -> Result<ExitOutcome> {
    let settings = Settings::load(cli.global.overrides())?;
    let ctx = Context::with_interrupt()?;
    let store = LocalStore::from_settings(&settings);
    let done = |()| ExitOutcome::Success;

    use Command::*;
    match cli.command {
        Access { secret, generation } => {
            access::execute(&store, &ctx, &secret, generation).map(done)
        }
        Bootstrap {
            collection,
            name,
            retain,
        } => bootstrap::execute(&store, &ctx, &collection, name, retain).map(done),
        Create { secret, data } => secrets::create(&store, &ctx, &secret, &data).map(done),
        Update {
            secret,
            data,
            create_if_missing,
        } => secrets::update(&store, &ctx, &secret, data.as_deref(), create_if_missing).map(done),
        Edit {
            secret,
            editor,
            create_if_missing,
        } => edit::execute(
            &store,
            &ctx,
            &settings,
            &secret,
            editor.as_deref(),
            create_if_missing,
        ),
        Delete { secret } => secrets::delete(&store, &ctx, &secret).map(done),
        Exec { local, command } => exec::execute(&store, &ctx, local, &command),
        List {
            collection,
            prefix,
            all_generations,
            json,
        } => list::execute(&store, &ctx, &collection, prefix, all_generations, json).map(done),
        Grant { secret, members } => members::grant(&store, &ctx, &secret, &members).map(done),
        Revoke { secret, members } => members::revoke(&store, &ctx, &secret, &members).map(done),
        Completion { shell } => completions::execute(shell).map(done),
    }
}

fn hint_for(err: &Error) -> Option<&'static str> {
    match err {
        Error::Store(StoreError::NoIdentity(_))
        | Error::Store(StoreError::CollectionNotFound(_)) => {
            Some("run: cellar bootstrap --collection <collection>")
        }
        Error::Store(StoreError::Resolve { source, .. }) => hint_for(source),
        Error::Runtime(RuntimeError::Undetected) => {
            Some("use --local to resolve references from the current environment")
        }
        _ => None,
    }
}
