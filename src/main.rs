//! Cellar - resolve secret references into a child process environment.

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cellar::cli::{execute, Cli, GlobalArgs, LogFormat};
use cellar::core::constants::{LOG_VAR, MISUSE_EXIT_CODE};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version are reported through clap's error path too.
            let code = if err.use_stderr() { MISUSE_EXIT_CODE } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(&cli.global);

    let outcome = execute(cli);
    std::process::exit(outcome.code());
}

/// Logs go to stderr; stdout is reserved for command output.
fn init_tracing(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env(LOG_VAR)
        .unwrap_or_else(|_| EnvFilter::new(format!("cellar={}", global.log_level.as_str())));

    let registry = tracing_subscriber::registry().with(filter);
    match global.log_format {
        LogFormat::Console => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}
