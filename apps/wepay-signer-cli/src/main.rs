//! wepay-signer - sign payloads from the command line.
//!
//! Reads a JSON object from stdin and prints a signature, a signed query
//! string, or a verification verdict on stdout. Logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! echo '{"token":"t","page":"p","redirect_uri":"r"}' | wepay-signer sign
//! echo '{"token":"t","page":"p","redirect_uri":"r"}' | wepay-signer query
//! echo '{"token":"t","page":"p","redirect_uri":"r"}' | wepay-signer verify <SIGNATURE>
//! ```
//!
//! Every variable below can also be given as a flag (`--client-id`,
//! `--client-secret`, `--log-level`, `--self-key`, `--hash-algo`); flags win.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WEPAY_CLIENT_ID` | *(required)* | Client id |
//! | `WEPAY_CLIENT_SECRET` | *(required)* | Client secret |
//! | `SIGNER_SELF_KEY` | `WePay` | Signing-party key |
//! | `SIGNER_HASH_ALGO` | `sha512` | Hash algorithm |
//! | `LOG_LEVEL` | `warn` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod command;

use std::io::Read;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::command::Cli;

/// Initialize the tracing subscriber on stderr.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let signer = cli.signer();
    info!(
        client_id = %signer.client_id(),
        self_key = %signer.self_key(),
        hash_algo = %signer.hash_algo(),
        "configured signer"
    );

    let mut payload = String::new();
    std::io::stdin()
        .read_to_string(&mut payload)
        .context("failed to read payload from stdin")?;

    debug!(command = ?cli.command, bytes = payload.len(), "running command");

    let outcome = cli.command.run(&signer, &payload)?;
    println!("{}", outcome.output);

    if !outcome.success {
        std::process::exit(1);
    }

    Ok(())
}
