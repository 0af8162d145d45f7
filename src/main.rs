//! # bpm
//!
//! Command-line front end for the multi-tenant process management core.
//!
//! ```bash
//! # One-time setup and sample data
//! bpm init
//! bpm seed demo.yaml
//!
//! # Everyday usage (the actor is an email registered via `bpm persona`)
//! bpm --actor ana@acme.com process create "Onboarding" --activity 1 --activity 2
//! bpm --actor ana@acme.com process list --status draft
//! bpm --actor ana@acme.com process history 1
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{Instrument, Level, event};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use bpm::cli::{self, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("invocation", %request_id);

    let cli = Cli::parse();
    let result = cli::run(cli).instrument(span).await;
    if let Err(e) = &result {
        event!(Level::ERROR, %request_id, error = %e, "command failed");
    }
    result
}
