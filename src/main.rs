//! docquery CLI entry point
//!
//! Installs logging, then hands everything else to `cli::run`. Errors go
//! to stderr with a non-zero exit status.

use std::str::FromStr;

use docquery::cli;

fn main() {
    let env = std::env::var("DOCQUERY_LOG").unwrap_or_else(|_| "warn".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = cli::run() {
        eprintln!("error [{}]: {}", e.code(), e);
        std::process::exit(1);
    }
}
