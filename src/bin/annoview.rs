//! annoview - annotator selection and span overlay CLI
//!
//! # Usage
//!
//! ```bash
//! # Start from nothing and pick named entities; prerequisites get locked
//! annoview select annotators.toml --none -t ner
//!
//! # Same, as JSON
//! annoview select annotators.toml --none -t ner --json
//!
//! # Render a simplification response to HTML paragraphs
//! annoview render response.json -o sentences.html
//!
//! # Plain text, logging every skipped span
//! RUST_LOG=annoview=debug annoview render response.json --strip
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use annoview::cli::commands::{render, select};
use annoview::cli::output::color;
use annoview::cli::utils::load_config;
use annoview::cli::{Cli, Commands};

/// Install the stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("annoview={}", level)));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(verbose > 1),
    );
    // A subscriber can only be installed once per process.
    let _ = subscriber.try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(cli.config.as_deref()).and_then(|config| {
        tracing::debug!(?config, "configuration loaded");
        match cli.command {
            Commands::Select(args) => select::run(args, &config),
            Commands::Render(args) => render::run(args, &config),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", color("31", "error:"), e);
            ExitCode::FAILURE
        }
    }
}
