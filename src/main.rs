//! Main entry point for the beetmover CLI application.

use clap::Parser;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beetmover::{Cli, PublishSummary, ScriptConfig, publish_release};

/// Application entry point.
///
/// All network I/O runs cooperatively on a single thread. Every failure is
/// logged once and mapped to its fixed exit code.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&cli).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", report(&err));
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> beetmover::Result<PublishSummary> {
    let config = ScriptConfig::load(&cli.script_config)?;
    publish_release(&cli.job(), &config).await
}

/// Render an error with its full source chain on one line.
fn report(err: &beetmover::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}
