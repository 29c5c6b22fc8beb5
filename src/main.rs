//! firechat binary entry point.

use clap::Parser;
use firechat::app;
use firechat::cli::Cli;
use firechat::config::FirechatConfig;
use firechat::error::FirechatError;
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "firechat=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let overrides = Cli::parse().into_overrides();
    let config = match FirechatConfig::load(&overrides) {
        Ok(config) => config,
        Err(e @ FirechatError::MissingCredential { .. }) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let mut input = BufReader::new(tokio::io::stdin());
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let exit = app::run(
        &config,
        &mut input,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
        interrupt,
    )
    .await;

    match exit {
        Ok(exit) => std::process::exit(exit.exit_code()),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
