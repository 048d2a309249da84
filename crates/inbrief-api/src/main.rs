//! inbrief CLI and HTTP API entry point.
//!
//! Binary name: `inbrief`
//!
//! Parses CLI arguments, installs the tracing subscriber, loads the
//! configuration, then dispatches to the requested command.

mod cli;
mod http;
mod state;

use clap::Parser;
use inbrief_infra::config::{load_config, resolve_data_dir};
use inbrief_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(
        &TracingOptions::new(cli.log_filter())
            .json(cli.log_json)
            .otel(cli.otel),
    )
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    let mut config = load_config(&data_dir, cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve(args) => {
            args.overrides.apply(&mut config);
            config.validate()?;
            cli::serve::serve(config, &data_dir).await?;
        }

        Commands::Fetch(args) => {
            cli::fetch::run_fetch(&config, args).await?;
        }

        Commands::Config(overrides) => {
            overrides.apply(&mut config);
            config.validate()?;
            cli::config::show_config(&config, &data_dir, cli.json)?;
        }
    }

    Ok(())
}
