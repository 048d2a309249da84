//! CLI command definitions for the `inbrief` binary.
//!
//! Uses clap derive macros for argument parsing. Flags that override the
//! config file can also be set through `INBRIEF_*` environment variables.

pub mod config;
pub mod fetch;
pub mod serve;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use inbrief_types::chat::ChatId;
use inbrief_types::config::AppConfig;

/// Ingest chat messages into persisted, announced batches.
#[derive(Parser)]
#[command(name = "inbrief", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of TOML/text where applicable.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true, env = "INBRIEF_LOG_JSON")]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true, env = "INBRIEF_OTEL")]
    pub otel: bool,

    /// Config file to use instead of `<data dir>/config.toml`.
    #[arg(short, long, global = true, env = "INBRIEF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Default log filter derived from `-v` / `--quiet`.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "info",
            1 => "info,inbrief=debug",
            _ => "trace",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the ingest pipeline and the HTTP API until interrupted.
    Serve(ServeArgs),

    /// Fetch chat history once and print the events as JSON.
    Fetch(FetchArgs),

    /// Print the effective configuration.
    Config(OverrideArgs),
}

/// Overrides applied on top of the config file.
#[derive(Args, Debug, Default, Clone)]
pub struct OverrideArgs {
    /// Events per batch before a capacity flush.
    #[arg(long, env = "INBRIEF_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Seconds between periodic flushes.
    #[arg(long, env = "INBRIEF_FLUSH_PERIOD")]
    pub flush_period: Option<u64>,

    /// Host to bind the HTTP server to.
    #[arg(long, env = "INBRIEF_HOST")]
    pub host: Option<String>,

    /// Port to listen on.
    #[arg(short, long, env = "INBRIEF_PORT")]
    pub port: Option<u16>,

    /// NDJSON update file (`-` for stdin).
    #[arg(long, env = "INBRIEF_UPDATES")]
    pub updates: Option<PathBuf>,

    /// JSON chat directory snapshot.
    #[arg(long, env = "INBRIEF_DIRECTORY")]
    pub directory: Option<PathBuf>,
}

impl OverrideArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(batch_size) = self.batch_size {
            config.streaming.batch_size = batch_size;
        }
        if let Some(period) = self.flush_period {
            config.streaming.flush_period_secs = period;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(updates) = &self.updates {
            config.source.updates = Some(updates.clone());
        }
        if let Some(directory) = &self.directory {
            config.source.directory = Some(directory.clone());
        }
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: OverrideArgs,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Chat to fetch (repeatable).
    #[arg(long = "chat", allow_negative_numbers = true, required_unless_present = "folder")]
    pub chats: Vec<ChatId>,

    /// Chat-folder invite link; fetches every chat it adds.
    #[arg(long, conflicts_with = "chats")]
    pub folder: Option<String>,

    /// Oldest send time to include (RFC 3339).
    #[arg(long, value_parser = parse_time)]
    pub since: DateTime<Utc>,

    /// Newest send time to include (RFC 3339).
    #[arg(long, value_parser = parse_time)]
    pub until: Option<DateTime<Utc>>,

    /// JSON chat directory snapshot.
    #[arg(long, env = "INBRIEF_DIRECTORY")]
    pub directory: Option<PathBuf>,
}

fn parse_time(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 time: {e}"))
}
