//! `inbrief fetch` -- run the history fetch once and print the events.

use std::sync::Arc;

use anyhow::Context;
use inbrief_core::ingest::HistoryFetcher;
use inbrief_infra::source::SnapshotDirectory;
use inbrief_types::config::AppConfig;

use super::FetchArgs;

pub async fn run_fetch(config: &AppConfig, args: FetchArgs) -> anyhow::Result<()> {
    let path = args
        .directory
        .as_deref()
        .or(config.source.directory.as_deref())
        .context("no chat directory configured (use --directory or source.directory)")?;

    let directory = Arc::new(SnapshotDirectory::load(path).await?);
    let fetcher = HistoryFetcher::new(Arc::clone(&directory), directory);

    let events = match &args.folder {
        Some(link) => fetcher.fetch_folder(link, args.since, args.until).await?,
        None => fetcher.fetch_chats(&args.chats, args.since, args.until).await?,
    };

    tracing::info!(count = events.len(), "fetch complete");
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}
