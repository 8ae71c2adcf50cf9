//! Read-only query command handlers for the CLI.

use chrono::Utc;
use trendscope_core::{dedup_first_seen, CreatedWindow, DirectoryQuery, SortKey};
use trendscope_store::Store;

/// Print a channel's stored history, or only its latest growth.
///
/// # Errors
///
/// Returns an error if the channel has no history or the store read fails.
pub(crate) async fn run_history(store: &Store, channel_id: &str, growth: bool) -> anyhow::Result<()> {
    let history = store
        .load_history(channel_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no history for channel '{channel_id}'; run `trendscope collect` first"))?;

    if growth {
        match history.latest_growth() {
            Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            None => println!("{channel_id}: fewer than two days recorded, no growth yet"),
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&history)?);
    }
    Ok(())
}

/// Print the top `limit` hashtags by percentage.
///
/// # Errors
///
/// Returns an error if the hashtag table cannot be read.
pub(crate) async fn run_hashtags(store: &Store, limit: usize) -> anyhow::Result<()> {
    let table = store.load_hashtags().await?;
    if table.is_empty() {
        println!("no hashtags recorded; run `trendscope collect` first");
        return Ok(());
    }

    println!("{:<40}{:>8}", "HASHTAG", "PCT");
    for (tag, pct) in table.by_popularity().into_iter().take(limit) {
        println!("{tag:<40}{pct:>7.2}%");
    }
    Ok(())
}

/// Print the merged channel directory, filtered and sorted.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub(crate) async fn run_channels(
    store: &Store,
    sort: SortKey,
    created: Option<CreatedWindow>,
    limit: usize,
) -> anyhow::Result<()> {
    let directories = store.load_all_directories().await?;
    if directories.is_empty() {
        println!("no channel directory yet; run `trendscope directory` first");
        return Ok(());
    }

    let merged = dedup_first_seen(directories.into_iter().map(|(_, profiles)| profiles));
    let query = DirectoryQuery {
        sort,
        created_within: created,
    };
    let channels = query.apply(merged, Utc::now());

    println!(
        "{:<26}{:<32}{:>14}{:>16}{:>8}",
        "CHANNEL", "TITLE", "SUBSCRIBERS", "VIEWS", "VIDEOS"
    );
    for profile in channels.iter().take(limit) {
        let title = if profile.title.chars().count() > 30 {
            format!("{}...", profile.title.chars().take(27).collect::<String>())
        } else {
            profile.title.clone()
        };
        println!(
            "{:<26}{:<32}{:>14}{:>16}{:>8}",
            profile.channel_id, title, profile.subscribers, profile.views, profile.videos
        );
    }
    println!("{} channels match ({sort})", channels.len());
    Ok(())
}
