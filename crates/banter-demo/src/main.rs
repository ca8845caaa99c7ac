//! Scripted walkthrough: two clients on the in-process backend, exercising
//! join, live delivery, reactions, emoji resolution, room switching, and
//! reporting. Run with `cargo run --bin banter`.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use banter_emoji::{EmojiIndex, EmoteCache, Segment};
use banter_memory::{MemoryBackend, StaticSession};
use banter_sync::{Draft, RoomSnapshot, RoomSync, SyncConfig};
use banter_types::{CustomEmote, Room};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=debug".into()),
        )
        .init();

    let config = SyncConfig::from_env();
    let backend = Arc::new(MemoryBackend::new());
    backend.set_emotes(vec![CustomEmote {
        code: "fair-go".into(),
        url: "https://example.invalid/fair-go.gif".into(),
        alt: "fair go".into(),
        category: Some("classics".into()),
    }]);

    let emoji = EmojiIndex::new(EmoteCache::new(backend.clone()));
    emoji.refresh().await;

    let first = client(&backend, &config);
    let second = client(&backend, &config);

    first.join_room(Room::General).await?;
    second.join_room(Room::General).await?;

    first.send_message(Draft::text("oi, this engine is :fire:")).await?;
    let snapshot = wait_for(&second, |s| !s.messages.is_empty()).await?;
    let message = &snapshot.messages[0];
    info!("{} said: {}", message.pseudonym, render(&emoji, message.content.as_deref()));

    second.toggle_reaction(message.id, "🔥").await?;
    let snapshot = wait_for(&first, |s| !s.reactions.is_empty()).await?;
    let aggregates = snapshot.aggregates(first.current_user());
    let tally = aggregates[&message.id]["🔥"];
    info!("🔥 x{} (mine: {})", tally.count, tally.reacted_by_me);

    let matches = emoji.autocomplete("fa");
    let completions: Vec<&str> =
        matches.iter().map(|e| e.code.as_str()).take(3).collect();
    info!("autocomplete for :fa → {completions:?}");

    let ack = second.report_message(message.id, Some("too spicy")).await?;
    info!("report acknowledged: {ack}");

    second.join_room(Room::Memes).await?;
    let snapshot = wait_for(&second, |s| s.room == Some(Room::Memes) && !s.loading).await?;
    info!("second client now in {:?} with {} messages", snapshot.room, snapshot.messages.len());

    first.delete_message(message.id).await?;
    wait_for(&first, |s| s.messages.is_empty()).await?;
    info!("message deleted everywhere");

    first.leave_room().await;
    second.leave_room().await;
    Ok(())
}

fn client(backend: &Arc<MemoryBackend>, config: &SyncConfig) -> RoomSync {
    RoomSync::new(
        backend.clone(),
        backend.clone(),
        Arc::new(StaticSession::signed_in()),
        config.clone(),
    )
}

/// Await the next snapshot satisfying `pred`, bounded by a short timeout.
async fn wait_for(
    sync: &RoomSync,
    pred: impl Fn(&RoomSnapshot) -> bool,
) -> anyhow::Result<RoomSnapshot> {
    let mut changes = sync.changes();
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = sync.snapshot();
            if pred(&snapshot) {
                return Ok(snapshot);
            }
            changes.changed().await?;
        }
    })
    .await
    .map_err(|_| anyhow::anyhow!("timed out waiting for state change"))?
}

fn render(emoji: &EmojiIndex, content: Option<&str>) -> String {
    let Some(content) = content else { return String::new() };
    emoji
        .parse(content)
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => text,
            Segment::Emoji(e) => match e.glyph {
                banter_emoji::Glyph::Unicode(glyph) => glyph,
                banter_emoji::Glyph::Image { url } => format!("[{}]({url})", e.alt),
            },
            Segment::UnknownCode(token) => token,
        })
        .collect()
}
