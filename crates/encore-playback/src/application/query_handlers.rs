//! Read-only views of a guild's playback.

use encore_core::chat::{QueueLine, StatusMessage};
use encore_core::error::DomainError;
use encore_core::ids::GuildId;
use encore_core::node::PlaybackNode;
use encore_core::store::QueueStore;

/// What is playing right now, as the node reports it.
///
/// # Errors
///
/// Returns `DomainError` if the store or node call fails.
pub async fn now_playing_view(
    guild_id: GuildId,
    store: &dyn QueueStore,
    node: &dyn PlaybackNode,
) -> Result<StatusMessage, DomainError> {
    let Some(player) = node.player(guild_id).await? else {
        return Ok(StatusMessage::NotPlaying);
    };
    let Some(track) = player.current else {
        return Ok(StatusMessage::NotPlaying);
    };
    let state = store.get_state(guild_id).await?;

    Ok(StatusMessage::NowPlaying {
        title: track.info.title,
        artist: track.info.author,
        uri: track.info.uri,
        length_ms: track.info.length_ms,
        is_stream: track.info.is_stream,
        requester: state.current_item().map(|item| item.requester),
        paused: player.paused,
    })
}

/// The queue in play order with the current entry marked.
///
/// # Errors
///
/// Returns `DomainError` if the store call fails.
pub async fn queue_view(
    guild_id: GuildId,
    store: &dyn QueueStore,
) -> Result<StatusMessage, DomainError> {
    let state = store.get_state(guild_id).await?;
    let lines = state
        .play_order()
        .into_iter()
        .enumerate()
        .filter_map(|(position, physical)| {
            let (title, subtitle) = state.queue.get(physical)?.details();
            Some(QueueLine {
                position,
                title,
                subtitle,
                current: state.index == Some(physical),
            })
        })
        .collect();

    Ok(StatusMessage::QueueListing {
        lines,
        shuffled: state.is_shuffled(),
        loop_all: state.loop_all,
    })
}
