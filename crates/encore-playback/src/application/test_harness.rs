use std::sync::Arc;

use encore_core::chat::CorrelationToken;
use encore_core::ids::{ChannelId, GuildId, UserId};
use encore_core::queue::QueueItem;
use encore_core::store::GuildDocument;
use encore_core::track::{LoadResult, LoadType, NowPlayingMarker};
use encore_test_support::{InMemoryQueueStore, RecordingChat, ScriptedNode, track};

use crate::application::controller::PlaybackController;

pub(crate) const GUILD: GuildId = GuildId(10);
pub(crate) const CHANNEL: ChannelId = ChannelId(20);
pub(crate) const ALICE: UserId = UserId(30);

pub(crate) struct Harness {
    pub store: Arc<InMemoryQueueStore>,
    pub node: Arc<ScriptedNode>,
    pub chat: Arc<RecordingChat>,
    pub controller: PlaybackController,
}

pub(crate) fn item(name: &str) -> QueueItem {
    QueueItem::search(ALICE, format!("ytsearch:{name}"))
}

pub(crate) fn items(names: &[&str]) -> Vec<QueueItem> {
    names.iter().map(|n| item(n)).collect()
}

pub(crate) fn marker(name: &str) -> NowPlayingMarker {
    NowPlayingMarker::new(&track(name), format!("ytsearch:{name}"))
}

/// A guild with `names` queued and a chat context. Names starting with
/// `missing` resolve to nothing; every other name resolves to `track(name)`.
/// With an index, the node is playing that entry and the marker points at it.
pub(crate) fn harness(names: &[&str], index: Option<usize>) -> Harness {
    let store = Arc::new(InMemoryQueueStore::new());
    let node = Arc::new(ScriptedNode::new());
    let chat = Arc::new(RecordingChat::new());

    let current = index.map(|i| names[i]);
    store.put_document(
        GUILD,
        GuildDocument {
            queue: items(names),
            queue_index: index,
            now_playing_marker: current.map(marker),
            correlation: Some(CorrelationToken {
                channel_id: CHANNEL,
                last_command_message_id: None,
            }),
            ..GuildDocument::default()
        },
    );
    script(&node, names);
    if let Some(name) = current {
        node.set_playing(GUILD, track(name));
    }

    let controller = PlaybackController::new(store.clone(), node.clone(), chat.clone());
    Harness {
        store,
        node,
        chat,
        controller,
    }
}

pub(crate) fn script(node: &ScriptedNode, names: &[&str]) {
    for name in names.iter().filter(|n| !n.starts_with("missing")) {
        node.script(
            &format!("ytsearch:{name}"),
            LoadResult {
                load_type: LoadType::SearchResult,
                tracks: vec![track(name)],
            },
        );
    }
}
