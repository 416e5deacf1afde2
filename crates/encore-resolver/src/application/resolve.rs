//! Resolution of input and queue items.

use std::time::Duration;

use encore_core::catalog::{Catalog, CatalogTrack};
use encore_core::chat::ChatGateway;
use encore_core::error::DomainError;
use encore_core::ids::{ChannelId, UserId};
use encore_core::node::PlaybackNode;
use encore_core::queue::{ItemSource, QueueItem};
use encore_core::track::Track;
use tracing::{debug, info, instrument};

use crate::domain::input::{CatalogRef, DEFAULT_SEARCH_PREFIX, ParsedInput, classify};

/// Most options offered in one disambiguation prompt.
pub const MAX_CHOICES: usize = 10;

/// How long the requester has to pick an option.
pub const CHOICE_TIMEOUT: Duration = Duration::from_secs(60);

/// Most recommendations queued by one autoplay request.
pub const MAX_RECOMMENDATIONS: usize = 30;

/// Outcome of resolving one queue item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The node found a playable track.
    Found {
        /// The track to hand to the node.
        track: Track,
        /// The node query that produced it.
        query: String,
    },
    /// Nothing playable; the caller moves on to the next entry.
    NotFound {
        /// The node query that produced nothing.
        query: String,
    },
}

fn catalog_item(requester: UserId, track: CatalogTrack) -> QueueItem {
    QueueItem::catalog(requester, track.name, track.artist, track.id, track.duration_ms)
}

/// Turns `input` into queue items, looking up catalog links.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` for empty input, unsupported
/// catalog links and empty albums or playlists, and
/// `DomainError::ExternalService` if the catalog lookup fails.
#[instrument(skip(catalog))]
pub async fn parse(
    input: &str,
    requester: UserId,
    catalog: &dyn Catalog,
) -> Result<Vec<QueueItem>, DomainError> {
    let items = match classify(input)? {
        ParsedInput::Catalog(CatalogRef::Track(id)) => {
            vec![catalog_item(requester, catalog.get_track(&id).await?)]
        }
        ParsedInput::Catalog(CatalogRef::List(kind, id)) => {
            let list = catalog.get_tracks(kind, &id).await?;
            if list.tracks.is_empty() {
                return Err(DomainError::InvalidArgument(format!(
                    "{} '{}' has no tracks",
                    kind.as_str(),
                    list.name
                )));
            }
            info!(
                list = %list.name,
                author = %list.author,
                count = list.tracks.len(),
                "expanded catalog list"
            );
            list.tracks
                .into_iter()
                .map(|t| catalog_item(requester, t))
                .collect()
        }
        ParsedInput::Url(url) => vec![QueueItem::url(requester, url)],
        parsed @ (ParsedInput::Prefixed(_) | ParsedInput::Text(_)) => {
            let expression = parsed.search_expression().unwrap_or_default();
            vec![QueueItem::search(requester, expression)]
        }
    };
    Ok(items)
}

/// Offers the requester a choice between node search results for free text.
///
/// Input that is not free text is parsed as usual. An empty result means
/// nothing was chosen (no results, timeout, or an out-of-range answer).
///
/// # Errors
///
/// Returns `DomainError` if classification, the node search, the catalog
/// lookup or the prompt fails.
#[instrument(skip(node, catalog, chat))]
pub async fn disambiguate(
    input: &str,
    requester: UserId,
    channel_id: ChannelId,
    node: &dyn PlaybackNode,
    catalog: &dyn Catalog,
    chat: &dyn ChatGateway,
) -> Result<Vec<QueueItem>, DomainError> {
    let text = match classify(input)? {
        ParsedInput::Text(text) => text,
        _ => return parse(input, requester, catalog).await,
    };

    let result = node.search(&format!("{DEFAULT_SEARCH_PREFIX}{text}")).await?;
    let candidates: Vec<Track> = result.tracks.into_iter().take(MAX_CHOICES).collect();
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let options = candidates
        .iter()
        .map(|t| format!("{} - {}", t.info.title, t.info.author))
        .collect();
    let Some(choice) = chat
        .prompt_choice(channel_id, requester, options, CHOICE_TIMEOUT)
        .await?
    else {
        debug!("no option chosen");
        return Ok(Vec::new());
    };

    Ok(candidates
        .into_iter()
        .nth(choice)
        .map(|track| match track.info.uri {
            Some(uri) => QueueItem::url(requester, uri),
            None => QueueItem::search(
                requester,
                format!(
                    "{DEFAULT_SEARCH_PREFIX}{} {}",
                    track.info.title, track.info.author
                ),
            ),
        })
        .into_iter()
        .collect())
}

/// The node query for `item`.
#[must_use]
pub fn node_query(item: &QueueItem) -> String {
    match &item.source {
        ItemSource::Url { url } => url.clone(),
        ItemSource::Catalog { title, artist, .. } => {
            format!("{DEFAULT_SEARCH_PREFIX}{title} {artist} audio")
        }
        ItemSource::Search { expression } => expression.clone(),
    }
}

/// Asks the node for a playable track for `item`.
///
/// # Errors
///
/// Returns `DomainError::ExternalService` if the node search itself fails.
/// A search that finds nothing is `Resolution::NotFound`, not an error.
pub async fn resolve(
    item: &QueueItem,
    node: &dyn PlaybackNode,
) -> Result<Resolution, DomainError> {
    let query = node_query(item);
    let result = node.search(&query).await?;
    let load_type = result.load_type;
    match result.into_first_playable() {
        Some(track) => Ok(Resolution::Found { track, query }),
        None => {
            debug!(%query, ?load_type, "query resolved to nothing playable");
            Ok(Resolution::NotFound { query })
        }
    }
}

/// Queue items for up to `MAX_RECOMMENDATIONS` catalog recommendations
/// seeded by `seed_track_id`.
///
/// # Errors
///
/// Returns `DomainError::ExternalService` if the catalog call fails.
#[instrument(skip(catalog, user_auth))]
pub async fn expand_recommendations(
    seed_track_id: &str,
    requester: UserId,
    user_auth: Option<&str>,
    catalog: &dyn Catalog,
) -> Result<Vec<QueueItem>, DomainError> {
    let tracks = catalog.get_recommendations(seed_track_id, user_auth).await?;
    Ok(tracks
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|t| catalog_item(requester, t))
        .collect())
}

/// Catalog track id to seed recommendations from: a catalog track link in
/// `input`, or else the catalog id of `fallback`.
///
/// # Errors
///
/// Returns `DomainError::InvalidArgument` if neither names a catalog track.
pub fn recommendation_seed(
    input: Option<&str>,
    fallback: Option<&QueueItem>,
) -> Result<String, DomainError> {
    if let Some(input) = input.filter(|i| !i.trim().is_empty()) {
        return match classify(input)? {
            ParsedInput::Catalog(CatalogRef::Track(id)) => Ok(id),
            _ => Err(DomainError::InvalidArgument(
                "autoplay needs a catalog track link".to_owned(),
            )),
        };
    }
    match fallback.map(|item| &item.source) {
        Some(ItemSource::Catalog { catalog_id, .. }) => Ok(catalog_id.clone()),
        _ => Err(DomainError::InvalidArgument(
            "the current track did not come from the catalog".to_owned(),
        )),
    }
}
