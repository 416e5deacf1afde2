//! Node-event dispatcher: one branch per event variant.

use encore_core::error::DomainError;
use encore_core::event::{NodeEvent, TrackEndReason};
use encore_core::ids::GuildId;
use encore_core::track::{NowPlayingMarker, Track};
use encore_resolver::domain::input::DEFAULT_SEARCH_PREFIX;
use tracing::{debug, instrument};

use crate::application::controller::PlaybackController;
use crate::domain::outcomes::DispatchOutcome;

impl PlaybackController {
    /// Reacts to one node event.
    ///
    /// Events for the same guild must be dispatched one at a time; the
    /// guards below rely on seeing the effects of the previous event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError` if a store or node call fails.
    #[instrument(skip(self, event), fields(event_type = event.event_type(), guild_id = %event.guild_id()))]
    pub async fn handle_event(&self, event: NodeEvent) -> Result<DispatchOutcome, DomainError> {
        match event {
            NodeEvent::TrackStart { guild_id, track } => self.on_track_start(guild_id, track).await,
            NodeEvent::TrackEnd {
                guild_id,
                track,
                reason,
            } => self.on_track_end(guild_id, &track, reason).await,
            NodeEvent::QueueEnd { guild_id } => self.on_queue_end(guild_id).await,
        }
    }

    async fn on_track_start(
        &self,
        guild_id: GuildId,
        track: Track,
    ) -> Result<DispatchOutcome, DomainError> {
        if self
            .store
            .now_playing(guild_id)
            .await?
            .is_some_and(|marker| marker.matches(&track))
        {
            debug!("track already announced");
            return Ok(DispatchOutcome::Ignored);
        }

        let query = track.info.uri.clone().unwrap_or_else(|| {
            format!(
                "{DEFAULT_SEARCH_PREFIX}{} {}",
                track.info.title, track.info.author
            )
        });
        self.store
            .set_now_playing(guild_id, Some(&NowPlayingMarker::new(&track, query)))
            .await?;
        let requester = self
            .store
            .get_state(guild_id)
            .await?
            .current_item()
            .map(|item| item.requester);
        self.announce(guild_id, &track, requester).await;
        Ok(DispatchOutcome::Announced)
    }

    async fn on_track_end(
        &self,
        guild_id: GuildId,
        track: &Track,
        reason: TrackEndReason,
    ) -> Result<DispatchOutcome, DomainError> {
        if !reason.may_start_next() {
            debug!(?reason, "track ended without advancing");
            return Ok(DispatchOutcome::Ignored);
        }
        let is_current = self
            .store
            .now_playing(guild_id)
            .await?
            .is_some_and(|marker| marker.matches(track));
        if !is_current {
            debug!("ended track is no longer current");
            return Ok(DispatchOutcome::Ignored);
        }
        if self
            .node
            .player(guild_id)
            .await?
            .is_some_and(|player| player.repeat)
        {
            debug!("track repeats on the node");
            return Ok(DispatchOutcome::Ignored);
        }

        let outcome = self.advance_after_natural_end(guild_id).await?;
        Ok(DispatchOutcome::Advanced(outcome))
    }

    async fn on_queue_end(&self, guild_id: GuildId) -> Result<DispatchOutcome, DomainError> {
        if self
            .node
            .player(guild_id)
            .await?
            .is_some_and(|player| player.has_track())
        {
            debug!("node already playing, queue end is stale");
            return Ok(DispatchOutcome::Ignored);
        }
        if self.store.get_state(guild_id).await?.is_idle() {
            debug!("guild idle, nothing to advance");
            return Ok(DispatchOutcome::Ignored);
        }

        let outcome = self.advance_after_natural_end(guild_id).await?;
        Ok(DispatchOutcome::Advanced(outcome))
    }
}
