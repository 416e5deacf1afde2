//! `PostgreSQL` implementation of the `QueueStore` trait.

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::debug;

use encore_core::chat::CorrelationToken;
use encore_core::error::DomainError;
use encore_core::ids::{GuildId, MessageId};
use encore_core::queue::{GuildQueueState, QueueItem};
use encore_core::store::{GuildDocument, QueueStore, RenderedMessage, fields};
use encore_core::track::NowPlayingMarker;

use crate::error::StoreError;

const UPSERT_FIELD: &str = r"
INSERT INTO guild_players (guild_id, document)
VALUES ($1, jsonb_build_object($2::text, $3::jsonb))
ON CONFLICT (guild_id) DO UPDATE
SET document = guild_players.document || jsonb_build_object($2::text, $3::jsonb),
    updated_at = NOW()
";

const REMOVE_FIELD: &str = r"
UPDATE guild_players
SET document = document - $2::text,
    updated_at = NOW()
WHERE guild_id = $1
";

/// PostgreSQL-backed queue store. One JSONB document per guild.
#[derive(Debug, Clone)]
pub struct PgQueueStore {
    pool: PgPool,
}

impl PgQueueStore {
    /// Creates a new `PgQueueStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn document(&self, guild_id: GuildId) -> Result<GuildDocument, StoreError> {
        let row: Option<Json<GuildDocument>> =
            sqlx::query_scalar("SELECT document FROM guild_players WHERE guild_id = $1")
                .bind(key(guild_id)?)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|Json(doc)| doc).unwrap_or_default())
    }

    async fn put<T: Serialize + Sync + ?Sized>(
        &self,
        guild_id: GuildId,
        field: &'static str,
        value: &T,
    ) -> Result<(), StoreError> {
        let value = serde_json::to_value(value)?;
        sqlx::query(UPSERT_FIELD)
            .bind(key(guild_id)?)
            .bind(field)
            .bind(Json(value))
            .execute(&self.pool)
            .await?;
        debug!(%guild_id, field, "document field written");
        Ok(())
    }

    async fn remove(&self, guild_id: GuildId, field: &'static str) -> Result<(), StoreError> {
        sqlx::query(REMOVE_FIELD)
            .bind(key(guild_id)?)
            .bind(field)
            .execute(&self.pool)
            .await?;
        debug!(%guild_id, field, "document field removed");
        Ok(())
    }

    async fn put_optional<T: Serialize + Sync>(
        &self,
        guild_id: GuildId,
        field: &'static str,
        value: Option<&T>,
    ) -> Result<(), StoreError> {
        match value {
            Some(value) => self.put(guild_id, field, value).await,
            None => self.remove(guild_id, field).await,
        }
    }
}

fn key(guild_id: GuildId) -> Result<i64, StoreError> {
    i64::try_from(guild_id.get()).map_err(|_| StoreError::GuildIdOutOfRange(guild_id))
}

#[async_trait]
impl QueueStore for PgQueueStore {
    async fn get_state(&self, guild_id: GuildId) -> Result<GuildQueueState, DomainError> {
        Ok(self.document(guild_id).await?.queue_state())
    }

    async fn set_queue(&self, guild_id: GuildId, queue: &[QueueItem]) -> Result<(), DomainError> {
        Ok(self.put(guild_id, fields::QUEUE, queue).await?)
    }

    async fn set_index(&self, guild_id: GuildId, index: Option<usize>) -> Result<(), DomainError> {
        Ok(self
            .put_optional(guild_id, fields::QUEUE_INDEX, index.as_ref())
            .await?)
    }

    async fn set_loop_all(&self, guild_id: GuildId, loop_all: bool) -> Result<(), DomainError> {
        Ok(self.put(guild_id, fields::LOOP_ALL, &loop_all).await?)
    }

    async fn set_shuffle(&self, guild_id: GuildId, shuffle: &[usize]) -> Result<(), DomainError> {
        Ok(self.put(guild_id, fields::SHUFFLE_INDICES, shuffle).await?)
    }

    async fn now_playing(
        &self,
        guild_id: GuildId,
    ) -> Result<Option<NowPlayingMarker>, DomainError> {
        Ok(self.document(guild_id).await?.now_playing_marker)
    }

    async fn set_now_playing(
        &self,
        guild_id: GuildId,
        marker: Option<&NowPlayingMarker>,
    ) -> Result<(), DomainError> {
        Ok(self
            .put_optional(guild_id, fields::NOW_PLAYING_MARKER, marker)
            .await?)
    }

    async fn correlation(
        &self,
        guild_id: GuildId,
    ) -> Result<Option<CorrelationToken>, DomainError> {
        Ok(self.document(guild_id).await?.correlation)
    }

    async fn set_correlation(
        &self,
        guild_id: GuildId,
        token: Option<CorrelationToken>,
    ) -> Result<(), DomainError> {
        Ok(self
            .put_optional(guild_id, fields::CORRELATION, token.as_ref())
            .await?)
    }

    async fn rendered_message(
        &self,
        guild_id: GuildId,
        kind: RenderedMessage,
    ) -> Result<Option<MessageId>, DomainError> {
        Ok(self.document(guild_id).await?.rendered_message(kind))
    }

    async fn set_rendered_message(
        &self,
        guild_id: GuildId,
        kind: RenderedMessage,
        message_id: Option<MessageId>,
    ) -> Result<(), DomainError> {
        Ok(self
            .put_optional(guild_id, kind.field(), message_id.as_ref())
            .await?)
    }

    async fn clear_guild(&self, guild_id: GuildId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM guild_players WHERE guild_id = $1")
            .bind(key(guild_id)?)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;
        Ok(())
    }
}
