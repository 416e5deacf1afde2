//! Voice handshake forwarding to the playback node.

use async_trait::async_trait;
use encore_core::error::DomainError;
use encore_core::ids::GuildId;
use encore_lavalink::LavalinkNode;

/// Receives the bot's own voice state and voice server updates, which the
/// node needs to stream audio.
#[async_trait]
pub trait VoiceBridge: Send + Sync {
    /// The bot's voice session id changed. `None` means it left voice.
    async fn voice_state(
        &self,
        guild_id: GuildId,
        session_id: Option<String>,
    ) -> Result<(), DomainError>;

    /// The platform assigned a voice server.
    async fn voice_server(
        &self,
        guild_id: GuildId,
        token: String,
        endpoint: String,
    ) -> Result<(), DomainError>;
}

#[async_trait]
impl VoiceBridge for LavalinkNode {
    async fn voice_state(
        &self,
        guild_id: GuildId,
        session_id: Option<String>,
    ) -> Result<(), DomainError> {
        self.update_voice_state(guild_id, session_id).await
    }

    async fn voice_server(
        &self,
        guild_id: GuildId,
        token: String,
        endpoint: String,
    ) -> Result<(), DomainError> {
        self.update_voice_server(guild_id, token, endpoint).await
    }
}
