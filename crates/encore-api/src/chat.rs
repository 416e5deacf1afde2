//! `ChatGateway` over the chat front-end's HTTP API.
//!
//! The front-end owns the platform connection and renders every
//! `StatusMessage`; this client only forwards requests to it.

use std::time::Duration;

use async_trait::async_trait;
use encore_core::chat::{ChatGateway, StatusMessage};
use encore_core::error::DomainError;
use encore_core::ids::{ChannelId, GuildId, MessageId, UserId};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PROMPT_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

#[derive(Debug, Serialize)]
struct JoinVoice {
    channel_id: ChannelId,
}

#[derive(Debug, Deserialize)]
struct Occupants {
    occupants: usize,
}

#[derive(Debug, Serialize)]
struct PromptRequest {
    user_id: UserId,
    options: Vec<String>,
    timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
struct PromptAnswer {
    choice: Option<usize>,
}

fn gateway_error(err: impl std::fmt::Display) -> DomainError {
    DomainError::ExternalService(format!("chat gateway: {err}"))
}

/// HTTP client for the chat front-end.
#[derive(Debug, Clone)]
pub struct HttpChatGateway {
    http: Client,
    base_url: Url,
}

impl HttpChatGateway {
    /// Create a gateway client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(base_url: Url) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, DomainError> {
        self.base_url.join(path).map_err(gateway_error)
    }

    async fn checked(response: Response) -> Result<Response, DomainError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(gateway_error(format!("{status}: {body}")))
        }
    }
}

#[async_trait]
impl ChatGateway for HttpChatGateway {
    async fn send(
        &self,
        channel_id: ChannelId,
        message: StatusMessage,
    ) -> Result<MessageId, DomainError> {
        let response = self
            .http
            .post(self.url(&format!("channels/{channel_id}/messages"))?)
            .json(&message)
            .send()
            .await
            .map_err(gateway_error)?;
        let sent: SentMessage = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(gateway_error)?;
        debug!(%channel_id, message_id = %sent.message_id, "status message sent");
        Ok(sent.message_id)
    }

    async fn delete(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), DomainError> {
        let response = self
            .http
            .delete(self.url(&format!("channels/{channel_id}/messages/{message_id}"))?)
            .send()
            .await
            .map_err(gateway_error)?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn join_voice(&self, guild_id: GuildId, channel_id: ChannelId) -> Result<(), DomainError> {
        let response = self
            .http
            .post(self.url(&format!("guilds/{guild_id}/voice"))?)
            .json(&JoinVoice { channel_id })
            .send()
            .await
            .map_err(gateway_error)?;
        match response.status() {
            StatusCode::FORBIDDEN | StatusCode::CONFLICT => {
                let reason = response.text().await.unwrap_or_default();
                Err(DomainError::Voice(reason))
            }
            _ => Self::checked(response).await.map(|_| ()),
        }
    }

    async fn leave_voice(&self, guild_id: GuildId) -> Result<(), DomainError> {
        let response = self
            .http
            .delete(self.url(&format!("guilds/{guild_id}/voice"))?)
            .send()
            .await
            .map_err(gateway_error)?;
        Self::checked(response).await?;
        Ok(())
    }

    async fn voice_occupants(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<usize, DomainError> {
        let response = self
            .http
            .get(self.url(&format!(
                "guilds/{guild_id}/voice/channels/{channel_id}/occupants"
            ))?)
            .send()
            .await
            .map_err(gateway_error)?;
        let body: Occupants = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(gateway_error)?;
        Ok(body.occupants)
    }

    async fn prompt_choice(
        &self,
        channel_id: ChannelId,
        user_id: UserId,
        options: Vec<String>,
        timeout: Duration,
    ) -> Result<Option<usize>, DomainError> {
        let response = self
            .http
            .post(self.url(&format!("channels/{channel_id}/prompts"))?)
            .timeout(timeout + PROMPT_GRACE)
            .json(&PromptRequest {
                user_id,
                options,
                timeout_secs: timeout.as_secs(),
            })
            .send()
            .await
            .map_err(gateway_error)?;
        let answer: PromptAnswer = Self::checked(response)
            .await?
            .json()
            .await
            .map_err(gateway_error)?;
        Ok(answer.choice)
    }
}
