//! Lavalink v4 REST client.

use std::time::Duration;

use encore_core::ids::GuildId;
use reqwest::Client;
use tracing::{debug, warn};
use url::Url;

use crate::error::LavalinkError;
use crate::protocol::{LoadResponse, PlayerUpdate};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper over the node's REST endpoints.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: Client,
    base_url: Url,
    password: String,
}

impl RestClient {
    /// Create a client for the node at `base_url` (e.g. `http://localhost:2333`).
    ///
    /// # Errors
    ///
    /// Returns `LavalinkError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: Url, password: String) -> Result<Self, LavalinkError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url,
            password,
        })
    }

    /// The node's base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The node password.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// `GET /v4/loadtracks`.
    ///
    /// # Errors
    ///
    /// Returns `LavalinkError::Http` on transport, status or decode failure.
    pub async fn load_tracks(&self, identifier: &str) -> Result<LoadResponse, LavalinkError> {
        let url = self.base_url.join("v4/loadtracks")?;
        let response: LoadResponse = self
            .http
            .get(url)
            .query(&[("identifier", identifier)])
            .header("Authorization", &self.password)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        if let LoadResponse::Error(exception) = &response {
            warn!(
                identifier,
                severity = %exception.severity,
                message = exception.message.as_deref().unwrap_or("unknown"),
                "node failed to load track"
            );
        }
        Ok(response)
    }

    /// `PATCH /v4/sessions/{session}/players/{guild}`.
    ///
    /// # Errors
    ///
    /// Returns `LavalinkError::Http` on transport or status failure.
    pub async fn update_player(
        &self,
        session_id: &str,
        guild_id: GuildId,
        update: &PlayerUpdate,
    ) -> Result<(), LavalinkError> {
        let url = self.player_url(session_id, guild_id)?;
        self.http
            .patch(url)
            .header("Authorization", &self.password)
            .json(update)
            .send()
            .await?
            .error_for_status()?;
        debug!(%guild_id, "player updated");
        Ok(())
    }

    /// `DELETE /v4/sessions/{session}/players/{guild}`.
    ///
    /// # Errors
    ///
    /// Returns `LavalinkError::Http` on transport or status failure.
    pub async fn destroy_player(
        &self,
        session_id: &str,
        guild_id: GuildId,
    ) -> Result<(), LavalinkError> {
        let url = self.player_url(session_id, guild_id)?;
        self.http
            .delete(url)
            .header("Authorization", &self.password)
            .send()
            .await?
            .error_for_status()?;
        debug!(%guild_id, "player destroyed");
        Ok(())
    }

    fn player_url(&self, session_id: &str, guild_id: GuildId) -> Result<Url, LavalinkError> {
        Ok(self
            .base_url
            .join(&format!("v4/sessions/{session_id}/players/{guild_id}"))?)
    }

    /// The websocket URL matching the REST base (`ws`/`wss` + `/v4/websocket`).
    ///
    /// # Errors
    ///
    /// Returns `LavalinkError::Url` if the base URL is not http(s).
    pub fn websocket_url(&self) -> Result<Url, LavalinkError> {
        let mut url = self.base_url.join("v4/websocket")?;
        let scheme = match url.scheme() {
            "http" => "ws",
            "https" => "wss",
            other => return Err(LavalinkError::Url(format!("unsupported scheme {other}"))),
        };
        url.set_scheme(scheme)
            .map_err(|()| LavalinkError::Url(format!("cannot switch to {scheme}")))?;
        Ok(url)
    }
}
