//! Minimal Discord REST v10 client: the notification channel, slash-command
//! registration and deferred interaction replies.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use stockwatch_core::format::Embed;

use crate::error::{DeliveryError, RegistrationError};
use crate::notifier::{Destination, NotificationChannel};

/// Slash command declared at startup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    /// 1 = CHAT_INPUT.
    #[serde(rename = "type")]
    pub kind: u8,
}

pub const STOCK_COMMAND: &str = "stock";

pub fn stock_command() -> CommandDefinition {
    CommandDefinition {
        name: STOCK_COMMAND.into(),
        description: "Show current Grow a Garden stock and weather status".into(),
        kind: 1,
    }
}

/// Final content of a deferred interaction reply.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum InteractionReply {
    Embeds { embeds: Vec<Embed> },
    Content { content: String },
}

/// Completes deferred interactions.
#[async_trait]
pub trait InteractionFollowup: Send + Sync {
    async fn edit_original(
        &self,
        interaction_token: &str,
        reply: &InteractionReply,
    ) -> Result<(), DeliveryError>;
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub api_base: String,
    pub token: String,
    pub application_id: String,
    pub guild_id: String,
    pub channel_id: String,
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Serialize)]
struct MessageBody<'a> {
    embeds: &'a [Embed],
}

#[derive(Clone)]
pub struct DiscordClient {
    http: Client,
    config: DiscordConfig,
}

impl DiscordClient {
    pub fn new(http: Client, mut config: DiscordConfig) -> Self {
        config.api_base = config.api_base.trim_end_matches('/').to_owned();
        Self { http, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base, path)
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.config.token)
    }

    /// Declare the slash commands for the configured guild.
    pub async fn register_commands(
        &self,
        commands: &[CommandDefinition],
    ) -> Result<(), RegistrationError> {
        let url = self.url(&format!(
            "/applications/{}/guilds/{}/commands",
            self.config.application_id, self.config.guild_id
        ));
        let resp = self
            .http
            .put(url)
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(commands)
            .send()
            .await
            .map_err(|e| RegistrationError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let (code, body) = status_and_body(resp).await;
            return Err(RegistrationError::Rejected { code, body });
        }
        Ok(())
    }
}

async fn status_and_body(resp: Response) -> (u16, String) {
    let code = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    (code, body)
}

#[async_trait]
impl NotificationChannel for DiscordClient {
    async fn resolve(&self) -> Result<Destination, DeliveryError> {
        let channel_id = &self.config.channel_id;
        let unavailable = |reason: String| DeliveryError::DestinationUnavailable {
            channel_id: channel_id.clone(),
            reason,
        };

        let resp = self
            .http
            .get(self.url(&format!("/channels/{channel_id}")))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let (code, body) = status_and_body(resp).await;
            return Err(unavailable(format!("HTTP {code}: {body}")));
        }

        let info: ChannelInfo = resp
            .json()
            .await
            .map_err(|e| unavailable(format!("bad channel payload: {e}")))?;
        Ok(Destination {
            id: info.id,
            name: info.name,
        })
    }

    async fn deliver(
        &self,
        destination: &Destination,
        embeds: &[Embed],
    ) -> Result<(), DeliveryError> {
        let resp = self
            .http
            .post(self.url(&format!("/channels/{}/messages", destination.id)))
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&MessageBody { embeds })
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let (code, body) = status_and_body(resp).await;
            return Err(DeliveryError::Rejected { code, body });
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionFollowup for DiscordClient {
    async fn edit_original(
        &self,
        interaction_token: &str,
        reply: &InteractionReply,
    ) -> Result<(), DeliveryError> {
        // Webhook endpoints authenticate through the interaction token.
        let url = self.url(&format!(
            "/webhooks/{}/{interaction_token}/messages/@original",
            self.config.application_id
        ));
        let resp = self
            .http
            .patch(url)
            .json(reply)
            .send()
            .await
            .map_err(|e| DeliveryError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let (code, body) = status_and_body(resp).await;
            return Err(DeliveryError::Rejected { code, body });
        }
        Ok(())
    }
}
