use std::time::Duration;

use stockwatch_core::schedule::{Cadence, ScheduleError};

use crate::discord::DiscordConfig;
use crate::error::ConfigError;
use crate::verify::InteractionVerifier;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub port: u16,
    pub feed_base_url: String,
    pub discord: DiscordConfig,
    /// Hex Ed25519 key; the interactions endpoint is only served when set.
    pub public_key: Option<String>,

    pub stock_period_seconds: u64,
    pub stock_offset_seconds: u64,
    pub weather_period_seconds: u64,

    /// Skip the startup baseline so the first cycle of each loop announces.
    pub announce_on_start: bool,
}

impl DaemonConfig {
    /// Inventory cadence: wall-clock boundary plus offset.
    pub fn stock_cadence(&self) -> Result<Cadence, ScheduleError> {
        Cadence::aligned(
            Duration::from_secs(self.stock_period_seconds),
            Duration::from_secs(self.stock_offset_seconds),
        )
    }

    /// Weather cadence: fixed interval from loop start.
    pub fn weather_cadence(&self) -> Result<Cadence, ScheduleError> {
        Cadence::interval(Duration::from_secs(self.weather_period_seconds))
    }

    pub fn verifier(&self) -> Result<Option<InteractionVerifier>, ConfigError> {
        self.public_key
            .as_deref()
            .map(InteractionVerifier::from_hex)
            .transpose()
    }

    /// Reject settings that would only fail later, at first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stock_cadence()?;
        self.weather_cadence()?;
        self.verifier()?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> DaemonConfig {
    DaemonConfig {
        port: 0,
        feed_base_url: "http://127.0.0.1:9/api".into(),
        discord: DiscordConfig {
            api_base: "http://127.0.0.1:9/api/v10".into(),
            token: "token".into(),
            application_id: "app".into(),
            guild_id: "guild".into(),
            channel_id: "chan".into(),
        },
        public_key: None,
        stock_period_seconds: 300,
        stock_offset_seconds: 30,
        weather_period_seconds: 30,
        announce_on_start: false,
    }
}
