use stockwatch_core::model::Resource;
use stockwatch_core::schedule::ScheduleError;
use thiserror::Error;

/// Failure to obtain a feed document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {resource}: {reason}")]
    Network { resource: Resource, reason: String },
    #[error("{resource} feed answered HTTP {code}")]
    Status { resource: Resource, code: u16 },
    #[error("malformed {resource} body: {reason}")]
    Parse { resource: Resource, reason: String },
}

impl FetchError {
    pub fn resource(&self) -> Resource {
        match self {
            Self::Network { resource, .. }
            | Self::Status { resource, .. }
            | Self::Parse { resource, .. } => *resource,
        }
    }
}

/// Failure to hand a message to the output channel.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("destination {channel_id} unavailable: {reason}")]
    DestinationUnavailable { channel_id: String, reason: String },
    #[error("message rejected with HTTP {code}: {body}")]
    Rejected { code: u16, body: String },
    #[error("network error delivering message: {0}")]
    Network(String),
}

/// Startup command registration failed.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("command registration rejected with HTTP {code}: {body}")]
    Rejected { code: u16, body: String },
    #[error("network error registering commands: {0}")]
    Network(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid schedule: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("invalid public key: {0}")]
    PublicKey(String),
}

/// Anything that ends a scheduled cycle early. Logged, never fatal.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}
