use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use stockwatch_core::format::{Announce, Embed};
use stockwatch_core::store::Slot;

use crate::error::DeliveryError;

/// A resolved output destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub id: String,
    pub name: Option<String>,
}

/// The single configured output channel.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Look up the destination. Called once per cycle.
    async fn resolve(&self) -> Result<Destination, DeliveryError>;

    /// Send one message made of `embeds`.
    async fn deliver(&self, destination: &Destination, embeds: &[Embed])
        -> Result<(), DeliveryError>;
}

/// Formats changed snapshots, delivers them, then commits them.
#[derive(Clone)]
pub struct Notifier {
    channel: Arc<dyn NotificationChannel>,
}

impl Notifier {
    pub fn new(channel: Arc<dyn NotificationChannel>) -> Self {
        Self { channel }
    }

    pub async fn resolve(&self) -> Result<Destination, DeliveryError> {
        self.channel.resolve().await
    }

    /// Deliver `snapshot` and commit it into `slot`.
    ///
    /// The slot is only touched once delivery is confirmed; on error it still
    /// holds the previous snapshot so the next cycle sees the change again.
    pub async fn notify<S: Announce>(
        &self,
        destination: &Destination,
        slot: &mut Slot<S>,
        snapshot: S,
    ) -> Result<(), DeliveryError> {
        let embed = snapshot.announcement(Utc::now());
        self.channel
            .deliver(destination, std::slice::from_ref(&embed))
            .await?;
        slot.commit(snapshot);
        tracing::info!(
            resource = %S::RESOURCE,
            channel = %destination.id,
            "change announced"
        );
        Ok(())
    }
}
