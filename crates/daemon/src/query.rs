use std::sync::Arc;

use chrono::Utc;
use stockwatch_core::format::{status_report, Embed, QUERY_FAILURE_MESSAGE};
use thiserror::Error;

use crate::error::FetchError;
use crate::feed::FeedSource;

/// The on-demand report could not be built. Displays as the user-facing
/// message; the underlying fetch error is kept as the source.
#[derive(Debug, Error)]
#[error("{}", QUERY_FAILURE_MESSAGE)]
pub struct QueryFailure {
    #[source]
    pub cause: FetchError,
}

/// Answers on-demand status requests from fresh fetches. Never reads or
/// writes the snapshot store.
#[derive(Clone)]
pub struct QueryResponder {
    source: Arc<dyn FeedSource>,
}

impl QueryResponder {
    pub fn new(source: Arc<dyn FeedSource>) -> Self {
        Self { source }
    }

    /// Stock and weather embeds, or a single failure. Never a partial report.
    pub async fn respond(&self) -> Result<Vec<Embed>, QueryFailure> {
        let (inventory, weather) = tokio::try_join!(
            self.source.fetch_inventory(),
            self.source.fetch_weather()
        )
        .map_err(|cause| {
            tracing::warn!(error = %cause, "status query failed");
            QueryFailure { cause }
        })?;

        Ok(status_report(&inventory, &weather, Utc::now()))
    }
}
