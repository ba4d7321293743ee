//! The two polling loops.
//!
//! Each loop task owns a [`Watcher`], which owns its half of the snapshot
//! store. A cycle is resolve -> fetch -> detect -> notify; its errors are
//! logged and the loop re-arms through its [`LoopMachine`] either way.
//! The startup baseline is taken inside each loop task, so nothing here
//! blocks the caller on the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use stockwatch_core::format::Announce;
use stockwatch_core::model::{InventorySnapshot, WeatherSnapshot};
use stockwatch_core::schedule::{Cadence, LoopMachine, ScheduleError};
use stockwatch_core::store::{Slot, SnapshotStore};
use stockwatch_core::{now_ms, utc_from_ms};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::DaemonConfig;
use crate::error::{CycleError, FetchError};
use crate::feed::FeedSource;
use crate::notifier::Notifier;

/// Wall-clock source for the loops, in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// The host's system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        now_ms()
    }
}

/// A snapshot type the scheduler knows how to fetch.
#[async_trait]
pub trait Watched: Announce {
    async fn fetch(source: &dyn FeedSource) -> Result<Self, FetchError>;
}

#[async_trait]
impl Watched for InventorySnapshot {
    async fn fetch(source: &dyn FeedSource) -> Result<Self, FetchError> {
        source.fetch_inventory().await
    }
}

#[async_trait]
impl Watched for WeatherSnapshot {
    async fn fetch(source: &dyn FeedSource) -> Result<Self, FetchError> {
        source.fetch_weather().await
    }
}

/// What a completed cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Unchanged,
    Notified,
}

/// Fetch/detect/notify for one resource, over its own slot.
pub struct Watcher<S> {
    slot: Slot<S>,
    source: Arc<dyn FeedSource>,
    notifier: Notifier,
}

impl<S: Watched> Watcher<S> {
    pub fn new(slot: Slot<S>, source: Arc<dyn FeedSource>, notifier: Notifier) -> Self {
        Self {
            slot,
            source,
            notifier,
        }
    }

    pub fn slot(&self) -> &Slot<S> {
        &self.slot
    }

    /// Record the current upstream state as baseline without announcing it.
    pub async fn prime(&mut self) -> Result<(), FetchError> {
        let snapshot = S::fetch(self.source.as_ref()).await?;
        self.slot.commit(snapshot);
        info!(resource = %S::RESOURCE, "baseline recorded");
        Ok(())
    }

    pub async fn run_cycle(&mut self) -> Result<CycleOutcome, CycleError> {
        let destination = self.notifier.resolve().await?;
        let snapshot = S::fetch(self.source.as_ref()).await?;

        if !self.slot.differs(&snapshot) {
            debug!(resource = %S::RESOURCE, "no changes");
            return Ok(CycleOutcome::Unchanged);
        }

        self.notifier
            .notify(&destination, &mut self.slot, snapshot)
            .await?;
        Ok(CycleOutcome::Notified)
    }
}

/// Drive `watcher` on `cadence` for the life of the process.
///
/// Only returns if the loop state machine is misused, which the sequential
/// body below rules out.
pub async fn run_loop<S: Watched>(
    mut watcher: Watcher<S>,
    cadence: Cadence,
    clock: Arc<dyn Clock>,
) -> Result<(), ScheduleError> {
    let resource = S::RESOURCE;
    let mut machine = LoopMachine::new(resource, cadence, clock.now_ms());

    loop {
        let now = clock.now_ms();
        let delay = machine.arm(now)?;
        info!(
            resource = %resource,
            delay_secs = delay.as_secs(),
            at = %utc_from_ms(now + delay.as_millis() as i64).format("%H:%M:%S"),
            "next check scheduled"
        );
        tokio::time::sleep(delay).await;

        machine.fire(clock.now_ms())?;
        match watcher.run_cycle().await {
            Ok(outcome) => debug!(resource = %resource, ?outcome, "cycle complete"),
            Err(e) => warn!(resource = %resource, error = %e, "cycle failed; retrying next cycle"),
        }
        machine.finish()?;
    }
}

/// Take the baseline, giving up after one period so the loop always starts.
async fn prime_or_skip<S: Watched>(watcher: &mut Watcher<S>, cadence: Cadence) {
    let limit = Duration::from_millis(cadence.period_ms() as u64);
    match timeout(limit, watcher.prime()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            warn!(resource = %S::RESOURCE, error = %e, "initial fetch failed; first cycle will announce")
        }
        Err(_) => warn!(
            resource = %S::RESOURCE,
            limit_secs = limit.as_secs(),
            "initial fetch timed out; first cycle will announce"
        ),
    }
}

fn spawn_loop<S: Watched>(
    mut watcher: Watcher<S>,
    cadence: Cadence,
    prime: bool,
    clock: Arc<dyn Clock>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        if prime {
            prime_or_skip(&mut watcher, cadence).await;
        }
        if let Err(e) = run_loop(watcher, cadence, clock).await {
            error!(resource = %S::RESOURCE, error = %e, "polling loop stopped");
        }
    })
}

/// Handles of the two running loops.
pub struct Loops {
    pub inventory: JoinHandle<()>,
    pub weather: JoinHandle<()>,
}

/// Build both watchers over a fresh store and spawn their loops on the system
/// clock. Each loop takes its baseline first unless `announce_on_start` is set.
pub fn spawn_scheduler(
    config: &DaemonConfig,
    source: Arc<dyn FeedSource>,
    notifier: Notifier,
) -> Result<Loops, ScheduleError> {
    spawn_scheduler_with_clock(config, source, notifier, Arc::new(SystemClock))
}

/// [`spawn_scheduler`] on a caller-supplied clock.
pub fn spawn_scheduler_with_clock(
    config: &DaemonConfig,
    source: Arc<dyn FeedSource>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
) -> Result<Loops, ScheduleError> {
    let stock_cadence = config.stock_cadence()?;
    let weather_cadence = config.weather_cadence()?;
    let prime = !config.announce_on_start;

    let (inventory_slot, weather_slot) = SnapshotStore::new().into_parts();
    let inventory = Watcher::new(inventory_slot, Arc::clone(&source), notifier.clone());
    let weather = Watcher::new(weather_slot, source, notifier);

    Ok(Loops {
        inventory: spawn_loop(inventory, stock_cadence, prime, Arc::clone(&clock)),
        weather: spawn_loop(weather, weather_cadence, prime, clock),
    })
}
