//! In-memory fakes for the feed, the output channel, interaction replies and
//! the loop clock.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use stockwatch_core::format::Embed;
use stockwatch_core::model::{Category, InventorySnapshot, Resource, StockItem, WeatherSnapshot};
use stockwatch_daemon::discord::{InteractionFollowup, InteractionReply};
use stockwatch_daemon::error::{DeliveryError, FetchError};
use stockwatch_daemon::feed::FeedSource;
use stockwatch_daemon::notifier::{Destination, NotificationChannel};
use stockwatch_daemon::scheduler::Clock;
use tokio::time::Instant;

pub fn carrots(qty: u64) -> InventorySnapshot {
    InventorySnapshot::default().with_category(Category::Seeds, vec![StockItem::new("Carrot", qty)])
}

pub fn weather(names: &[&str]) -> WeatherSnapshot {
    WeatherSnapshot(names.iter().map(|s| s.to_string()).collect())
}

/// Feed returning whatever was last set; `None` answers HTTP 503.
#[derive(Default)]
pub struct FakeFeed {
    inventory: Mutex<Option<InventorySnapshot>>,
    weather: Mutex<Option<WeatherSnapshot>>,
    pub inventory_calls: AtomicUsize,
    pub weather_calls: AtomicUsize,
}

impl FakeFeed {
    pub fn new(inventory: Option<InventorySnapshot>, weather: Option<WeatherSnapshot>) -> Self {
        Self {
            inventory: Mutex::new(inventory),
            weather: Mutex::new(weather),
            ..Default::default()
        }
    }

    pub fn set_inventory(&self, snapshot: Option<InventorySnapshot>) {
        *self.inventory.lock().unwrap() = snapshot;
    }

    pub fn set_weather(&self, snapshot: Option<WeatherSnapshot>) {
        *self.weather.lock().unwrap() = snapshot;
    }
}

fn unavailable(resource: Resource) -> FetchError {
    FetchError::Status {
        resource,
        code: 503,
    }
}

#[async_trait]
impl FeedSource for FakeFeed {
    async fn fetch_inventory(&self) -> Result<InventorySnapshot, FetchError> {
        self.inventory_calls.fetch_add(1, Ordering::SeqCst);
        self.inventory
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| unavailable(Resource::Inventory))
    }

    async fn fetch_weather(&self) -> Result<WeatherSnapshot, FetchError> {
        self.weather_calls.fetch_add(1, Ordering::SeqCst);
        self.weather
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| unavailable(Resource::Weather))
    }
}

/// Channel recording every delivered message.
#[derive(Default)]
pub struct FakeChannel {
    pub fail_resolve: AtomicBool,
    pub fail_deliver: AtomicBool,
    pub delivered: Mutex<Vec<Vec<Embed>>>,
}

impl FakeChannel {
    pub fn deliveries(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<Vec<Embed>> {
        self.delivered.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl NotificationChannel for FakeChannel {
    async fn resolve(&self) -> Result<Destination, DeliveryError> {
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(DeliveryError::DestinationUnavailable {
                channel_id: "chan".into(),
                reason: "unknown channel".into(),
            });
        }
        Ok(Destination {
            id: "chan".into(),
            name: Some("stock".into()),
        })
    }

    async fn deliver(
        &self,
        _destination: &Destination,
        embeds: &[Embed],
    ) -> Result<(), DeliveryError> {
        if self.fail_deliver.load(Ordering::SeqCst) {
            return Err(DeliveryError::Rejected {
                code: 500,
                body: "boom".into(),
            });
        }
        self.delivered.lock().unwrap().push(embeds.to_vec());
        Ok(())
    }
}

/// Records completed interaction replies.
#[derive(Default)]
pub struct FakeFollowup {
    pub replies: Mutex<Vec<(String, InteractionReply)>>,
}

#[async_trait]
impl InteractionFollowup for FakeFollowup {
    async fn edit_original(
        &self,
        interaction_token: &str,
        reply: &InteractionReply,
    ) -> Result<(), DeliveryError> {
        self.replies
            .lock()
            .unwrap()
            .push((interaction_token.to_owned(), reply.clone()));
        Ok(())
    }
}

/// Feed whose requests never complete.
#[derive(Default)]
pub struct HangingFeed {
    pub calls: AtomicUsize,
}

#[async_trait]
impl FeedSource for HangingFeed {
    async fn fetch_inventory(&self) -> Result<InventorySnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn fetch_weather(&self) -> Result<WeatherSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::future::pending().await
    }
}

/// Wall clock that advances with tokio's (pausable) clock from a fixed
/// origin. `step` moves it without touching pending timers.
pub struct TestClock {
    origin_ms: i64,
    started: Instant,
    skew_ms: AtomicI64,
}

impl TestClock {
    pub fn starting_at(origin_ms: i64) -> Self {
        Self {
            origin_ms,
            started: Instant::now(),
            skew_ms: AtomicI64::new(0),
        }
    }

    pub fn step(&self, delta_ms: i64) {
        self.skew_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for TestClock {
    fn now_ms(&self) -> i64 {
        self.origin_ms
            + self.started.elapsed().as_millis() as i64
            + self.skew_ms.load(Ordering::SeqCst)
    }
}
