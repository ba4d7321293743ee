//! Integration tests for the core crate.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use stockwatch_core::change::changed;
use stockwatch_core::model::{
    Category, InventoryDocument, InventorySnapshot, Resource, StockItem, WeatherDocument,
    WeatherSnapshot,
};
use stockwatch_core::schedule::{Cadence, LoopMachine};
use stockwatch_core::store::SnapshotStore;
use stockwatch_core::weather::normalize_document;

#[test]
fn test_resource_serde() {
    let serialized = serde_json::to_string(&Resource::Inventory).unwrap();
    assert_eq!(serialized, r#""inventory""#);
    let deserialized: Resource = serde_json::from_str(r#""weather""#).unwrap();
    assert_eq!(deserialized, Resource::Weather);
    assert_eq!(Resource::Inventory.path(), "stock");
}

#[test]
fn test_inventory_document_to_snapshot() {
    let body = r#"{
        "seedsStock": [{"name": "Carrot", "value": 5}, {"name": "Tomato", "value": 1200}],
        "eggStock": [],
        "gearStock": null,
        "cosmeticsStock": [{"name": "Bench", "value": 1}],
        "lastSeen": {"seeds": 123}
    }"#;
    let doc: InventoryDocument = serde_json::from_str(body).unwrap();
    let snapshot = InventorySnapshot::from(doc);

    assert_eq!(
        snapshot.items(Category::Seeds),
        Some(&[StockItem::new("Carrot", 5), StockItem::new("Tomato", 1200)][..])
    );
    assert_eq!(snapshot.items(Category::Eggs), Some(&[][..]));
    assert_eq!(snapshot.items(Category::Gear), None);
}

#[test]
fn test_inventory_document_rejects_negative_quantity() {
    let body = r#"{"seedsStock": [{"name": "Carrot", "value": -1}]}"#;
    assert!(serde_json::from_str::<InventoryDocument>(body).is_err());
}

#[test]
fn test_change_triggers_on_quantity_bump() {
    let mut store = SnapshotStore::new();
    store.inventory.commit(
        InventorySnapshot::default()
            .with_category(Category::Seeds, vec![StockItem::new("Carrot", 5)]),
    );
    let next = InventorySnapshot::default()
        .with_category(Category::Seeds, vec![StockItem::new("Carrot", 6)]);

    assert!(changed(store.inventory.get(), &next));
    assert!(store.inventory.differs(&next));
}

#[test]
fn test_weather_documents_with_same_active_set_are_equal() {
    let flags: WeatherDocument =
        serde_json::from_str(r#"{"weather": {"Sunny": true, "Rainy": false}}"#).unwrap();
    let list: WeatherDocument = serde_json::from_str(r#"{"weather": ["Sunny"]}"#).unwrap();
    let scalar: WeatherDocument = serde_json::from_str(r#"{"weather": "Sunny"}"#).unwrap();

    let a = normalize_document(&flags);
    assert_eq!(a, WeatherSnapshot(vec!["Sunny".into()]));
    assert_eq!(a, normalize_document(&list));
    assert_eq!(a, normalize_document(&scalar));
    assert!(!changed(Some(&a), &normalize_document(&list)));
}

#[test]
fn test_flag_map_keeps_document_order() {
    let doc: WeatherDocument =
        serde_json::from_str(r#"{"weather": {"Windy": true, "Foggy": true, "Cloudy": true}}"#)
            .unwrap();
    assert_eq!(
        normalize_document(&doc).conditions(),
        &["Windy".to_string(), "Foggy".to_string(), "Cloudy".to_string()]
    );
}

#[test]
fn test_stock_loop_schedule_over_a_day() {
    let cadence = Cadence::aligned(Duration::from_secs(300), Duration::from_secs(30)).unwrap();
    let start = Utc.with_ymd_and_hms(2025, 6, 14, 12, 3, 10).unwrap();
    let mut machine = LoopMachine::new(Resource::Inventory, cadence, start.timestamp_millis());

    let mut now = start.timestamp_millis();
    let mut fires = Vec::new();
    for _ in 0..3 {
        let delay = machine.arm(now).unwrap();
        now += delay.as_millis() as i64;
        machine.fire(now).unwrap();
        fires.push(now);
        // Cycle takes a few seconds.
        now += 4_000;
        machine.finish().unwrap();
    }

    let expect = |h, m, s| Utc.with_ymd_and_hms(2025, 6, 14, h, m, s).unwrap().timestamp_millis();
    assert_eq!(fires, vec![expect(12, 5, 30), expect(12, 10, 30), expect(12, 15, 30)]);
    assert_eq!(machine.cycles(), 3);
}
