//! Change detection between consecutive snapshots.

use std::fmt::Debug;

use crate::model::{InventorySnapshot, Resource, WeatherSnapshot};

/// A canonical, comparable view of one resource.
///
/// Equality is the derived structural equality of the snapshot type, so field
/// and item order matter and upstream ordering must already be canonical.
pub trait Snapshot: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Resource this snapshot describes.
    const RESOURCE: Resource;
}

impl Snapshot for InventorySnapshot {
    const RESOURCE: Resource = Resource::Inventory;
}

impl Snapshot for WeatherSnapshot {
    const RESOURCE: Resource = Resource::Weather;
}

/// True when `current` differs from `previous`.
///
/// An absent previous state never equals a present snapshot.
pub fn changed<S: Snapshot>(previous: Option<&S>, current: &S) -> bool {
    match previous {
        Some(previous) => previous != current,
        None => true,
    }
}
