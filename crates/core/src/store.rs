//! Last-known-state store.
//!
//! The store is a plain owned value. Each scheduling loop takes its own
//! [`Slot`] out of it with [`SnapshotStore::into_parts`], so a slot has exactly
//! one writer and no lock is needed.

use crate::change::{changed, Snapshot};
use crate::model::{InventorySnapshot, WeatherSnapshot};

/// Last-known snapshot of a single resource.
#[derive(Debug, Clone)]
pub struct Slot<S> {
    current: Option<S>,
    commits: u64,
}

impl<S> Default for Slot<S> {
    fn default() -> Self {
        Self {
            current: None,
            commits: 0,
        }
    }
}

impl<S: Snapshot> Slot<S> {
    /// Empty slot (nothing observed yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-seeded with a snapshot.
    pub fn with_snapshot(snapshot: S) -> Self {
        Self {
            current: Some(snapshot),
            commits: 0,
        }
    }

    /// Last committed snapshot, if any.
    pub fn get(&self) -> Option<&S> {
        self.current.as_ref()
    }

    /// True when `candidate` differs from what is stored.
    pub fn differs(&self, candidate: &S) -> bool {
        changed(self.current.as_ref(), candidate)
    }

    /// Replace the stored snapshot.
    pub fn commit(&mut self, snapshot: S) {
        self.current = Some(snapshot);
        self.commits += 1;
    }

    /// Number of commits since creation.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    /// True until the first commit.
    pub fn is_empty(&self) -> bool {
        self.current.is_none()
    }
}

/// Process-lifetime last-known state for both resources.
#[derive(Debug, Clone, Default)]
pub struct SnapshotStore {
    /// Inventory loop state.
    pub inventory: Slot<InventorySnapshot>,
    /// Weather loop state.
    pub weather: Slot<WeatherSnapshot>,
}

impl SnapshotStore {
    /// Empty store, as created at startup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Split into the per-loop slots.
    pub fn into_parts(self) -> (Slot<InventorySnapshot>, Slot<WeatherSnapshot>) {
        (self.inventory, self.weather)
    }
}
