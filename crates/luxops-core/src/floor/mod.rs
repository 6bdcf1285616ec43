//! The floor-plan spatial model: item store, canvas transform, drag protocol,
//! clearance checks and the staffing heatmap.

pub mod compliance;
pub mod drag;
pub mod heatmap;
pub mod transform;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{FloorItem, Position};

pub const CANVAS_WIDTH: f64 = 800.0;
pub const CANVAS_HEIGHT: f64 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionUpdate {
    Moved,
    /// No item with that id. Nothing changed.
    NotFound,
}

/// Placed items in insertion order. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FloorPlan {
    items: Vec<FloorItem>,
}

impl FloorPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<FloorItem>) -> Self {
        let mut plan = Self::new();
        plan.insert_all(items);
        plan
    }

    /// Replace the whole collection. Later duplicates of an id are dropped.
    pub fn insert_all(&mut self, items: Vec<FloorItem>) {
        let mut seen = HashSet::with_capacity(items.len());
        self.items = items
            .into_iter()
            .filter(|item| {
                let fresh = seen.insert(item.id.clone());
                if !fresh {
                    warn!(id = %item.id, "dropping floor item with duplicate id");
                }
                fresh
            })
            .collect();
    }

    pub fn insert(&mut self, item: FloorItem) -> Result<(), String> {
        if self.contains(&item.id) {
            return Err(format!("Floor item '{}' already exists", item.id));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn update_position(&mut self, id: &str, x: f64, y: f64) -> PositionUpdate {
        match self.items.iter_mut().find(|i| i.id == id) {
            Some(item) => {
                item.position = Position::new(x, y);
                PositionUpdate::Moved
            }
            None => PositionUpdate::NotFound,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<FloorItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(idx))
    }

    pub fn get(&self, id: &str) -> Option<&FloorItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn items(&self) -> &[FloorItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<FloorItem> {
        self.items
    }
}
