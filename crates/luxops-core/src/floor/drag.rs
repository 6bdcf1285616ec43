//! Pointer-driven drag placement.
//!
//! Each input pointer is either idle or dragging one item. A pointer-down on
//! an item captures the pointer and selects the item; every move while
//! captured writes one position update; pointer-up releases. Drag state is
//! keyed by pointer id so two fingers can never fight over the same item.

use std::collections::HashMap;

use tracing::debug;

use super::transform::CanvasTransform;
use super::{FloorPlan, PositionUpdate};
use crate::Position;

/// Identifier of an input pointer (mouse, pen, or one touch contact).
pub type PointerId = i64;

/// Concurrent drags allowed unless configured otherwise.
pub const DEFAULT_POINTER_CAPACITY: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragRefusal {
    /// No item with that id in the plan
    UnknownItem,
    /// This pointer already holds a drag
    PointerBusy,
    /// Another pointer is dragging the same item
    ItemBusy,
    /// All concurrent drag slots are taken
    CapacityReached,
}

impl std::fmt::Display for DragRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            DragRefusal::UnknownItem => "item not found",
            DragRefusal::PointerBusy => "pointer is already dragging an item",
            DragRefusal::ItemBusy => "item is already being dragged",
            DragRefusal::CapacityReached => "no free drag slot",
        };
        f.write_str(msg)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Moved { item_id: String, position: Position },
    /// The dragged item no longer exists (collection was replaced). No-op.
    Stale { item_id: String },
    /// Pointer holds no drag. No-op.
    NotDragging,
    /// The point could not be mapped onto a finite canvas position. No-op.
    BadTransform,
}

#[derive(Debug, Clone)]
pub struct DragController {
    sessions: HashMap<PointerId, String>,
    capacity: usize,
    selected: Option<String>,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new()
    }
}

impl DragController {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_POINTER_CAPACITY)
    }

    /// Allow up to `capacity` simultaneous drags (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            capacity: capacity.max(1),
            selected: None,
        }
    }

    pub fn pointer_down(
        &mut self,
        plan: &FloorPlan,
        pointer: PointerId,
        item_id: &str,
    ) -> Result<(), DragRefusal> {
        if !plan.contains(item_id) {
            return Err(DragRefusal::UnknownItem);
        }
        if self.sessions.contains_key(&pointer) {
            return Err(DragRefusal::PointerBusy);
        }
        if self.is_dragging_item(item_id) {
            return Err(DragRefusal::ItemBusy);
        }
        if self.sessions.len() >= self.capacity {
            return Err(DragRefusal::CapacityReached);
        }
        debug!(pointer, item_id, "drag start");
        self.sessions.insert(pointer, item_id.to_string());
        self.selected = Some(item_id.to_string());
        Ok(())
    }

    /// Map `screen` through `transform` and move the pointer's item there.
    pub fn pointer_move(
        &mut self,
        plan: &mut FloorPlan,
        pointer: PointerId,
        screen: Position,
        transform: &CanvasTransform,
    ) -> MoveOutcome {
        let Some(item_id) = self.sessions.get(&pointer) else {
            return MoveOutcome::NotDragging;
        };
        let Some(canvas) = transform.to_canvas(screen) else {
            return MoveOutcome::BadTransform;
        };
        match plan.update_position(item_id, canvas.x, canvas.y) {
            PositionUpdate::Moved => MoveOutcome::Moved {
                item_id: item_id.clone(),
                position: canvas,
            },
            PositionUpdate::NotFound => MoveOutcome::Stale {
                item_id: item_id.clone(),
            },
        }
    }

    /// End the pointer's drag, returning the released item id.
    pub fn pointer_up(&mut self, pointer: PointerId) -> Option<String> {
        let released = self.sessions.remove(&pointer);
        if let Some(id) = &released {
            debug!(pointer, item_id = %id, "drag end");
        }
        released
    }

    pub fn dragging(&self, pointer: PointerId) -> Option<&str> {
        self.sessions.get(&pointer).map(String::as_str)
    }

    pub fn is_dragging_item(&self, item_id: &str) -> bool {
        self.sessions.values().any(|id| id == item_id)
    }

    pub fn active_drags(&self) -> usize {
        self.sessions.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, item_id: Option<String>) {
        self.selected = item_id;
    }
}
