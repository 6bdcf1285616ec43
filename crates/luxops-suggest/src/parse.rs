//! Turn raw model output into a usable [`Scenario`].
//!
//! Records are checked one at a time so one bad item does not sink the
//! whole layout: unknown furniture types and unusable coordinates are
//! dropped, off-canvas coordinates are clamped, and missing or duplicate
//! ids are replaced.

use std::collections::HashSet;

use serde_json::{Map, Value};
use tracing::warn;

use luxops_core::floor::transform::clamp_to_canvas;
use luxops_core::{next_prefixed_id, FloorItem, FurnitureKind, Position, Scenario, Task, TaskStatus};

pub fn parse_scenario(raw: &str) -> Result<Scenario, String> {
    let json_str = extract_json_object(raw).ok_or("no JSON object in response")?;
    let root: Value = serde_json::from_str(json_str).map_err(|e| format!("invalid JSON: {e}"))?;
    let root = root.as_object().ok_or("response is not a JSON object")?;

    let tasks = records(root, &["tasks"])
        .iter()
        .enumerate()
        .filter_map(|(i, v)| parse_task(i, v))
        .collect::<Vec<_>>();
    let tasks = with_unique_ids(tasks, "task", |t| &mut t.id);

    let floor_items: Vec<FloorItem> = records(root, &["floorItems", "floor_items"])
        .iter()
        .enumerate()
        .filter_map(|(i, v)| parse_floor_item(i, v))
        .collect();
    let floor_items = with_unique_ids(floor_items, "gen", |f| &mut f.id);

    if floor_items.is_empty() {
        return Err("no usable floor items".to_string());
    }
    Ok(Scenario { tasks, floor_items })
}

/// Extract the outermost JSON object, skipping prose or code fences around it.
fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

fn records<'a>(root: &'a Map<String, Value>, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .find_map(|k| root.get(*k).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn finite_field(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    obj.get(key)?.as_f64().filter(|v| v.is_finite())
}

fn parse_status(s: Option<String>) -> TaskStatus {
    match s.as_deref().map(str::to_ascii_uppercase).as_deref() {
        Some("COMPLETED") => TaskStatus::Completed,
        Some("LATE") => TaskStatus::Late,
        _ => TaskStatus::Pending,
    }
}

fn parse_task(index: usize, value: &Value) -> Option<Task> {
    let Some(obj) = value.as_object() else {
        warn!(index, "skipping task that is not an object");
        return None;
    };
    let Some(title) = str_field(obj, "title") else {
        warn!(index, "skipping task without a title");
        return None;
    };
    Some(Task {
        id: str_field(obj, "id").unwrap_or_default(),
        time: str_field(obj, "time").unwrap_or_default(),
        title,
        role: str_field(obj, "role").unwrap_or_default(),
        status: parse_status(str_field(obj, "status")),
    })
}

fn parse_floor_item(index: usize, value: &Value) -> Option<FloorItem> {
    let Some(obj) = value.as_object() else {
        warn!(index, "skipping floor item that is not an object");
        return None;
    };
    let raw_kind = str_field(obj, "type").unwrap_or_default();
    let Some(kind) = FurnitureKind::from_wire(&raw_kind.to_ascii_uppercase()) else {
        warn!(index, kind = %raw_kind, "skipping floor item with unknown type");
        return None;
    };
    let (Some(x), Some(y)) = (finite_field(obj, "x"), finite_field(obj, "y")) else {
        warn!(index, "skipping floor item without usable coordinates");
        return None;
    };
    let position = clamp_to_canvas(Position::new(x, y));
    if position != Position::new(x, y) {
        warn!(index, x, y, "clamped off-canvas floor item");
    }

    let capacity = finite_field(obj, "guests")
        .filter(|g| *g >= 0.0)
        .map(|g| g.round().min(u32::MAX as f64) as u32);

    Some(FloorItem {
        id: str_field(obj, "id").unwrap_or_default(),
        kind,
        position,
        rotation: finite_field(obj, "rotation").unwrap_or(0.0),
        label: str_field(obj, "label"),
        capacity,
        assigned_staff: str_field(obj, "assignedStaff"),
    })
}

/// Keep first use of each id; blank or repeated ids get "prefix-N".
fn with_unique_ids<T>(mut records: Vec<T>, prefix: &str, id: impl Fn(&mut T) -> &mut String) -> Vec<T> {
    let mut taken: HashSet<String> = HashSet::new();
    let mut needs_new = Vec::new();
    for (i, rec) in records.iter_mut().enumerate() {
        let current = id(rec);
        if current.is_empty() || !taken.insert(current.clone()) {
            needs_new.push(i);
        }
    }
    for i in needs_new {
        let fresh = next_prefixed_id(prefix, taken.iter().map(String::as_str));
        taken.insert(fresh.clone());
        *id(&mut records[i]) = fresh;
    }
    records
}
