//! Egress clearance between floor items.
//!
//! Plain all-pairs scan. Layouts hold tens of items, occasionally a few
//! hundred, so there is no spatial index.

use serde::Serialize;

use crate::FloorItem;

/// Minimum centre-to-centre distance, in canvas units.
pub const MIN_SEPARATION: f64 = 80.0;

pub const VIOLATION_MESSAGE: &str =
    "Compliance Violation: Insufficient egress clearance detected. Relocate immediately.";
pub const BREACH_NOTICE: &str = "Compliance Breach: Egress paths obstructed.";
pub const CLEAR_NOTICE: &str = "Compliance Verification: All zones clear.";

pub fn distance(a: &FloorItem, b: &FloorItem) -> f64 {
    a.position.distance_to(&b.position)
}

fn too_close(a: &FloorItem, b: &FloorItem) -> bool {
    a.id != b.id && distance(a, b) < MIN_SEPARATION
}

/// True iff some other item sits closer than [`MIN_SEPARATION`].
pub fn is_violating(item: &FloorItem, all_items: &[FloorItem]) -> bool {
    all_items.iter().any(|other| too_close(item, other))
}

pub fn has_any_violation(all_items: &[FloorItem]) -> bool {
    all_items.iter().any(|item| is_violating(item, all_items))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub first: String,
    pub second: String,
    pub distance: f64,
}

/// Every violating pair once, ordered by position in `all_items`.
pub fn violations(all_items: &[FloorItem]) -> Vec<Violation> {
    let mut out = Vec::new();
    for (i, a) in all_items.iter().enumerate() {
        for b in &all_items[i + 1..] {
            if too_close(a, b) {
                out.push(Violation {
                    first: a.id.clone(),
                    second: b.id.clone(),
                    distance: distance(a, b),
                });
            }
        }
    }
    out
}

pub fn violating_ids(all_items: &[FloorItem]) -> Vec<String> {
    all_items
        .iter()
        .filter(|item| is_violating(item, all_items))
        .map(|item| item.id.clone())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub item_count: usize,
    pub clear: bool,
    pub violating_ids: Vec<String>,
    pub violations: Vec<Violation>,
}

impl ComplianceReport {
    pub fn evaluate(all_items: &[FloorItem]) -> Self {
        let violations = violations(all_items);
        Self {
            item_count: all_items.len(),
            clear: violations.is_empty(),
            violating_ids: violating_ids(all_items),
            violations,
        }
    }

    /// Headline the dashboard posts after a check.
    pub fn summary(&self) -> &'static str {
        if self.clear {
            CLEAR_NOTICE
        } else {
            BREACH_NOTICE
        }
    }
}
