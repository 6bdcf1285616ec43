//! Staffing heatmap: one soft disc per item, coloured by whether someone is
//! assigned to it. A projection of the current positions, nothing stored.

use serde::Serialize;

use crate::{FloorItem, Position};

pub const HEAT_RADIUS: f64 = 140.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Coverage {
    Assigned,
    Unassigned,
}

impl Coverage {
    pub fn of(item: &FloorItem) -> Self {
        if item.has_staff() {
            Coverage::Assigned
        } else {
            Coverage::Unassigned
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Coverage::Assigned => "#ef4444",
            Coverage::Unassigned => "#3b82f6",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeatSpot {
    pub item_id: String,
    pub center: Position,
    pub radius: f64,
    pub coverage: Coverage,
    pub color: &'static str,
}

pub fn heatmap(items: &[FloorItem]) -> Vec<HeatSpot> {
    items
        .iter()
        .map(|item| {
            let coverage = Coverage::of(item);
            HeatSpot {
                item_id: item.id.clone(),
                center: item.position,
                radius: HEAT_RADIUS,
                coverage,
                color: coverage.color(),
            }
        })
        .collect()
}

/// How many spots of the given coverage overlap `point`.
pub fn density_at(spots: &[HeatSpot], point: Position, coverage: Coverage) -> usize {
    spots
        .iter()
        .filter(|s| s.coverage == coverage && s.center.distance_to(&point) <= s.radius)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{demo, FurnitureKind};

    #[test]
    fn one_spot_per_item_at_its_position() {
        let items = demo::floor_items();
        let spots = heatmap(&items);
        assert_eq!(spots.len(), items.len());
        for (spot, item) in spots.iter().zip(&items) {
            assert_eq!(spot.item_id, item.id);
            assert_eq!(spot.center, item.position);
            assert_eq!(spot.radius, HEAT_RADIUS);
        }
    }

    #[test]
    fn colour_follows_staffing() {
        let spots = heatmap(&demo::floor_items());
        let dance = spots.iter().find(|s| s.item_id == "4").unwrap();
        assert_eq!(dance.coverage, Coverage::Unassigned);
        assert_eq!(dance.color, "#3b82f6");
        let table = spots.iter().find(|s| s.item_id == "1").unwrap();
        assert_eq!(table.coverage, Coverage::Assigned);
        assert_eq!(table.color, "#ef4444");
    }

    #[test]
    fn reflects_moves() {
        let mut items = vec![FloorItem::new("t", FurnitureKind::RoundTable, 10.0, 10.0)];
        assert_eq!(heatmap(&items)[0].center, Position::new(10.0, 10.0));
        items[0].position = Position::new(90.0, 45.0);
        assert_eq!(heatmap(&items)[0].center, Position::new(90.0, 45.0));
    }

    #[test]
    fn density_counts_overlaps() {
        let spots = heatmap(&demo::floor_items());
        // between Table 1 and Table 2, both staffed
        let p = Position::new(300.0, 200.0);
        assert_eq!(density_at(&spots, p, Coverage::Assigned), 2);
        assert_eq!(density_at(&spots, p, Coverage::Unassigned), 0);
        assert_eq!(
            density_at(&spots, Position::new(600.0, 300.0), Coverage::Unassigned),
            1
        );
    }
}
