use chrono::Utc;
use luxops_core::floor::compliance::{has_any_violation, is_violating};
use luxops_core::floor::drag::MoveOutcome;
use luxops_core::floor::transform::CanvasTransform;
use luxops_core::floor::PositionUpdate;
use luxops_core::session::{GenerationOutcome, PlannerSession};
use luxops_core::{demo, FloorItem, FurnitureKind, Position, Scenario};

#[test]
fn drag_path_leaves_item_at_last_point() {
    let now = Utc::now();
    let mut session = PlannerSession::demo();
    let others: Vec<FloorItem> = session
        .floor()
        .items()
        .iter()
        .filter(|i| i.id != "1")
        .cloned()
        .collect();
    let t = CanvasTransform::identity();

    session.pointer_down(1, "1").unwrap();
    for (x, y) in [(200.0, 200.0), (250.0, 220.0), (300.0, 250.0)] {
        let out = session.pointer_move(1, Position::new(x, y), &t);
        assert!(matches!(out, MoveOutcome::Moved { .. }));
    }
    assert_eq!(session.pointer_up(1, now).as_deref(), Some("1"));

    assert_eq!(
        session.floor().get("1").unwrap().position,
        Position::new(300.0, 250.0)
    );
    for other in &others {
        assert_eq!(session.floor().get(&other.id), Some(other));
    }
}

#[test]
fn drag_through_scaled_viewport() {
    let now = Utc::now();
    let mut session = PlannerSession::demo();
    // canvas shown at 1.5x inside a 1600x900 window
    let t = CanvasTransform::fit_viewport(0.0, 0.0, 1600.0, 900.0);
    session.pointer_down(9, "3").unwrap();
    session.pointer_move(9, t.to_screen(Position::new(120.0, 480.0)), &t);
    session.pointer_up(9, now);
    let p = session.floor().get("3").unwrap().position;
    assert!((p.x - 120.0).abs() < 1e-9 && (p.y - 480.0).abs() < 1e-9);
}

#[test]
fn replacement_mid_drag_turns_moves_into_no_ops() {
    let now = Utc::now();
    let mut session = PlannerSession::demo();
    session.pointer_down(1, "1").unwrap();

    let ticket = session.begin_generation(now).unwrap();
    let scenario = Scenario {
        tasks: demo::tasks(),
        floor_items: vec![
            FloorItem::new("gen-1", FurnitureKind::DanceFloor, 400.0, 300.0),
            FloorItem::new("gen-2", FurnitureKind::Entrance, 50.0, 300.0),
        ],
    };
    assert_eq!(
        session.complete_generation(ticket, Some(scenario), now),
        GenerationOutcome::Applied
    );
    assert!(!session.floor().contains("1"));

    let before = session.floor().clone();
    let out = session.pointer_move(1, Position::new(10.0, 10.0), &CanvasTransform::identity());
    assert_eq!(out, MoveOutcome::Stale { item_id: "1".into() });
    assert_eq!(session.floor(), &before);
    assert_eq!(session.pointer_up(1, now).as_deref(), Some("1"));
}

#[test]
fn clearance_scenarios() {
    let close = vec![
        FloorItem::new("a", FurnitureKind::RoundTable, 200.0, 200.0),
        FloorItem::new("b", FurnitureKind::RoundTable, 270.0, 200.0),
    ];
    assert!(is_violating(&close[0], &close) && is_violating(&close[1], &close));

    let apart = vec![
        FloorItem::new("a", FurnitureKind::RoundTable, 200.0, 200.0),
        FloorItem::new("b", FurnitureKind::RoundTable, 300.0, 200.0),
    ];
    assert!(!is_violating(&apart[0], &apart) && !is_violating(&apart[1], &apart));
    assert!(!has_any_violation(&apart));
}

#[test]
fn store_update_contract() {
    let mut floor = luxops_core::floor::FloorPlan::from_items(demo::floor_items());
    let snapshot = floor.clone();
    assert_eq!(floor.update_position("ghost", 0.0, 0.0), PositionUpdate::NotFound);
    assert_eq!(floor, snapshot);

    floor.update_position("4", 610.0, 310.0);
    let once = floor.clone();
    floor.update_position("4", 610.0, 310.0);
    assert_eq!(floor, once);
}
