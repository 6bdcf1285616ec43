//! Seed data for a fresh dashboard.

use crate::{Client, ContractStatus, EventPlan, FloorItem, FurnitureKind, Task, TaskStatus};

pub fn tasks() -> Vec<Task> {
    let task = |id: &str, time: &str, title: &str, role: &str, status| Task {
        id: id.to_string(),
        time: time.to_string(),
        title: title.to_string(),
        role: role.to_string(),
        status,
    };
    vec![
        task("1", "14:00", "Vendor Load-in & Valet Prep", "Ops Manager", TaskStatus::Completed),
        task("2", "15:30", "Champagne Tower Assembly", "Bar Lead", TaskStatus::Pending),
        task("3", "16:00", "String Quartet Sound Check", "AV Director", TaskStatus::Pending),
    ]
}

pub fn floor_items() -> Vec<FloorItem> {
    vec![
        FloorItem::new("1", FurnitureKind::RoundTable, 200.0, 200.0)
            .with_label("Table 1")
            .with_guests(8)
            .with_staff("Sarah"),
        FloorItem::new("2", FurnitureKind::RoundTable, 400.0, 200.0)
            .with_label("Table 2")
            .with_guests(8)
            .with_staff("Mike"),
        FloorItem::new("3", FurnitureKind::RectTable, 300.0, 400.0)
            .with_rotation(90.0)
            .with_label("Head Table")
            .with_guests(12)
            .with_staff("Emily"),
        FloorItem::new("4", FurnitureKind::DanceFloor, 600.0, 300.0).with_label("Dance Floor"),
    ]
}

pub fn clients() -> Vec<Client> {
    vec![
        Client {
            id: "1".into(),
            name: "James Thompson & Emily White".into(),
            event_name: "Thompson-White Wedding".into(),
            date: "2026-06-15".into(),
            email: "emily.white@prestige-holdings.net".into(),
            phone: "+1 (555) 012-3456".into(),
            guest_count: 150,
            contract_status: ContractStatus::Signed,
            notes: "Vegetarian meals required for 12 guests. Band requires 3x3m stage area.".into(),
        },
        Client {
            id: "2".into(),
            name: "TechGlobal Corp".into(),
            event_name: "Annual Innovators Summit".into(),
            date: "2026-07-20".into(),
            email: "events@techglobal-lux.io".into(),
            phone: "+1 (555) 098-7654".into(),
            guest_count: 300,
            contract_status: ContractStatus::Pending,
            notes: "Requires high-speed dedicated internet line and projector setup in main hall."
                .into(),
        },
        Client {
            id: "3".into(),
            name: "Sarah Jenkins".into(),
            event_name: "Jenkins 50th Jubilee".into(),
            date: "2026-08-05".into(),
            email: "sarah.j@grand-lumiere.com".into(),
            phone: "+1 (555) 111-2222".into(),
            guest_count: 80,
            contract_status: ContractStatus::Draft,
            notes: "Open bar preferred. Verify liquor license extension.".into(),
        },
    ]
}

pub fn initial_plan() -> EventPlan {
    EventPlan {
        tasks: tasks(),
        floor_items: floor_items(),
        messages: vec![],
        client_id: Some("1".into()),
    }
}
