use luxops_core::{FloorItem, FurnitureKind, Scenario, Task, TaskStatus};

fn kind_tag(kind: FurnitureKind) -> &'static str {
    match kind {
        FurnitureKind::RoundTable => "[RT]",
        FurnitureKind::RectTable => "[T]",
        FurnitureKind::DanceFloor => "[DF]",
        FurnitureKind::Entrance => "[E]",
    }
}

fn status_str(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::Completed => "done",
        TaskStatus::Late => "LATE",
    }
}

/// Compact text view of the run of show and floor, for model context.
pub fn describe_plan(tasks: &[Task], items: &[FloorItem]) -> String {
    let mut out = String::with_capacity(1024);

    out.push_str("RUN OF SHOW:\n");
    for task in luxops_core::timeline::sorted_tasks(tasks) {
        out.push_str(&task.time);
        out.push(' ');
        out.push_str(&task.title);
        out.push_str(" (");
        out.push_str(&task.role);
        out.push_str(", ");
        out.push_str(status_str(task.status));
        out.push_str(")\n");
    }

    out.push_str("FLOOR:\n");
    for item in items {
        out.push_str(kind_tag(item.kind));
        out.push(' ');
        out.push_str(&item.id);
        out.push_str(" \"");
        out.push_str(item.display_name());
        out.push_str("\" @(");
        out.push_str(&format!("{:.0},{:.0}", item.position.x, item.position.y));
        out.push(')');
        if let Some(guests) = item.capacity {
            out.push_str(&format!(" guests={guests}"));
        }
        if let Some(staff) = item.assigned_staff.as_deref().filter(|s| !s.trim().is_empty()) {
            out.push_str(" staff=");
            out.push_str(staff);
        }
        out.push('\n');
    }

    out
}

pub fn scenario_system_prompt() -> String {
    let schema = schemars::schema_for!(Scenario);
    let schema_json = serde_json::to_string(&schema).unwrap_or_default();
    format!(
        "You are the planning engine of a luxury event operations team. You produce a venue \
operations scenario: a run of show for the staff and a floor layout for the room.\n\n\
## Layout rules\n{}\n\n\
## Output\n\
Output ONLY a JSON object matching this JSON Schema, nothing else:\n{}",
        luxops_core::rules::RULES,
        schema_json
    )
}

pub fn scenario_user_message(request: &str) -> String {
    format!(
        "Generate a realistic wedding venue operations scenario based on this request: \"{request}\".\n\n\
Return a JSON object with two arrays:\n\
1. \"tasks\": A timeline of 5-8 operational tasks.\n\
2. \"floorItems\": A layout of 5-8 furniture items (tables, dance floor) with coordinates \
(x: 0-800, y: 0-600).\n\n\
Ensure coordinates fit within a 800x600 canvas.\n\
Ensure furniture types are one of: TABLE_ROUND, TABLE_RECT, DANCE_FLOOR, ENTRANCE.\n\
Assign staff names to tables."
    )
}

pub fn chat_system_prompt() -> String {
    "You are a helpful Venue Operations AI assistant. \
Briefly answer the user's question or acknowledge the operational update. \
Keep it professional and concise (under 50 words)."
        .to_string()
}

pub fn chat_user_message(history: &[String], message: &str, context: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(ctx) = context {
        out.push_str("Current event state:\n");
        out.push_str(ctx);
        out.push('\n');
    }
    out.push_str("Chat History:\n");
    out.push_str(&history.join("\n"));
    out.push_str("\n\nUser: ");
    out.push_str(message);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use luxops_core::demo;

    #[test]
    fn describes_floor_and_tasks() {
        let text = describe_plan(&demo::tasks(), &demo::floor_items());
        assert!(text.contains("14:00 Vendor Load-in & Valet Prep (Ops Manager, done)"));
        assert!(text.contains("[RT] 1 \"Table 1\" @(200,200) guests=8 staff=Sarah"));
        assert!(text.contains("[DF] 4 \"Dance Floor\" @(600,300)\n"));
    }

    #[test]
    fn scenario_prompt_carries_schema_and_rules() {
        let sys = scenario_system_prompt();
        assert!(sys.contains("floorItems"));
        assert!(sys.contains("TABLE_ROUND"));
        assert!(sys.contains("80 units"));
        let user = scenario_user_message("Garden party, 60 guests");
        assert!(user.contains("\"Garden party, 60 guests\""));
    }

    #[test]
    fn chat_message_layout() {
        let msg = chat_user_message(&["Manager: hi".into(), "AI: hello".into()], "status?", None);
        assert_eq!(msg, "Chat History:\nManager: hi\nAI: hello\n\nUser: status?");
        let with_ctx = chat_user_message(&[], "status?", Some("FLOOR:\n"));
        assert!(with_ctx.starts_with("Current event state:\nFLOOR:\n"));
    }
}
