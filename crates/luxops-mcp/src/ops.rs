//! Plan operations behind the MCP tools. Each loads a stored plan into a
//! [`PlannerSession`], runs the action and writes the result back.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use luxops_core::clients::ClientDirectory;
use luxops_core::floor::compliance::ComplianceReport;
use luxops_core::floor::drag::MoveOutcome;
use luxops_core::floor::heatmap::heatmap as heat_spots;
use luxops_core::floor::transform::CanvasTransform;
use luxops_core::floor::{FloorPlan, PositionUpdate};
use luxops_core::session::PlannerSession;
use luxops_core::timeline::sorted_tasks;
use luxops_core::{demo, EventPlan, Position};
use luxops_suggest::{CallOptions, GenerationError, TextGenerator};

/// Pointer id used when replaying an agent's drag path.
const AGENT_POINTER: i64 = 1;

#[derive(Debug, Clone, Deserialize, schemars::JsonSchema)]
pub struct ItemMove {
    /// ID of the floor item to move
    pub id: String,
    /// New canvas x (0-800)
    pub x: f64,
    /// New canvas y (0-600)
    pub y: f64,
}

#[derive(Debug, Clone, Copy, Deserialize, schemars::JsonSchema)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

fn pretty<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("Serialization error: {e}"))
}

fn load_session(dir: &Path, name: &str) -> Result<PlannerSession, String> {
    luxops_core::validate_plan_name(name)?;
    let plan = luxops_core::read_plan_in(dir, name)
        .map_err(|e| format!("Failed to read plan '{name}': {e}"))?;
    let clients = luxops_core::read_clients_in(dir)?;
    Ok(PlannerSession::from_plan(plan, clients))
}

fn save_session(dir: &Path, name: &str, session: &PlannerSession) -> Result<(), String> {
    luxops_core::write_plan_in(dir, name, &session.to_plan())
}

fn compliance_line(report: &ComplianceReport) -> String {
    if report.clear {
        report.summary().to_string()
    } else {
        format!("{} Violating: {}", report.summary(), report.violating_ids.join(", "))
    }
}

// --- Plans ---

pub fn list(dir: &Path) -> Result<String, String> {
    let names = luxops_core::list_plans_in(dir)?;
    Ok(if names.is_empty() {
        "No plans found. Use seed_plan or set_plan to create one.".to_string()
    } else {
        names.join("\n")
    })
}

pub fn get(dir: &Path, name: &str) -> Result<String, String> {
    let session = load_session(dir, name)?;
    pretty(&session.to_plan())
}

/// Check a plan submitted whole before it replaces the stored one.
fn validate_plan(plan: &EventPlan) -> Result<(), String> {
    let mut floor = FloorPlan::new();
    for item in &plan.floor_items {
        if item.id.trim().is_empty() {
            return Err("Floor items need a non-empty id".to_string());
        }
        if !item.position.is_finite() {
            return Err(format!("Floor item '{}' has a non-finite position", item.id));
        }
        floor.insert(item.clone())?;
    }
    Ok(())
}

pub fn set(dir: &Path, name: &str, data: &str) -> Result<String, String> {
    let plan: EventPlan =
        serde_json::from_str(data).map_err(|e| format!("Invalid plan JSON: {e}"))?;
    validate_plan(&plan)?;
    luxops_core::write_plan_in(dir, name, &plan)?;
    let report = ComplianceReport::evaluate(&plan.floor_items);
    Ok(format!(
        "Saved plan '{name}' ({} tasks, {} floor items). {}",
        plan.tasks.len(),
        plan.floor_items.len(),
        compliance_line(&report)
    ))
}

pub fn delete(dir: &Path, name: &str) -> Result<String, String> {
    luxops_core::validate_plan_name(name)?;
    luxops_core::delete_plan_in(dir, name)?;
    Ok(format!("Deleted plan '{name}'"))
}

pub fn seed(dir: &Path, name: &str, overwrite: bool) -> Result<String, String> {
    if !overwrite && luxops_core::list_plans_in(dir)?.iter().any(|n| n == name) {
        return Err(format!(
            "Plan '{name}' already exists. Pass overwrite=true to replace it."
        ));
    }
    luxops_core::write_plan_in(dir, name, &demo::initial_plan())?;
    Ok(format!("Seeded plan '{name}' with demo data"))
}

// --- Floor ---

pub fn move_items(dir: &Path, name: &str, moves: &[ItemMove]) -> Result<String, String> {
    if let Some(bad) = moves.iter().find(|m| !Position::new(m.x, m.y).is_finite()) {
        return Err(format!("Move for '{}' has a non-finite position", bad.id));
    }
    luxops_core::validate_plan_name(name)?;
    let mut plan = luxops_core::read_plan_in(dir, name)
        .map_err(|e| format!("Failed to read plan '{name}': {e}"))?;
    let mut floor = FloorPlan::from_items(std::mem::take(&mut plan.floor_items));

    let mut moved = 0;
    let mut missing = Vec::new();
    for m in moves {
        match floor.update_position(&m.id, m.x, m.y) {
            PositionUpdate::Moved => moved += 1,
            PositionUpdate::NotFound => missing.push(m.id.as_str()),
        }
    }
    let report = ComplianceReport::evaluate(floor.items());
    plan.floor_items = floor.into_items();
    luxops_core::write_plan_in(dir, name, &plan)?;

    let mut out = format!("Moved {moved} item(s).");
    if !missing.is_empty() {
        out.push_str(&format!(" Not found: {}.", missing.join(", ")));
    }
    out.push(' ');
    out.push_str(&compliance_line(&report));
    Ok(out)
}

/// Replay a pointer path in screen space through the drag controller.
pub fn drag(
    dir: &Path,
    name: &str,
    item_id: &str,
    path: &[ScreenPoint],
    transform: Option<CanvasTransform>,
) -> Result<String, String> {
    let transform = transform.unwrap_or_default();
    if !transform.is_invertible() {
        return Err("Transform scale must be finite and non-zero".to_string());
    }
    let mut session = load_session(dir, name)?;
    session
        .pointer_down(AGENT_POINTER, item_id)
        .map_err(|e| format!("Cannot drag '{item_id}': {e}"))?;

    let mut last = None;
    for p in path {
        match session.pointer_move(AGENT_POINTER, Position::new(p.x, p.y), &transform) {
            MoveOutcome::Moved { position, .. } => last = Some(position),
            MoveOutcome::BadTransform => {
                return Err(format!(
                    "Point ({}, {}) does not map to a finite canvas position. Plan unchanged.",
                    p.x, p.y
                ));
            }
            MoveOutcome::Stale { .. } | MoveOutcome::NotDragging => {}
        }
    }
    session.pointer_up(AGENT_POINTER, Utc::now());

    let Some(at) = last else {
        return Ok(format!("'{item_id}' was not moved"));
    };
    save_session(dir, name, &session)?;
    let report = ComplianceReport::evaluate(session.floor().items());
    Ok(format!(
        "Dropped '{item_id}' at ({:.1}, {:.1}). {}",
        at.x,
        at.y,
        compliance_line(&report)
    ))
}

pub fn compliance(dir: &Path, name: &str) -> Result<String, String> {
    let mut session = load_session(dir, name)?;
    let report = session.check_compliance(Utc::now());
    pretty(&report)
}

pub fn heatmap(dir: &Path, name: &str) -> Result<String, String> {
    let session = load_session(dir, name)?;
    pretty(&heat_spots(session.floor().items()))
}

pub fn item(dir: &Path, name: &str, item_id: &str) -> Result<String, String> {
    let mut session = load_session(dir, name)?;
    session.set_compliance(true, Utc::now());
    let detail = session
        .item_detail(item_id)
        .ok_or_else(|| format!("Floor item '{item_id}' not found"))?;
    pretty(&detail)
}

// --- Timeline and clients ---

pub fn toggle_task(dir: &Path, name: &str, task_id: &str) -> Result<String, String> {
    let mut session = load_session(dir, name)?;
    let status = session
        .toggle_task(task_id)
        .ok_or_else(|| format!("Task '{task_id}' not found"))?;
    save_session(dir, name, &session)?;
    Ok(format!("Task '{task_id}' is now {}", pretty(&status)?.trim_matches('"')))
}

pub fn timeline(dir: &Path, name: &str) -> Result<String, String> {
    let session = load_session(dir, name)?;
    let result = serde_json::json!({
        "tasks": sorted_tasks(session.tasks()),
        "next": session.next_task(),
    });
    pretty(&result)
}

pub fn clients(dir: &Path, search: Option<&str>) -> Result<String, String> {
    let directory = ClientDirectory::new(luxops_core::read_clients_in(dir)?);
    let found = match search {
        Some(term) => directory.search(term),
        None => directory.clients().iter().collect(),
    };
    pretty(&found)
}

pub fn select_client(dir: &Path, name: &str, client_id: &str) -> Result<String, String> {
    let mut session = load_session(dir, name)?;
    if !session.select_client(client_id) {
        return Err(format!("Client '{client_id}' not found"));
    }
    save_session(dir, name, &session)?;
    Ok(format!("Plan '{name}' is now for: {}", session.scenario_prompt()))
}

// --- AI ---

/// Cancel handles for generations that are out with the AI, by plan name.
#[derive(Debug, Default)]
pub struct InFlight {
    tokens: Mutex<HashMap<String, CancellationToken>>,
}

impl InFlight {
    /// Claim the plan's slot. The slot is released when the returned guard
    /// drops, including when the request future is dropped mid-flight.
    fn start(&self, name: &str) -> Result<FlightGuard<'_>, String> {
        let mut tokens = self.tokens.lock().map_err(|e| e.to_string())?;
        if tokens.contains_key(name) {
            return Err(GenerationError::Busy.to_string());
        }
        let token = CancellationToken::new();
        tokens.insert(name.to_string(), token.clone());
        Ok(FlightGuard {
            flights: self,
            name: name.to_string(),
            token,
        })
    }

    pub fn cancel(&self, name: &str) -> bool {
        match self.tokens.lock() {
            Ok(tokens) => tokens.get(name).map(|t| t.cancel()).is_some(),
            Err(_) => false,
        }
    }
}

/// Holds a plan's generation slot until dropped.
pub struct FlightGuard<'a> {
    flights: &'a InFlight,
    name: String,
    token: CancellationToken,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        let mut tokens = match self.flights.tokens.lock() {
            Ok(tokens) => tokens,
            Err(poisoned) => poisoned.into_inner(),
        };
        tokens.remove(&self.name);
    }
}

pub async fn generate(
    dir: &Path,
    name: &str,
    engine: &dyn TextGenerator,
    request: Option<&str>,
    timeout: Duration,
    in_flight: &InFlight,
) -> Result<String, String> {
    let session = load_session(dir, name)?;
    let request = request
        .map(str::to_string)
        .unwrap_or_else(|| session.scenario_prompt());

    let flight = in_flight.start(name)?;
    let opts = CallOptions {
        timeout,
        cancel: flight.token.clone(),
    };
    info!(plan = name, "requesting scenario");
    let result = luxops_suggest::generate_scenario(engine, &request, &opts).await;
    drop(flight);

    // Re-read: the plan may have been edited while the request was out.
    let mut session = load_session(dir, name)?;
    let now = Utc::now();
    let ticket = session
        .begin_generation(now)
        .map_err(|_| GenerationError::Busy.to_string())?;
    match result {
        Err(GenerationError::Cancelled) => {
            session.cancel_generation(now);
            Err("Generation cancelled. Plan unchanged.".to_string())
        }
        Err(e) => {
            warn!(plan = name, error = %e, "generation failed");
            session.complete_generation(ticket, None, now);
            let notice = session.notices().latest().map(|n| n.message.clone());
            Err(format!("{} ({e})", notice.unwrap_or_default()))
        }
        Ok(scenario) => {
            session.complete_generation(ticket, Some(scenario), now);
            save_session(dir, name, &session)?;
            let report = ComplianceReport::evaluate(session.floor().items());
            Ok(format!(
                "Event Blueprint Generated: {} tasks, {} floor items. {}",
                session.tasks().len(),
                session.floor().len(),
                compliance_line(&report)
            ))
        }
    }
}

pub async fn send_message(
    dir: &Path,
    name: &str,
    engine: &dyn TextGenerator,
    message: &str,
    timeout: Duration,
) -> Result<String, String> {
    let mut session = load_session(dir, name)?;
    let opts = CallOptions {
        timeout,
        cancel: CancellationToken::new(),
    };
    let reply = luxops_suggest::reply_into_session(&mut session, engine, message, &opts)
        .await
        .ok_or("Message is empty")?;
    save_session(dir, name, &session)?;
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use luxops_core::FurnitureKind;

    struct Canned(Result<String, String>);

    #[async_trait]
    impl TextGenerator for Canned {
        async fn generate(&self, _system: &str, _user_msg: &str) -> Result<String, String> {
            self.0.clone()
        }
    }

    struct Hung;

    #[async_trait]
    impl TextGenerator for Hung {
        async fn generate(&self, _system: &str, _user_msg: &str) -> Result<String, String> {
            std::future::pending().await
        }
    }

    fn seeded() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), "gala", false).unwrap();
        dir
    }

    const SECS: Duration = Duration::from_secs(5);

    #[test]
    fn seed_list_and_refuse_overwrite() {
        let dir = seeded();
        assert_eq!(list(dir.path()).unwrap(), "gala");
        assert!(seed(dir.path(), "gala", false).is_err());
        assert!(seed(dir.path(), "gala", true).is_ok());
        delete(dir.path(), "gala").unwrap();
        assert!(list(dir.path()).unwrap().starts_with("No plans"));
    }

    #[test]
    fn set_rejects_duplicates_and_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        assert!(set(dir.path(), "p", "not json").is_err());
        let dup = r#"{"floorItems": [
            {"id": "1", "type": "ENTRANCE", "x": 1, "y": 1},
            {"id": "1", "type": "ENTRANCE", "x": 500, "y": 500}
        ]}"#;
        assert!(set(dir.path(), "p", dup).unwrap_err().contains("already exists"));
        let ok = r#"{"floorItems": [
            {"id": "1", "type": "ENTRANCE", "x": 1, "y": 1},
            {"id": "2", "type": "DANCE_FLOOR", "x": 50, "y": 1}
        ]}"#;
        let out = set(dir.path(), "p", ok).unwrap();
        assert!(out.contains("Compliance Breach"));
    }

    #[test]
    fn move_items_reports_missing() {
        let dir = seeded();
        let moves = vec![
            ItemMove { id: "4".into(), x: 650.0, y: 350.0 },
            ItemMove { id: "ghost".into(), x: 0.0, y: 0.0 },
        ];
        let out = move_items(dir.path(), "gala", &moves).unwrap();
        assert!(out.starts_with("Moved 1 item(s). Not found: ghost."));
        let plan = luxops_core::read_plan_in(dir.path(), "gala").unwrap();
        let df = plan.floor_items.iter().find(|i| i.id == "4").unwrap();
        assert_eq!(df.position, Position::new(650.0, 350.0));
    }

    #[test]
    fn drag_replays_path_through_transform() {
        let dir = seeded();
        let t = CanvasTransform::uniform(100.0, 0.0, 2.0);
        let path = [ScreenPoint { x: 500.0, y: 400.0 }, ScreenPoint { x: 700.0, y: 500.0 }];
        let out = drag(dir.path(), "gala", "1", &path, Some(t)).unwrap();
        assert!(out.starts_with("Dropped '1' at (300.0, 250.0)."));

        assert!(drag(dir.path(), "gala", "nope", &path, None).is_err());
        let flat = CanvasTransform::new(0.0, 0.0, 0.0, 1.0);
        assert!(drag(dir.path(), "gala", "1", &path, Some(flat)).is_err());
    }

    #[test]
    fn drag_to_overflowing_point_keeps_plan_readable() {
        let dir = seeded();
        let before = get(dir.path(), "gala").unwrap();
        let tiny = CanvasTransform::new(0.0, 0.0, 1e-300, 1e-300);
        let far = [ScreenPoint { x: 1e300, y: 1e300 }];
        let err = drag(dir.path(), "gala", "1", &far, Some(tiny)).unwrap_err();
        assert!(err.contains("finite"));
        assert_eq!(get(dir.path(), "gala").unwrap(), before);
    }

    #[test]
    fn item_detail_flags_violation() {
        let dir = seeded();
        let moves = vec![ItemMove { id: "2".into(), x: 250.0, y: 200.0 }];
        move_items(dir.path(), "gala", &moves).unwrap();
        let detail = item(dir.path(), "gala", "1").unwrap();
        assert!(detail.contains("\"violating\": true"));
        assert!(detail.contains("Relocate immediately"));
    }

    #[test]
    fn toggle_and_timeline() {
        let dir = seeded();
        let out = toggle_task(dir.path(), "gala", "1").unwrap();
        assert_eq!(out, "Task '1' is now PENDING");
        let tl = timeline(dir.path(), "gala").unwrap();
        assert!(tl.contains("\"next\""));
        assert!(toggle_task(dir.path(), "gala", "99").is_err());
    }

    #[test]
    fn clients_search_and_select() {
        let dir = seeded();
        let found = clients(dir.path(), Some("techglobal")).unwrap();
        assert!(found.contains("TechGlobal"));
        assert!(!found.contains("Jenkins"));
        let out = select_client(dir.path(), "gala", "3").unwrap();
        assert!(out.contains("80 guests"));
        assert!(select_client(dir.path(), "gala", "42").is_err());
    }

    #[tokio::test]
    async fn generate_replaces_floor_and_logs() {
        let dir = seeded();
        let raw = r#"{"tasks": [{"id": "1", "time": "18:00", "title": "Dinner", "role": "Chef", "status": "PENDING"}],
            "floorItems": [{"id": "a", "type": "TABLE_RECT", "x": 100, "y": 100, "assignedStaff": "Jo"}]}"#;
        let out = generate(dir.path(), "gala", &Canned(Ok(raw.into())), None, SECS, &InFlight::default())
            .await
            .unwrap();
        assert!(out.starts_with("Event Blueprint Generated: 1 tasks, 1 floor items."));
        let plan = luxops_core::read_plan_in(dir.path(), "gala").unwrap();
        assert_eq!(plan.floor_items.len(), 1);
        assert_eq!(plan.floor_items[0].kind, FurnitureKind::RectTable);
        assert!(plan.messages.iter().any(|m| m.text == "New event schematic generated."));
    }

    #[tokio::test]
    async fn failed_generation_leaves_plan() {
        let dir = seeded();
        let before = luxops_core::read_plan_in(dir.path(), "gala").unwrap();
        let err = generate(dir.path(), "gala", &Canned(Err("503".into())), Some("x"), SECS, &InFlight::default())
            .await
            .unwrap_err();
        assert!(err.starts_with("Generation Interrupted. Please retry."));
        assert_eq!(luxops_core::read_plan_in(dir.path(), "gala").unwrap(), before);
    }

    #[test]
    fn in_flight_blocks_second_start() {
        let flights = InFlight::default();
        let flight = flights.start("gala").unwrap();
        assert!(flights.start("gala").is_err());
        assert!(flights.start("brunch").is_ok());
        assert!(flights.cancel("gala"));
        assert!(flight.token.is_cancelled());
        drop(flight);
        assert!(!flights.cancel("gala"));
    }

    #[tokio::test]
    async fn dropped_generation_frees_the_plan() {
        let dir = seeded();
        let flights = InFlight::default();
        let abandoned = tokio::time::timeout(
            Duration::from_millis(20),
            generate(dir.path(), "gala", &Hung, Some("x"), SECS, &flights),
        )
        .await;
        assert!(abandoned.is_err());
        assert!(!flights.cancel("gala"));

        let raw = r#"{"floorItems": [{"id": "a", "type": "ENTRANCE", "x": 400, "y": 590}]}"#;
        let out = generate(dir.path(), "gala", &Canned(Ok(raw.into())), Some("x"), SECS, &flights)
            .await
            .unwrap();
        assert!(out.starts_with("Event Blueprint Generated"));
    }

    #[tokio::test]
    async fn message_round_trip_persists() {
        let dir = seeded();
        let reply = send_message(dir.path(), "gala", &Canned(Ok("Noted.".into())), "Valet is late", SECS)
            .await
            .unwrap();
        assert_eq!(reply, "Noted.");
        let plan = luxops_core::read_plan_in(dir.path(), "gala").unwrap();
        let tail: Vec<&str> = plan.messages.iter().rev().take(2).map(|m| m.text.as_str()).collect();
        assert_eq!(tail, vec!["Noted.", "Valet is late"]);

        let offline = send_message(dir.path(), "gala", &Canned(Err("down".into())), "hello?", SECS)
            .await
            .unwrap();
        assert_eq!(offline, luxops_suggest::CHAT_FALLBACK);
    }
}
