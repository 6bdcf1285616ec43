//! The dashboard's single owner of state.
//!
//! Every mutation goes through a `PlannerSession` method; views get shared
//! references. Generation requests are tracked by ticket so a response that
//! lands after a cancel or a newer request is dropped rather than merged.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::chat::{CommunicationLog, AI_SENDER, HISTORY_TURNS, MANAGER_SENDER, SYSTEM_SENDER};
use crate::clients::ClientDirectory;
use crate::floor::compliance::{self, ComplianceReport, VIOLATION_MESSAGE};
use crate::floor::drag::{DragController, DragRefusal, MoveOutcome, PointerId};
use crate::floor::heatmap::{self, HeatSpot};
use crate::floor::transform::CanvasTransform;
use crate::floor::FloorPlan;
use crate::notices::{NoticeBoard, NoticeKind, DEFAULT_NOTICE_TTL_SECS};
use crate::timeline;
use crate::{
    ChatMessage, ChatRole, Client, EventPlan, FloorItem, Position, Scenario, Task, TaskStatus,
};

pub const GENERATING_NOTICE: &str = "Consulting Intelligence Engine...";
pub const GENERATED_NOTICE: &str = "Event Blueprint Generated";
pub const GENERATION_FAILED_NOTICE: &str = "Generation Interrupted. Please retry.";
pub const GENERATED_LOG_LINE: &str = "New event schematic generated.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlays {
    pub heatmap: bool,
    pub compliance: bool,
}

/// Handle for one outstanding generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationTicket(u64);

/// A generation is already running; the trigger stays disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationBusy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// Tasks and layout replaced
    Applied,
    /// Collaborator gave nothing; state untouched
    Failed,
    /// Ticket was cancelled or superseded; response ignored
    Discarded,
}

/// What the detail panel shows for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDetail {
    pub item: FloorItem,
    pub violating: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct PlannerSession {
    floor: FloorPlan,
    drag: DragController,
    tasks: Vec<Task>,
    log: CommunicationLog,
    notices: NoticeBoard,
    clients: ClientDirectory,
    overlays: Overlays,
    pending: Option<GenerationTicket>,
    issued: u64,
}

impl PlannerSession {
    pub fn from_plan(plan: EventPlan, clients: Vec<Client>) -> Self {
        let mut directory = ClientDirectory::new(clients);
        if let Some(id) = &plan.client_id {
            directory.select(id);
        }
        Self {
            floor: FloorPlan::from_items(plan.floor_items),
            tasks: plan.tasks,
            log: CommunicationLog::new(plan.messages),
            clients: directory,
            ..Default::default()
        }
    }

    pub fn demo() -> Self {
        Self::from_plan(crate::demo::initial_plan(), crate::demo::clients())
    }

    /// Use a multi-touch aware drag controller.
    pub fn with_pointer_capacity(mut self, capacity: usize) -> Self {
        self.drag = DragController::with_capacity(capacity);
        self
    }

    /// Snapshot for storage.
    pub fn to_plan(&self) -> EventPlan {
        EventPlan {
            tasks: self.tasks.clone(),
            floor_items: self.floor.items().to_vec(),
            messages: self.log.messages().to_vec(),
            client_id: self.clients.selected_id().map(str::to_string),
        }
    }

    // --- Views ---

    pub fn floor(&self) -> &FloorPlan {
        &self.floor
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.log.messages()
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn clients(&self) -> &ClientDirectory {
        &self.clients
    }

    pub fn overlays(&self) -> Overlays {
        self.overlays
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn selected_item(&self) -> Option<&FloorItem> {
        self.drag.selected().and_then(|id| self.floor.get(id))
    }

    /// Compliance marker for one item; always false while the overlay is off.
    pub fn is_flagged(&self, item: &FloorItem) -> bool {
        self.overlays.compliance && compliance::is_violating(item, self.floor.items())
    }

    pub fn item_detail(&self, id: &str) -> Option<ItemDetail> {
        let item = self.floor.get(id)?;
        let violating = self.is_flagged(item);
        Some(ItemDetail {
            item: item.clone(),
            violating,
            warning: violating.then_some(VIOLATION_MESSAGE),
        })
    }

    /// Heat spots while the overlay is on.
    pub fn heatmap(&self) -> Option<Vec<HeatSpot>> {
        self.overlays
            .heatmap
            .then(|| heatmap::heatmap(self.floor.items()))
    }

    // --- Floor interaction ---

    pub fn pointer_down(&mut self, pointer: PointerId, item_id: &str) -> Result<(), DragRefusal> {
        self.drag.pointer_down(&self.floor, pointer, item_id)
    }

    pub fn pointer_move(
        &mut self,
        pointer: PointerId,
        screen: Position,
        transform: &CanvasTransform,
    ) -> MoveOutcome {
        self.drag
            .pointer_move(&mut self.floor, pointer, screen, transform)
    }

    /// Release the pointer. A finished drag re-runs the clearance check when
    /// the compliance overlay is on.
    pub fn pointer_up(&mut self, pointer: PointerId, now: DateTime<Utc>) -> Option<String> {
        let released = self.drag.pointer_up(pointer)?;
        if self.overlays.compliance {
            self.check_compliance(now);
        }
        Some(released)
    }

    pub fn clear_selection(&mut self) {
        self.drag.select(None);
    }

    // --- Overlays ---

    pub fn set_heatmap(&mut self, on: bool) {
        self.overlays.heatmap = on;
    }

    /// Turning compliance on posts the verdict immediately.
    pub fn set_compliance(&mut self, on: bool, now: DateTime<Utc>) -> Option<ComplianceReport> {
        let was_on = self.overlays.compliance;
        self.overlays.compliance = on;
        (on && !was_on).then(|| self.check_compliance(now))
    }

    pub fn check_compliance(&mut self, now: DateTime<Utc>) -> ComplianceReport {
        let report = ComplianceReport::evaluate(self.floor.items());
        let kind = if report.clear {
            NoticeKind::Success
        } else {
            NoticeKind::Critical
        };
        debug!(violations = report.violations.len(), "compliance check");
        self.notices.push(kind, report.summary(), now);
        report
    }

    // --- Timeline and clients ---

    pub fn toggle_task(&mut self, id: &str) -> Option<TaskStatus> {
        timeline::toggle_task(&mut self.tasks, id)
    }

    pub fn next_task(&self) -> Option<&Task> {
        timeline::next_task(&self.tasks)
    }

    pub fn select_client(&mut self, id: &str) -> bool {
        self.clients.select(id)
    }

    /// Generation prompt for the active client.
    pub fn scenario_prompt(&self) -> String {
        match self.clients.active() {
            Some(c) => format!(
                "Luxury Wedding Reception for {}, {} guests, indoors",
                c.event_name, c.guest_count
            ),
            None => "Luxury Wedding Reception, 150 guests, indoors".to_string(),
        }
    }

    // --- Scenario generation ---

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn begin_generation(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<GenerationTicket, GenerationBusy> {
        if self.pending.is_some() {
            return Err(GenerationBusy);
        }
        self.issued += 1;
        let ticket = GenerationTicket(self.issued);
        self.pending = Some(ticket);
        self.notices.push(NoticeKind::Info, GENERATING_NOTICE, now);
        Ok(ticket)
    }

    /// Abandon the outstanding request; its response will be discarded.
    pub fn cancel_generation(&mut self, now: DateTime<Utc>) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        self.notices
            .push(NoticeKind::Warning, GENERATION_FAILED_NOTICE, now);
        true
    }

    /// Apply a collaborator result. The whole collection is replaced, never merged.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Option<Scenario>,
        now: DateTime<Utc>,
    ) -> GenerationOutcome {
        if self.pending != Some(ticket) {
            debug!(?ticket, "discarding stale generation result");
            return GenerationOutcome::Discarded;
        }
        self.pending = None;

        let Some(scenario) = result else {
            self.notices
                .push(NoticeKind::Warning, GENERATION_FAILED_NOTICE, now);
            return GenerationOutcome::Failed;
        };

        info!(
            tasks = scenario.tasks.len(),
            items = scenario.floor_items.len(),
            "applying generated scenario"
        );
        self.tasks = scenario.tasks;
        self.floor.insert_all(scenario.floor_items);
        self.log
            .push(SYSTEM_SENDER, ChatRole::Ai, GENERATED_LOG_LINE, now);
        self.notices.push(NoticeKind::Success, GENERATED_NOTICE, now);
        if self.overlays.compliance {
            self.check_compliance(now);
        }
        GenerationOutcome::Applied
    }

    // --- Communication log ---

    /// Log a manager message. Returns the history to send along with it
    /// (the turns before this one), or `None` for a blank message.
    pub fn record_manager_message(&mut self, text: &str, now: DateTime<Utc>) -> Option<Vec<String>> {
        if text.trim().is_empty() {
            return None;
        }
        let history = self.log.history(HISTORY_TURNS);
        self.log.push(MANAGER_SENDER, ChatRole::Manager, text, now);
        Some(history)
    }

    pub fn record_ai_reply(&mut self, text: &str, now: DateTime<Utc>) {
        self.log.push(AI_SENDER, ChatRole::Ai, text, now);
    }

    // --- Notices ---

    pub fn expire_notices(&mut self, now: DateTime<Utc>) -> usize {
        self.notices
            .expire(now, Duration::seconds(DEFAULT_NOTICE_TTL_SECS))
    }

    pub fn dismiss_notice(&mut self, id: &str) -> bool {
        self.notices.dismiss(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FurnitureKind;

    fn scenario() -> Scenario {
        Scenario {
            tasks: vec![Task {
                id: "t1".into(),
                time: "17:00".into(),
                title: "Guests Arrive".into(),
                role: "Host".into(),
                status: TaskStatus::Pending,
            }],
            floor_items: vec![
                FloorItem::new("a", FurnitureKind::Entrance, 100.0, 100.0),
                FloorItem::new("b", FurnitureKind::RoundTable, 150.0, 100.0),
            ],
        }
    }

    #[test]
    fn generation_replaces_everything() {
        let now = Utc::now();
        let mut s = PlannerSession::demo();
        let ticket = s.begin_generation(now).unwrap();
        assert!(s.is_generating());
        assert_eq!(s.begin_generation(now), Err(GenerationBusy));

        assert_eq!(
            s.complete_generation(ticket, Some(scenario()), now),
            GenerationOutcome::Applied
        );
        assert!(!s.is_generating());
        assert_eq!(s.floor().len(), 2);
        assert!(!s.floor().contains("1"));
        assert_eq!(s.tasks().len(), 1);
        assert_eq!(s.messages().last().map(|m| m.text.as_str()), Some(GENERATED_LOG_LINE));
        assert_eq!(s.notices().latest().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[test]
    fn failed_generation_keeps_state() {
        let now = Utc::now();
        let mut s = PlannerSession::demo();
        let before = s.to_plan();
        let ticket = s.begin_generation(now).unwrap();
        assert_eq!(s.complete_generation(ticket, None, now), GenerationOutcome::Failed);
        assert_eq!(s.to_plan(), before);
        assert_eq!(
            s.notices().latest().map(|n| (n.kind, n.message.as_str())),
            Some((NoticeKind::Warning, GENERATION_FAILED_NOTICE))
        );
        assert!(!s.is_generating());
    }

    #[test]
    fn cancelled_ticket_is_discarded() {
        let now = Utc::now();
        let mut s = PlannerSession::demo();
        let old = s.begin_generation(now).unwrap();
        assert!(s.cancel_generation(now));
        assert!(!s.cancel_generation(now));

        let fresh = s.begin_generation(now).unwrap();
        assert_ne!(old, fresh);
        assert_eq!(
            s.complete_generation(old, Some(scenario()), now),
            GenerationOutcome::Discarded
        );
        assert_eq!(s.floor().len(), 4);
        assert!(s.is_generating());
        assert_eq!(
            s.complete_generation(fresh, Some(scenario()), now),
            GenerationOutcome::Applied
        );
    }

    #[test]
    fn compliance_toggle_posts_verdict() {
        let now = Utc::now();
        let mut s = PlannerSession::demo();
        let report = s.set_compliance(true, now).unwrap();
        assert!(report.clear);
        assert_eq!(s.notices().latest().map(|n| n.kind), Some(NoticeKind::Success));
        // already on: nothing new
        assert!(s.set_compliance(true, now).is_none());

        s.pointer_down(1, "2").unwrap();
        s.pointer_move(1, Position::new(230.0, 210.0), &CanvasTransform::identity());
        s.pointer_up(1, now);
        assert_eq!(s.notices().latest().map(|n| n.kind), Some(NoticeKind::Critical));

        let detail = s.item_detail("1").unwrap();
        assert!(detail.violating);
        assert_eq!(detail.warning, Some(VIOLATION_MESSAGE));

        s.set_compliance(false, now);
        assert!(!s.item_detail("1").unwrap().violating);
    }

    #[test]
    fn heatmap_only_when_enabled() {
        let mut s = PlannerSession::demo();
        assert!(s.heatmap().is_none());
        s.set_heatmap(true);
        assert_eq!(s.heatmap().map(|h| h.len()), Some(4));
    }

    #[test]
    fn chat_history_excludes_new_message() {
        let now = Utc::now();
        let mut s = PlannerSession::demo();
        assert!(s.record_manager_message("   ", now).is_none());
        let h = s.record_manager_message("Is the bar stocked?", now).unwrap();
        assert!(h.is_empty());
        s.record_ai_reply("Yes, fully stocked.", now);
        let h = s.record_manager_message("Thanks", now).unwrap();
        assert_eq!(h, vec!["Manager: Is the bar stocked?", "AI: Yes, fully stocked."]);
        assert_eq!(s.messages().len(), 3);
    }

    #[test]
    fn prompt_uses_active_client() {
        let mut s = PlannerSession::demo();
        assert_eq!(
            s.scenario_prompt(),
            "Luxury Wedding Reception for Thompson-White Wedding, 150 guests, indoors"
        );
        assert!(s.select_client("3"));
        assert!(s.scenario_prompt().contains("Jenkins 50th Jubilee, 80 guests"));
        assert_eq!(s.to_plan().client_id.as_deref(), Some("3"));
    }

    #[test]
    fn selection_survives_drag() {
        let now = Utc::now();
        let mut s = PlannerSession::demo();
        s.pointer_down(3, "4").unwrap();
        s.pointer_up(3, now);
        assert_eq!(s.selected_item().map(|i| i.id.as_str()), Some("4"));
        s.clear_selection();
        assert!(s.selected_item().is_none());
    }

    #[test]
    fn two_hands_move_two_tables() {
        let now = Utc::now();
        let view = CanvasTransform::identity();
        let mut s = PlannerSession::demo().with_pointer_capacity(2);
        s.pointer_down(1, "1").unwrap();
        s.pointer_down(2, "2").unwrap();
        assert_eq!(s.pointer_down(3, "3"), Err(DragRefusal::CapacityReached));

        assert!(matches!(s.pointer_move(1, Position::new(100.0, 500.0), &view), MoveOutcome::Moved { .. }));
        assert!(matches!(s.pointer_move(2, Position::new(700.0, 500.0), &view), MoveOutcome::Moved { .. }));
        s.pointer_up(1, now);
        s.pointer_up(2, now);
        assert_eq!(s.floor().get("1").map(|i| (i.position.x, i.position.y)), Some((100.0, 500.0)));
        assert_eq!(s.floor().get("2").map(|i| (i.position.x, i.position.y)), Some((700.0, 500.0)));

        let mut single = PlannerSession::demo();
        single.pointer_down(1, "1").unwrap();
        assert_eq!(single.pointer_down(2, "2"), Err(DragRefusal::CapacityReached));
    }

    #[test]
    fn notices_expire_or_get_dismissed() {
        let now = Utc::now();
        let mut s = PlannerSession::demo();
        s.check_compliance(now);
        let first = s.notices().latest().map(|n| n.id.clone()).unwrap();
        s.check_compliance(now + Duration::seconds(5));

        assert!(s.dismiss_notice(&first));
        assert!(!s.dismiss_notice(&first));
        assert_eq!(s.notices().notices().len(), 1);

        assert_eq!(s.expire_notices(now + Duration::seconds(8)), 0);
        assert_eq!(s.expire_notices(now + Duration::seconds(12)), 1);
        assert!(s.notices().is_empty());
    }
}
