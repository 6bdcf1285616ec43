mod init;
mod ops;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use luxops_core::floor::transform::CanvasTransform;
use luxops_core::AiSettings;
use luxops_suggest::{LlmEngine, TextGenerator};

use ops::{InFlight, ItemMove, ScreenPoint};

// --- Request types ---

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct PlanRequest {
    /// Name of the event plan
    name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SetPlanRequest {
    /// Name of the plan to create or overwrite
    name: String,
    /// The complete plan as a JSON string: {tasks, floorItems, messages?, clientId?}. See get_plan output for the exact shape.
    data: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SeedPlanRequest {
    /// Name for the new plan
    name: String,
    /// Replace an existing plan of the same name. Default false.
    overwrite: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct MoveItemsRequest {
    /// Name of the plan
    name: String,
    /// Moves to apply in order. Ids that do not exist are reported and skipped.
    moves: Vec<ItemMove>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct DragItemRequest {
    /// Name of the plan
    name: String,
    /// ID of the floor item to pick up
    item_id: String,
    /// Pointer positions in screen space, in order. The item ends at the last one.
    path: Vec<ScreenPoint>,
    /// Screen-to-canvas mapping {offsetX, offsetY, scaleX, scaleY}. Default: identity.
    transform: Option<CanvasTransform>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ItemRequest {
    /// Name of the plan
    name: String,
    /// ID of the floor item
    item_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct TaskRequest {
    /// Name of the plan
    name: String,
    /// ID of the task to toggle
    task_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct ListClientsRequest {
    /// Case-insensitive match on client or event name
    search: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SelectClientRequest {
    /// Name of the plan
    name: String,
    /// ID of the client the plan is for
    client_id: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct GenerateRequest {
    /// Name of the plan to replace tasks and floor items in
    name: String,
    /// Free-form event brief. Default: built from the plan's client.
    request: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct SendMessageRequest {
    /// Name of the plan whose communication log receives the message
    name: String,
    /// Message from the event director
    message: String,
}

fn respond(result: Result<String, String>) -> Result<CallToolResult, McpError> {
    Ok(match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => CallToolResult::error(vec![Content::text(e)]),
    })
}

// --- Server ---

#[derive(Clone)]
pub struct LuxOpsServer {
    tool_router: ToolRouter<Self>,
    dir: PathBuf,
    in_flight: Arc<InFlight>,
}

#[tool_router]
impl LuxOpsServer {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            tool_router: Self::tool_router(),
            dir,
            in_flight: Arc::new(InFlight::default()),
        }
    }

    /// Settings are re-read per call so edits to settings.json apply without a restart.
    fn engine(&self) -> (Arc<dyn TextGenerator>, Duration) {
        let settings: AiSettings = luxops_core::read_settings();
        let timeout = luxops_suggest::CallOptions::from_settings(&settings).timeout;
        (Arc::new(LlmEngine::new(settings)), timeout)
    }

    #[tool(description = "List all stored event plans")]
    fn list_plans(&self) -> Result<CallToolResult, McpError> {
        respond(ops::list(&self.dir))
    }

    #[tool(
        description = "Get the full JSON of an event plan: {tasks: [{id, time, title, role, status}], floorItems: [{id, type, x, y, rotation, label?, guests?, assignedStaff?}], messages, clientId?}"
    )]
    fn get_plan(&self, Parameters(req): Parameters<PlanRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::get(&self.dir, &req.name))
    }

    #[tool(
        description = "Create or overwrite a plan with complete data. Floor item ids must be unique and coordinates finite. Types: TABLE_ROUND, TABLE_RECT, DANCE_FLOOR, ENTRANCE. Task status: PENDING, COMPLETED, LATE.\n\nExample:\n{\"tasks\": [{\"id\": \"1\", \"time\": \"17:00\", \"title\": \"Guests Arrive\", \"role\": \"Host\", \"status\": \"PENDING\"}], \"floorItems\": [{\"id\": \"1\", \"type\": \"TABLE_ROUND\", \"x\": 200, \"y\": 200, \"label\": \"Table 1\", \"guests\": 8, \"assignedStaff\": \"Sarah\"}]}"
    )]
    fn set_plan(&self, Parameters(req): Parameters<SetPlanRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::set(&self.dir, &req.name, &req.data))
    }

    #[tool(description = "Delete a stored plan")]
    fn delete_plan(&self, Parameters(req): Parameters<PlanRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::delete(&self.dir, &req.name))
    }

    #[tool(description = "Create a plan from the demo wedding reception: three tasks, three tables and a dance floor")]
    fn seed_plan(&self, Parameters(req): Parameters<SeedPlanRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::seed(&self.dir, &req.name, req.overwrite.unwrap_or(false)))
    }

    #[tool(
        description = "Set the canvas position of one or more floor items. Reports ids that were not found and the clearance verdict afterwards."
    )]
    fn move_items(&self, Parameters(req): Parameters<MoveItemsRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::move_items(&self.dir, &req.name, &req.moves))
    }

    #[tool(
        description = "Drag a floor item along a pointer path given in screen coordinates. Each point is mapped to canvas space through the transform; the item is dropped at the last point."
    )]
    fn drag_item(&self, Parameters(req): Parameters<DragItemRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::drag(&self.dir, &req.name, &req.item_id, &req.path, req.transform))
    }

    #[tool(
        description = "Check the 80-unit egress clearance between every pair of floor items. Returns {itemCount, clear, violatingIds, violations: [{first, second, distance}]}."
    )]
    fn check_compliance(&self, Parameters(req): Parameters<PlanRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::compliance(&self.dir, &req.name))
    }

    #[tool(
        description = "Staffing heatmap: one spot per floor item with its coverage (assigned or unassigned), radius and colour"
    )]
    fn get_heatmap(&self, Parameters(req): Parameters<PlanRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::heatmap(&self.dir, &req.name))
    }

    #[tool(description = "Detail for one floor item, including any clearance violation warning")]
    fn get_item(&self, Parameters(req): Parameters<ItemRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::item(&self.dir, &req.name, &req.item_id))
    }

    #[tool(description = "Toggle a task: COMPLETED becomes PENDING, anything else becomes COMPLETED")]
    fn toggle_task(&self, Parameters(req): Parameters<TaskRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::toggle_task(&self.dir, &req.name, &req.task_id))
    }

    #[tool(description = "Run of show sorted by time, plus the next task to work on")]
    fn get_timeline(&self, Parameters(req): Parameters<PlanRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::timeline(&self.dir, &req.name))
    }

    #[tool(description = "List concierge clients, optionally filtered by a search term")]
    fn list_clients(&self, Parameters(req): Parameters<ListClientsRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::clients(&self.dir, req.search.as_deref()))
    }

    #[tool(description = "Set which client a plan is for. The client drives the default generation brief.")]
    fn select_client(&self, Parameters(req): Parameters<SelectClientRequest>) -> Result<CallToolResult, McpError> {
        respond(ops::select_client(&self.dir, &req.name, &req.client_id))
    }

    #[tool(
        description = "Ask the AI for a new run of show and floor layout. On success both are replaced as a whole; on failure the plan is untouched. Only one generation per plan runs at a time."
    )]
    async fn generate_scenario(
        &self,
        Parameters(req): Parameters<GenerateRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (engine, timeout) = self.engine();
        respond(
            ops::generate(
                &self.dir,
                &req.name,
                engine.as_ref(),
                req.request.as_deref(),
                timeout,
                &self.in_flight,
            )
            .await,
        )
    }

    #[tool(description = "Cancel a running generate_scenario for a plan. Its result will be discarded.")]
    fn cancel_generation(&self, Parameters(req): Parameters<PlanRequest>) -> Result<CallToolResult, McpError> {
        respond(if self.in_flight.cancel(&req.name) {
            Ok(format!("Cancelled generation for '{}'", req.name))
        } else {
            Err(format!("No generation running for '{}'", req.name))
        })
    }

    #[tool(
        description = "Send a message to the operations AI. Both the message and the reply are appended to the plan's communication log."
    )]
    async fn send_message(
        &self,
        Parameters(req): Parameters<SendMessageRequest>,
    ) -> Result<CallToolResult, McpError> {
        let (engine, timeout) = self.engine();
        respond(ops::send_message(&self.dir, &req.name, engine.as_ref(), &req.message, timeout).await)
    }

    #[tool(description = "Get the venue layout rules that generated and edited plans must follow")]
    fn get_rules(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(
            luxops_core::rules::RULES,
        )]))
    }
}

#[tool_handler]
impl ServerHandler for LuxOpsServer {
    fn get_info(&self) -> ServerInfo {
        let instructions = format!(
            "{}\n\n## Venue Layout Rules\n{}",
            INSTRUCTIONS,
            luxops_core::rules::RULES
        );
        ServerInfo {
            instructions: Some(instructions.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

const INSTRUCTIONS: &str = r#"luxops is the operations desk for luxury events. Each event plan is stored as a .lux file (JSON) holding a run of show, an 800x600 floor plan and a communication log.

Start from `seed_plan` when no plan exists yet. A running `generate_scenario` can be stopped with `cancel_generation`; the plan is then left as it was."#;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LUXOPS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the protocol
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::args().nth(1).as_deref() == Some("init") {
        return init::init_project();
    }

    init_tracing();
    let dir = luxops_core::plans_dir();
    info!(dir = %dir.display(), "starting luxops-mcp");

    let service = LuxOpsServer::new(dir)
        .serve(rmcp::transport::io::stdio())
        .await
        .inspect_err(|e| error!("MCP server error: {e}"))?;
    service.waiting().await?;
    Ok(())
}
