pub mod chat;
pub mod clients;
pub mod demo;
pub mod floor;
pub mod notices;
pub mod rules;
pub mod session;
pub mod timeline;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

// --- Types (wire names match the dashboard's JSON) ---

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Completed,
    Late,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    /// Wall-clock start, "HH:MM"
    pub time: String,
    pub title: String,
    /// Staff role responsible, e.g. "Bar Lead"
    pub role: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FurnitureKind {
    #[serde(rename = "TABLE_ROUND")]
    RoundTable,
    #[serde(rename = "TABLE_RECT")]
    RectTable,
    DanceFloor,
    Entrance,
}

impl FurnitureKind {
    pub const ALL: [FurnitureKind; 4] = [
        FurnitureKind::RoundTable,
        FurnitureKind::RectTable,
        FurnitureKind::DanceFloor,
        FurnitureKind::Entrance,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            FurnitureKind::RoundTable => "TABLE_ROUND",
            FurnitureKind::RectTable => "TABLE_RECT",
            FurnitureKind::DanceFloor => "DANCE_FLOOR",
            FurnitureKind::Entrance => "ENTRANCE",
        }
    }

    pub fn from_wire(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.wire_name() == s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, JsonSchema)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A placed piece of furniture or a zone on the floor plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FloorItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FurnitureKind,
    #[serde(flatten)]
    pub position: Position,
    /// Degrees. Rendering only.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Seated guest count (tables)
    #[serde(rename = "guests", default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_staff: Option<String>,
}

impl FloorItem {
    pub fn new(id: impl Into<String>, kind: FurnitureKind, x: f64, y: f64) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Position::new(x, y),
            rotation: 0.0,
            label: None,
            capacity: None,
            assigned_staff: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_guests(mut self, guests: u32) -> Self {
        self.capacity = Some(guests);
        self
    }

    pub fn with_staff(mut self, staff: impl Into<String>) -> Self {
        self.assigned_staff = Some(staff.into());
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    /// Staff counts as assigned only when the name is non-blank.
    pub fn has_staff(&self) -> bool {
        self.assigned_staff
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Signed,
    Pending,
    Draft,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub event_name: String,
    /// ISO date, "YYYY-MM-DD"
    pub date: String,
    pub email: String,
    pub phone: String,
    pub guest_count: u32,
    pub contract_status: ContractStatus,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChatRole {
    Manager,
    Staff,
    #[serde(rename = "AI")]
    Ai,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            ChatRole::Manager => "Manager",
            ChatRole::Staff => "Staff",
            ChatRole::Ai => "AI",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender: String,
    pub role: ChatRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Generated replacement for an event's run of show and floor layout.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Timeline of 5-8 operational tasks
    pub tasks: Vec<Task>,
    /// 5-8 furniture items with x in 0-800 and y in 0-600
    pub floor_items: Vec<FloorItem>,
}

/// One stored event: everything the dashboard persists between sessions.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPlan {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub floor_items: Vec<FloorItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

// --- Storage ---

const PLAN_EXT: &str = "lux";

/// Resolve the global data directory (~/.luxops/).
pub fn plans_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".luxops")
}

/// List all plan names (without extension), sorted.
pub fn list_plans() -> Result<Vec<String>, String> {
    list_plans_in(&plans_dir())
}

pub fn list_plans_in(dir: &Path) -> Result<Vec<String>, String> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let suffix = format!(".{PLAN_EXT}");
    let mut names: Vec<String> = fs::read_dir(dir)
        .map_err(|e| e.to_string())?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let name = entry.file_name().to_string_lossy().to_string();
            name.strip_suffix(&suffix)
                .filter(|n| !n.starts_with('.'))
                .map(|n| n.to_string())
        })
        .collect();
    names.sort();
    Ok(names)
}

fn plan_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{PLAN_EXT}"))
}

/// Read a plan as raw JSON.
pub fn read_plan_raw(name: &str) -> Result<String, String> {
    read_plan_raw_in(&plans_dir(), name)
}

pub fn read_plan_raw_in(dir: &Path, name: &str) -> Result<String, String> {
    fs::read_to_string(plan_path(dir, name)).map_err(|e| e.to_string())
}

pub fn read_plan(name: &str) -> Result<EventPlan, String> {
    read_plan_in(&plans_dir(), name)
}

pub fn read_plan_in(dir: &Path, name: &str) -> Result<EventPlan, String> {
    let raw = read_plan_raw_in(dir, name)?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

/// Write raw JSON atomically (temp file + rename) so readers never see a
/// truncated plan.
pub fn write_plan_raw(name: &str, data: &str) -> Result<(), String> {
    write_plan_raw_in(&plans_dir(), name, data)
}

pub fn write_plan_raw_in(dir: &Path, name: &str, data: &str) -> Result<(), String> {
    validate_plan_name(name)?;
    fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let tmp = dir.join(format!(".{name}.{PLAN_EXT}.tmp"));
    fs::write(&tmp, data).map_err(|e| e.to_string())?;
    fs::rename(&tmp, plan_path(dir, name)).map_err(|e| e.to_string())?;
    debug!(plan = name, bytes = data.len(), "plan written");
    Ok(())
}

pub fn write_plan(name: &str, plan: &EventPlan) -> Result<(), String> {
    write_plan_in(&plans_dir(), name, plan)
}

pub fn write_plan_in(dir: &Path, name: &str, plan: &EventPlan) -> Result<(), String> {
    let json = serde_json::to_string_pretty(plan).map_err(|e| e.to_string())?;
    write_plan_raw_in(dir, name, &json)
}

pub fn delete_plan(name: &str) -> Result<(), String> {
    delete_plan_in(&plans_dir(), name)
}

pub fn delete_plan_in(dir: &Path, name: &str) -> Result<(), String> {
    let path = plan_path(dir, name);
    if path.exists() {
        debug!(plan = name, "deleting plan");
        fs::remove_file(&path).map_err(|e| e.to_string())
    } else {
        Ok(())
    }
}

/// Plan names become file names; keep them to a safe alphabet.
pub fn validate_plan_name(name: &str) -> Result<(), String> {
    let ok = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if ok {
        Ok(())
    } else {
        Err(format!(
            "Invalid plan name '{name}': use letters, digits, '-', '_' or '.', not starting with '.'"
        ))
    }
}

// --- Client directory file ---

fn clients_path(dir: &Path) -> PathBuf {
    dir.join("clients.json")
}

/// Read the client directory. Falls back to the demo clients when no file exists yet.
pub fn read_clients() -> Result<Vec<Client>, String> {
    read_clients_in(&plans_dir())
}

pub fn read_clients_in(dir: &Path) -> Result<Vec<Client>, String> {
    let path = clients_path(dir);
    if !path.exists() {
        return Ok(demo::clients());
    }
    let raw = fs::read_to_string(&path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}

pub fn write_clients_in(dir: &Path, clients: &[Client]) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(clients).map_err(|e| e.to_string())?;
    fs::write(clients_path(dir), json).map_err(|e| e.to_string())
}

// --- AI Settings ---

pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 30;
pub const API_KEY_ENV: &str = "LUXOPS_API_KEY";

fn default_timeout_secs() -> u64 {
    DEFAULT_AI_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    /// Upper bound for any single provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: String::new(),
            api_key: String::new(),
            model: String::new(),
            timeout_secs: DEFAULT_AI_TIMEOUT_SECS,
        }
    }
}

fn settings_path(dir: &Path) -> PathBuf {
    dir.join("settings.json")
}

/// Read settings, filling an empty key from `LUXOPS_API_KEY`.
pub fn read_settings() -> AiSettings {
    let mut settings = read_settings_in(&plans_dir());
    if settings.api_key.is_empty() {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            settings.api_key = key;
        }
    }
    settings
}

pub fn read_settings_in(dir: &Path) -> AiSettings {
    let path = settings_path(dir);
    if !path.exists() {
        return AiSettings::default();
    }
    fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or_default()
}

pub fn write_settings(settings: &AiSettings) -> Result<(), String> {
    write_settings_in(&plans_dir(), settings)
}

pub fn write_settings_in(dir: &Path, settings: &AiSettings) -> Result<(), String> {
    fs::create_dir_all(dir).map_err(|e| e.to_string())?;
    let json = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(settings_path(dir), json).map_err(|e| e.to_string())
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}

// --- IDs ---

/// Next free "prefix-N" id, scanning existing ids.
pub fn next_prefixed_id<'a>(prefix: &str, existing: impl IntoIterator<Item = &'a str>) -> String {
    let max = existing
        .into_iter()
        .filter_map(|id| {
            id.strip_prefix(prefix)
                .and_then(|s| s.strip_prefix('-'))
                .and_then(|s| s.parse::<u64>().ok())
        })
        .max()
        .unwrap_or(0);
    format!("{}-{}", prefix, max + 1)
}

pub fn next_message_id(messages: &[ChatMessage]) -> String {
    next_prefixed_id("msg", messages.iter().map(|m| m.id.as_str()))
}
