//! `luxops-mcp init`: register this binary with the agent clients found on PATH.

use std::path::{Path, PathBuf};

const SERVER_NAME: &str = "luxops";

/// An agent client that reads project-scoped MCP server config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AgentClient {
    ClaudeCode,
    Codex,
}

impl AgentClient {
    const ALL: [AgentClient; 2] = [AgentClient::ClaudeCode, AgentClient::Codex];

    fn label(self) -> &'static str {
        match self {
            AgentClient::ClaudeCode => "Claude Code",
            AgentClient::Codex => "Codex",
        }
    }

    fn executable(self) -> &'static str {
        match self {
            AgentClient::ClaudeCode => "claude",
            AgentClient::Codex => "codex",
        }
    }

    fn config_path(self, project: &Path) -> PathBuf {
        match self {
            AgentClient::ClaudeCode => project.join(".mcp.json"),
            AgentClient::Codex => project.join(".codex").join("config.toml"),
        }
    }

    /// `existing` with the luxops entry set to `command`. Other servers and
    /// unrelated settings are kept.
    fn merge(self, existing: Option<&str>, command: &str) -> Result<String, String> {
        match self {
            AgentClient::ClaudeCode => merge_json(existing, command),
            AgentClient::Codex => merge_toml(existing, command),
        }
    }
}

fn merge_json(existing: Option<&str>, command: &str) -> Result<String, String> {
    let mut root: serde_json::Value = match existing {
        Some(text) if !text.trim().is_empty() => {
            serde_json::from_str(text).map_err(|e| format!("not valid JSON: {e}"))?
        }
        _ => serde_json::json!({}),
    };
    let Some(obj) = root.as_object_mut() else {
        return Err("top level is not a JSON object".to_string());
    };
    let servers = obj
        .entry("mcpServers")
        .or_insert_with(|| serde_json::json!({}));
    if !servers.is_object() {
        *servers = serde_json::json!({});
    }
    servers[SERVER_NAME] = serde_json::json!({
        "type": "stdio",
        "command": command,
        "args": [],
    });
    serde_json::to_string_pretty(&root).map_err(|e| e.to_string())
}

fn merge_toml(existing: Option<&str>, command: &str) -> Result<String, String> {
    let mut doc: toml_edit::DocumentMut = existing
        .unwrap_or_default()
        .parse()
        .map_err(|e| format!("not valid TOML: {e}"))?;
    if !doc.contains_table("mcp_servers") {
        doc["mcp_servers"] = toml_edit::table();
    }
    let mut entry = toml_edit::Table::new();
    entry.insert("command", toml_edit::value(command));
    entry.insert("args", toml_edit::value(toml_edit::Array::new()));
    doc["mcp_servers"][SERVER_NAME] = toml_edit::Item::Table(entry);
    Ok(doc.to_string())
}

/// Merge the luxops entry into `client`'s config under `project`.
/// A config that can't be parsed is left alone.
fn write_config(client: AgentClient, project: &Path, command: &str) -> Result<PathBuf, String> {
    let path = client.config_path(project);
    let existing = match std::fs::read_to_string(&path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(format!("read {}: {e}", path.display())),
    };
    let merged = client
        .merge(existing.as_deref(), command)
        .map_err(|e| format!("{}: {e}", path.display()))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| format!("create {}: {e}", parent.display()))?;
    }
    std::fs::write(&path, merged).map_err(|e| format!("write {}: {e}", path.display()))?;
    Ok(path)
}

fn on_path(name: &str) -> bool {
    std::env::var_os("PATH").is_some_and(|paths| {
        std::env::split_paths(&paths)
            .any(|dir| dir.join(name).is_file() || dir.join(format!("{name}.exe")).is_file())
    })
}

pub fn init_project() -> Result<(), Box<dyn std::error::Error>> {
    let command = std::env::current_exe()?
        .canonicalize()?
        .to_string_lossy()
        .into_owned();
    let project = std::env::current_dir()?;

    let clients: Vec<AgentClient> = AgentClient::ALL
        .into_iter()
        .filter(|c| on_path(c.executable()))
        .collect();
    if clients.is_empty() {
        return Err("neither `claude` nor `codex` is on PATH; install one and re-run `luxops-mcp init`".into());
    }

    for client in &clients {
        let path = write_config(*client, &project, &command)?;
        eprintln!("Wrote {}", path.display());
    }
    let labels: Vec<&str> = clients.iter().map(|c| c.label()).collect();
    eprintln!("\nDone. {} will use luxops in this project.", labels.join(" and "));
    Ok(())
}
