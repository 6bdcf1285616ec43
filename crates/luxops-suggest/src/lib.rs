pub mod engine;
mod parse;
mod prompt;

use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use luxops_core::session::{GenerationBusy, GenerationOutcome, PlannerSession};
use luxops_core::{AiSettings, Scenario, DEFAULT_AI_TIMEOUT_SECS};

pub use engine::{LlmEngine, TextGenerator};
pub use prompt::describe_plan;

/// Reply logged when the assistant is unreachable.
pub const CHAT_FALLBACK: &str = "System offline. Message logged.";
/// Reply logged when the assistant answers with nothing.
pub const CHAT_EMPTY_REPLY: &str = "Received.";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("AI backend error: {0}")]
    Backend(String),
    #[error("AI request timed out after {0:?}")]
    Timeout(Duration),
    #[error("AI request cancelled")]
    Cancelled,
    #[error("AI returned an empty response")]
    EmptyResponse,
    #[error("AI response unusable: {0}")]
    Malformed(String),
    #[error("a generation is already in progress")]
    Busy,
}

impl From<GenerationBusy> for GenerationError {
    fn from(_: GenerationBusy) -> Self {
        GenerationError::Busy
    }
}

/// Deadline and cancel handle for one collaborator call.
#[derive(Debug, Clone)]
pub struct CallOptions {
    pub timeout: Duration,
    pub cancel: CancellationToken,
}

impl CallOptions {
    pub fn from_settings(settings: &AiSettings) -> Self {
        let secs = if settings.timeout_secs == 0 {
            DEFAULT_AI_TIMEOUT_SECS
        } else {
            settings.timeout_secs
        };
        Self {
            timeout: Duration::from_secs(secs),
            cancel: CancellationToken::new(),
        }
    }
}

impl Default for CallOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_AI_TIMEOUT_SECS),
            cancel: CancellationToken::new(),
        }
    }
}

async fn call<F>(opts: &CallOptions, request: F) -> Result<String, GenerationError>
where
    F: Future<Output = Result<String, String>>,
{
    tokio::select! {
        biased;
        _ = opts.cancel.cancelled() => Err(GenerationError::Cancelled),
        res = tokio::time::timeout(opts.timeout, request) => match res {
            Err(_) => Err(GenerationError::Timeout(opts.timeout)),
            Ok(Err(e)) => Err(GenerationError::Backend(e)),
            Ok(Ok(text)) if text.trim().is_empty() => Err(GenerationError::EmptyResponse),
            Ok(Ok(text)) => Ok(text),
        },
    }
}

/// Ask the collaborator for a run of show plus floor layout.
pub async fn generate_scenario(
    generator: &dyn TextGenerator,
    request: &str,
    opts: &CallOptions,
) -> Result<Scenario, GenerationError> {
    let system = prompt::scenario_system_prompt();
    let user_msg = prompt::scenario_user_message(request);

    let raw = call(opts, generator.generate(&system, &user_msg)).await?;
    debug!(bytes = raw.len(), "scenario response received");
    let scenario = parse::parse_scenario(&raw).map_err(GenerationError::Malformed)?;
    info!(
        tasks = scenario.tasks.len(),
        items = scenario.floor_items.len(),
        "scenario parsed"
    );
    Ok(scenario)
}

/// Collapse a generation result into the form the session applies.
pub fn scenario_or_none(result: Result<Scenario, GenerationError>) -> Option<Scenario> {
    match result {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(error = %e, "scenario generation failed");
            None
        }
    }
}

/// Answer one comms message. Never fails: an unreachable assistant yields
/// [`CHAT_FALLBACK`] and a blank answer yields [`CHAT_EMPTY_REPLY`].
pub async fn chat_reply(
    generator: &dyn TextGenerator,
    history: &[String],
    message: &str,
    context: Option<&str>,
    opts: &CallOptions,
) -> String {
    let system = prompt::chat_system_prompt();
    let user_msg = prompt::chat_user_message(history, message, context);

    match call(opts, generator.generate(&system, &user_msg)).await {
        Ok(text) => text.trim().to_string(),
        Err(GenerationError::EmptyResponse) => CHAT_EMPTY_REPLY.to_string(),
        Err(e) => {
            warn!(error = %e, "chat reply failed");
            CHAT_FALLBACK.to_string()
        }
    }
}

/// Run one generation against `session` from trigger to apply.
///
/// `request` overrides the prompt built from the active client.
pub async fn generate_into_session(
    session: &mut PlannerSession,
    generator: &dyn TextGenerator,
    request: Option<&str>,
    opts: &CallOptions,
) -> Result<GenerationOutcome, GenerationBusy> {
    let request = request
        .map(str::to_string)
        .unwrap_or_else(|| session.scenario_prompt());
    let ticket = session.begin_generation(Utc::now())?;

    let result = generate_scenario(generator, &request, opts).await;
    if matches!(result, Err(GenerationError::Cancelled)) {
        session.cancel_generation(Utc::now());
        return Ok(GenerationOutcome::Discarded);
    }
    Ok(session.complete_generation(ticket, scenario_or_none(result), Utc::now()))
}

/// Log a manager message, fetch the assistant's answer and log that too.
/// Returns `None` for a blank message, which is not sent.
pub async fn reply_into_session(
    session: &mut PlannerSession,
    generator: &dyn TextGenerator,
    message: &str,
    opts: &CallOptions,
) -> Option<String> {
    let history = session.record_manager_message(message, Utc::now())?;
    let context = describe_plan(session.tasks(), session.floor().items());
    let reply = chat_reply(generator, &history, message.trim(), Some(&context), opts).await;
    session.record_ai_reply(&reply, Utc::now());
    Some(reply)
}
