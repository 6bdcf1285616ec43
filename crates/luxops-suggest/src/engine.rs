use async_trait::async_trait;
use llm::builder::{LLMBackend, LLMBuilder};
use llm::chat::ChatMessage;
use llm::LLMProvider;
use tracing::{debug, instrument};

use luxops_core::AiSettings;

/// Anything that turns a system prompt plus one user message into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system: &str, user_msg: &str) -> Result<String, String>;
}

/// Provider names accepted in settings.
pub const PROVIDERS: [&str; 7] = [
    "openai", "anthropic", "google", "ollama", "groq", "mistral", "deepseek",
];

fn backend_for(provider: &str) -> Result<LLMBackend, String> {
    Ok(match provider {
        "openai" => LLMBackend::OpenAI,
        "anthropic" => LLMBackend::Anthropic,
        "google" => LLMBackend::Google,
        "ollama" => LLMBackend::Ollama,
        "groq" => LLMBackend::Groq,
        "mistral" => LLMBackend::Mistral,
        "deepseek" => LLMBackend::DeepSeek,
        other => return Err(format!("unknown provider: {other}")),
    })
}

/// Hosted model configured from [`AiSettings`]. A fresh client is built per
/// call so edited settings apply without a restart.
pub struct LlmEngine {
    settings: AiSettings,
}

impl LlmEngine {
    pub fn new(settings: AiSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    fn client(&self, system: &str) -> Result<Box<dyn LLMProvider>, String> {
        let s = &self.settings;
        let builder = LLMBuilder::new()
            .backend(backend_for(&s.provider)?)
            .model(&s.model)
            .system(system);
        let builder = match s.api_key.as_str() {
            "" => builder,
            key => builder.api_key(key),
        };
        builder.build().map_err(|e| format!("build LLM: {e}"))
    }
}

#[async_trait]
impl TextGenerator for LlmEngine {
    #[instrument(skip_all, fields(provider = %self.settings.provider, model = %self.settings.model))]
    async fn generate(&self, system: &str, user_msg: &str) -> Result<String, String> {
        let client = self.client(system)?;
        debug!(bytes = user_msg.len(), "sending request");
        let reply = client
            .chat(&[ChatMessage::user().content(user_msg).build()])
            .await
            .map_err(|e| format!("chat: {e}"))?;
        Ok(answer_text(reply.text()))
    }
}

/// A reply with no text is still an answer; callers decide what blank means.
pub(crate) fn answer_text(text: Option<String>) -> String {
    text.unwrap_or_default()
}
