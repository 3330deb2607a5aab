use std::time::Duration;

use async_trait::async_trait;
use quad_core::ports::{ClassifyError, Verdict, VerdictProvider};
use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://models.github.ai/inference";
const DEFAULT_MODEL: &str = "openai/gpt-4o";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

const SYSTEM_PROMPT: &str = "You are a content moderation system. Respond only with valid JSON.";

/// Settings for the remote classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub endpoint: String,
    pub token: Option<String>,
    pub model: String,
    pub request_timeout: Duration,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            token: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClassifierConfig {
    pub fn from_env() -> Self {
        let endpoint = std::env::var("MODERATION_ENDPOINT")
            .or_else(|_| std::env::var("GITHUB_MODELS_ENDPOINT"))
            .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let token = std::env::var("MODERATION_API_TOKEN")
            .or_else(|_| std::env::var("GITHUB_TOKEN"))
            .ok()
            .filter(|t| !t.is_empty());
        let model =
            std::env::var("MODERATION_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let request_timeout = std::env::var("MODERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Self {
            endpoint,
            token,
            model,
            request_timeout,
        }
    }
}

/// Verdict provider backed by an OpenAI-style chat-completions API.
///
/// The model is asked to answer with a bare JSON object, which is parsed
/// straight into a [`Verdict`]. Without a token every call reports
/// [`ClassifyError::Unconfigured`] and the pipeline keeps the content.
pub struct ChatClassifier {
    http: reqwest::Client,
    config: ClassifierConfig,
}

impl ChatClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { http, config }
    }

    pub fn from_env() -> Self {
        Self::new(ClassifierConfig::from_env())
    }

    pub fn is_configured(&self) -> bool {
        self.config.token.is_some()
    }

    fn moderation_prompt(content: &str) -> String {
        format!(
            r#"You are moderating Quad, a social platform for university students. Analyze the following content and determine if it violates community guidelines.

Content to analyze: "{content}"

Check if the content contains:
- Harmful speech targeting groups
- Threats or intimidation
- Personal attacks or bullying
- Self-harm references
- Explicit adult content
- Graphic descriptions of harm
- Instructions for illegal activities
- Any other content inappropriate for a student platform

Respond ONLY with a JSON object in this exact format:
{{"flagged": true or false, "category": "short_category_name" or null}}

If the content is appropriate, set flagged to false and category to null."#
        )
    }

    fn parse_answer(answer: &str) -> Result<Verdict, ClassifyError> {
        serde_json::from_str(answer.trim())
            .map_err(|e| ClassifyError::InvalidResponse(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl VerdictProvider for ChatClassifier {
    async fn classify(&self, content: &str) -> Result<Verdict, ClassifyError> {
        let Some(token) = self.config.token.as_deref() else {
            return Err(ClassifyError::Unconfigured);
        };

        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::moderation_prompt(content),
                },
            ],
            temperature: 0.1,
            max_tokens: 200,
        };

        let url = format!("{}/chat/completions", self.config.endpoint);
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifyError::Timeout
                } else {
                    ClassifyError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Azure-hosted models answer 400 with this phrase when the
            // prompt itself trips their content filter.
            if status.as_u16() == 400 && body.contains("content management policy") {
                return Err(ClassifyError::PromptRejected(body));
            }
            tracing::warn!(status = status.as_u16(), "Moderation endpoint returned an error");
            return Err(ClassifyError::Status(status.as_u16()));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ClassifyError::InvalidResponse(e.to_string()))?;
        let answer = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| ClassifyError::InvalidResponse("empty completion".to_string()))?;

        Self::parse_answer(answer)
    }
}
