use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Learning context forwarded by the backend with each chat request.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatContext {
    /// Current topic (PHISHING, PASSWORDS, ...).
    pub topic: Option<String>,
    /// Difficulty level (EASY, MEDIUM, HARD).
    pub difficulty: Option<String>,
    /// Recent exercise results; only the "score" entry is used.
    #[serde(rename = "lastResults")]
    pub last_results: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(default = "default_role")]
    pub role: String,
    pub message: String,
    pub context: Option<ChatContext>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_role() -> String {
    "EMPLOYEE".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

impl ChatRequest {
    /// Boundary validation; runs before anything downstream is touched.
    /// Returns one message per violated field.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        let message_chars = self.message.chars().count();
        if !(1..=4000).contains(&message_chars) {
            errors.push("message: must be between 1 and 4000 characters".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            errors.push("temperature: must be between 0.0 and 2.0".to_string());
        }
        if !(1..=2048).contains(&self.max_tokens) {
            errors.push("max_tokens: must be between 1 and 2048".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    #[serde(rename = "suggestedNextExerciseTopic")]
    pub suggested_next_exercise_topic: Option<String>,
    #[serde(rename = "riskHints")]
    pub risk_hints: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub llama_server: String,
    pub model_loaded: bool,
    pub model_path: String,
}
