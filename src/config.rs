use std::env;

/// Runtime configuration, read from the environment once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host of the llama.cpp server.
    pub llama_host: String,
    /// Port of the llama.cpp server.
    pub llama_port: u16,
    /// Port this service listens on.
    pub api_port: u16,
    /// Path to the GGUF model file loaded by the llama.cpp server.
    pub model_path: String,
}

impl Config {
    /// Read configuration from the environment, falling back to defaults
    /// for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            llama_host: env::var("LLAMA_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            llama_port: env_port("LLAMA_PORT", 8001),
            api_port: env_port("API_PORT", 8000),
            model_path: env::var("MODEL_PATH")
                .unwrap_or_else(|_| "/app/models/mistral-7b-instruct.Q4_K_M.gguf".to_string()),
        }
    }

    /// Base URL of the llama.cpp server.
    pub fn llama_url(&self) -> String {
        format!("http://{}:{}", self.llama_host, self.llama_port)
    }
}

fn env_port(key: &str, default: u16) -> u16 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(default)
}
