use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/api/generate";
const DEFAULT_OLLAMA_MODEL: &str = "mistral";
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Which LLM backend serves `/api/generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorBackend {
    /// Schema-constrained generation against the hosted provider.
    Hosted,
    /// Free-text generation against a local Ollama endpoint, with JSON repair.
    Local,
}

impl FromStr for GeneratorBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hosted" => Ok(Self::Hosted),
            "local" => Ok(Self::Local),
            other => Err(anyhow!(
                "GENERATOR_BACKEND must be 'hosted' or 'local', got '{other}'"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if the hosted backend is selected without a credential.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: GeneratorBackend,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub llm_timeout_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("GENERATOR_BACKEND") {
            Some(raw) => raw.parse::<GeneratorBackend>()?,
            None => GeneratorBackend::Hosted,
        };

        let openai_api_key = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty());
        if backend == GeneratorBackend::Hosted && openai_api_key.is_none() {
            return Err(anyhow!(
                "Required environment variable 'OPENAI_API_KEY' is not set \
                (needed by the hosted curriculum generator)"
            ));
        }

        Ok(Config {
            backend,
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ollama_url: lookup("OLLAMA_URL").unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            ollama_model: lookup("OLLAMA_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            llm_timeout_secs: lookup("LLM_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
            port: lookup("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}
