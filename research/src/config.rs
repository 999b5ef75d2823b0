use std::env;
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_OUTPUT: &str = "research_output.txt";
const DEFAULT_MAX_STEPS: usize = 10;

/// Process-wide settings, read from the environment once at startup and
/// passed down instead of re-read at call sites. The OpenAI key itself is
/// picked up by the completion client.
#[derive(Clone)]
pub struct Config {
    pub model: String,
    pub search_api_key: Option<String>,
    pub output_path: PathBuf,
    pub max_steps: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            model: env::var("RESEARCH_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            search_api_key: env::var("BRAVE_API_KEY").ok(),
            output_path: env::var("RESEARCH_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT)),
            max_steps: env::var("RESEARCH_MAX_STEPS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_MAX_STEPS),
        }
    }
}
