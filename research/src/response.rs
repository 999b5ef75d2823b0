use agent::{Error, Result, structured};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The record every model reply must decode into. All four fields are
/// required; a reply missing any of them is a decode failure, not a
/// partial result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResearchResponse {
    pub title: String,
    pub summary: String,
    pub sources: Vec<String>,
    pub tools_used: Vec<String>,
}

impl ResearchResponse {
    /// The fixed on-disk rendering, one entry per run.
    pub fn render(&self) -> String {
        format!(
            "Title: {}\nSummary: {}\nSources: {}\nTools Used: {}",
            self.title,
            self.summary,
            self.sources.join(", "),
            self.tools_used.join(", ")
        )
    }
}

pub fn parse(raw: &str) -> Result<ResearchResponse> {
    structured::parse(raw)
}

/// Wrapper keys an agent run may leave its final record under, most
/// authoritative first. A bare record always wins over any wrapper; a
/// wrapper value may be the record itself or a JSON-encoded string of it.
const OUTPUT_KEYS: &[&str] = &["final_answer", "output", "response"];

pub fn parse_agent_output(raw: &str) -> Result<ResearchResponse> {
    if let Ok(record) = structured::parse::<ResearchResponse>(raw) {
        return Ok(record);
    }

    let value: serde_json::Value = structured::parse(raw)?;
    for key in OUTPUT_KEYS {
        let Some(inner) = value.get(key) else { continue };

        let decoded = match inner {
            serde_json::Value::String(text) => structured::parse(text),
            other => serde_json::from_value(other.clone()).map_err(|err| Error::DecodeError {
                reason: err.to_string(),
                raw: raw.to_string(),
            }),
        };

        if let Ok(record) = decoded {
            return Ok(record);
        }
    }

    Err(Error::DecodeError {
        reason: format!("no research record under any of {:?}", OUTPUT_KEYS),
        raw: raw.to_string(),
    })
}
