use crate::llm::Message;
use crate::tools::{FunctionalTool, ToolCall, ToolDefinition};
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";
const RESULT_COUNT: u8 = 5;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct SearchResponse {
    web: Option<WebResults>,
}

#[derive(Deserialize)]
struct WebResults {
    results: Vec<WebResult>,
}

#[derive(Deserialize)]
struct WebResult {
    title: String,
    url: String,
    #[serde(default)]
    description: String,
}

/// Web search over the Brave Search API. The subscription token comes from
/// the caller, not the ambient environment.
pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl WebSearchTool {
    pub fn new(api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("research-agent/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client, api_key })
    }

    pub async fn search(&self, query: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| Error::SearchError("BRAVE_API_KEY is not set".to_string()))?;

        let url = format!(
            "{}?q={}&count={}",
            SEARCH_ENDPOINT,
            urlencoding::encode(query),
            RESULT_COUNT
        );

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .header("X-Subscription-Token", api_key)
            .send()
            .await?
            .error_for_status()?;

        let body: SearchResponse = response.json().await?;

        let results = body.web.map(|web| web.results).unwrap_or_default();
        if results.is_empty() {
            return Ok(format!("No results found for: {}", query));
        }

        Ok(digest(&results))
    }
}

fn digest(results: &[WebResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            format!(
                "{}. {}\n   {}\n   {}",
                i + 1,
                result.title,
                result.url,
                result.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Deserialize, JsonSchema)]
struct SearchArgs {
    query: String,
}

#[async_trait]
impl FunctionalTool for WebSearchTool {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<SearchArgs>(
            "search",
            "search the web for current information on a topic",
        )
    }

    async fn invoke(&mut self, call: &ToolCall) -> Result<Message> {
        let args: SearchArgs = call.args()?;
        Ok(Message::Tool {
            id: call.id.clone(),
            name: "search".to_string(),
            result: self.search(&args.query).await?,
        })
    }
}
