use crate::llm::Message;
use crate::tools::{FunctionalTool, ToolCall, ToolDefinition};
use crate::{Error, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_ENDPOINT: &str = "https://en.wikipedia.org/w/rest.php/v1/search/page";
const SUMMARY_ENDPOINT: &str = "https://en.wikipedia.org/api/rest_v1/page/summary";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct PageSearchResponse {
    pages: Vec<PageHit>,
}

#[derive(Deserialize)]
struct PageHit {
    key: String,
}

#[derive(Deserialize)]
struct PageSummary {
    title: String,
    extract: String,
}

/// Encyclopedia lookup: finds the best-matching Wikipedia page for a topic
/// and returns its summary extract.
pub struct WikiSearchTool {
    client: reqwest::Client,
}

impl WikiSearchTool {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("research-agent/0.1")
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { client })
    }

    pub async fn search(&self, query: &str) -> Result<String> {
        let url = format!(
            "{}?q={}&limit=1",
            SEARCH_ENDPOINT,
            urlencoding::encode(query)
        );

        let hits: PageSearchResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let page = hits
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| Error::SearchError(format!("no Wikipedia page matches: {}", query)))?;

        let url = format!("{}/{}", SUMMARY_ENDPOINT, page.key);
        let summary: PageSummary = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(format!("{}: {}", summary.title, summary.extract))
    }
}

#[derive(Deserialize, JsonSchema)]
struct WikiSearchArgs {
    query: String,
}

#[async_trait]
impl FunctionalTool for WikiSearchTool {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<WikiSearchArgs>(
            "wiki_search",
            "look up a topic on Wikipedia and return the page summary",
        )
    }

    async fn invoke(&mut self, call: &ToolCall) -> Result<Message> {
        let args: WikiSearchArgs = call.args()?;
        Ok(Message::Tool {
            id: call.id.clone(),
            name: "wiki_search".to_string(),
            result: self.search(&args.query).await?,
        })
    }
}
