use crate::config::Config;
use crate::prompt;
use crate::response::{self, ResearchResponse};
use agent::callbacks::TraceLogger;
use agent::llm::{CompletionRequest, LLM, Message};
use agent::tools::{SaveTool, WebSearchTool, WikiSearchTool};
use agent::{AgentBuilder, Error, Result, StopCondition};
use std::sync::Arc;

/// The model is done once it answers without asking for another tool.
struct FinalAnswer;

impl StopCondition for FinalAnswer {
    fn done(&self, history: &[Message]) -> bool {
        matches!(
            history.last(),
            Some(Message::Assistant(content, tool_calls))
                if tool_calls.is_empty() && !content.trim().is_empty()
        )
    }
}

pub struct Orchestrator {
    llm: Arc<dyn LLM + Send + Sync>,
    config: Config,
}

impl Orchestrator {
    pub fn new(llm: Arc<dyn LLM + Send + Sync>, config: Config) -> Self {
        Self { llm, config }
    }

    /// Fixed pipeline: both searches run unconditionally and independently,
    /// then one completion at temperature zero, then parse, print, save.
    /// A failed search is logged and leaves a gap for the prompt assembler
    /// to fill with a placeholder.
    pub async fn run_direct(&self, query: &str) -> Result<ResearchResponse> {
        println!("\nGathering information...");

        let web = match self.web_search(query).await {
            Ok(digest) => {
                println!("  found web results");
                Some(digest)
            }
            Err(err) => {
                tracing::warn!(error = %err, "web search failed");
                None
            }
        };

        let wiki = match self.wiki_search(query).await {
            Ok(summary) => {
                println!("  found Wikipedia results");
                Some(summary)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Wikipedia search failed");
                None
            }
        };

        self.synthesize(query, web.as_deref(), wiki.as_deref())
            .await
    }

    async fn web_search(&self, query: &str) -> Result<String> {
        WebSearchTool::new(self.config.search_api_key.clone())?
            .search(query)
            .await
    }

    async fn wiki_search(&self, query: &str) -> Result<String> {
        WikiSearchTool::new()?.search(query).await
    }

    /// Assembles the prompt from whatever the tools produced, runs the
    /// completion, and finishes the record.
    async fn synthesize(
        &self,
        query: &str,
        web: Option<&str>,
        wiki: Option<&str>,
    ) -> Result<ResearchResponse> {
        let messages = prompt::build(query, web, wiki)?;

        let reply = self
            .llm
            .completion(CompletionRequest {
                messages: &messages,
                tools: &[],
                temperature: Some(0.0),
            })
            .await?;

        println!("\nModel response:\n{}", reply.content);

        let record = response::parse(&reply.content)?;
        self.finish(&record)?;
        Ok(record)
    }

    /// Model-directed variant: the loop decides which tools to call and
    /// when, bounded by the configured step cap.
    pub async fn run_agent(&self, query: &str) -> Result<ResearchResponse> {
        let mut agent = AgentBuilder::new()
            .llm(self.llm.clone())
            .tool(Box::new(WebSearchTool::new(
                self.config.search_api_key.clone(),
            )?))
            .tool(Box::new(WikiSearchTool::new()?))
            .tool(Box::new(SaveTool::new(self.config.output_path.clone())))
            .callback(TraceLogger::new())
            .stop_condition(Box::new(FinalAnswer))
            .max_steps(self.config.max_steps)
            .build()?;

        let history = agent
            .run(vec![
                Message::System(prompt::agent_system()?),
                Message::User(query.to_string()),
            ])
            .await?;

        if !FinalAnswer.done(&history) {
            println!("\nAgent stopped without a final answer; trace follows:");
            for message in &history {
                println!("{message}");
            }
        }

        let raw = history
            .iter()
            .rev()
            .find_map(|message| match message {
                Message::Assistant(content, _) if !content.trim().is_empty() => {
                    Some(content.as_str())
                }
                _ => None,
            })
            .ok_or_else(|| {
                Error::AgentWorkflowError("agent produced no assistant output".to_string())
            })?;

        let record = response::parse_agent_output(raw)?;
        self.finish(&record)?;
        Ok(record)
    }

    fn finish(&self, record: &ResearchResponse) -> Result<()> {
        println!("\nTitle: {}", record.title);
        println!("Summary: {}", record.summary);
        println!("Sources: {}", record.sources.join(", "));
        println!("Tools Used: {}", record.tools_used.join(", "));

        let saved = SaveTool::new(self.config.output_path.clone()).save(&record.render())?;
        println!("\n{saved}");
        Ok(())
    }
}
