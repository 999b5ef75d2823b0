use crate::callbacks;
use crate::llm;
use crate::tools;
use crate::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

const DEFAULT_MAX_STEPS: usize = 16;

pub trait StopCondition {
    fn done(&self, history: &[llm::Message]) -> bool;
}

type Tool = Box<dyn tools::Tool + Send>;
type Callback = Box<dyn callbacks::Callback + Send>;

/// One turn of the model-directed loop. The model's own output drives the
/// transitions: Thinking emits either tool calls or a candidate answer,
/// Observing lets callbacks and the stop condition react.
enum Step {
    Thinking,
    ToolCall(Vec<tools::ToolCall>),
    Observing,
    Done,
}

pub struct Agent {
    llm: Arc<dyn llm::LLM + Send + Sync>,
    tools: HashMap<String, Tool>,
    callbacks: Vec<Callback>,
    tool_defs: Vec<tools::ToolDefinition>,
    stop_condition: Box<dyn StopCondition + Send>,
    max_steps: usize,
}

impl Agent {
    async fn execute_tool_call(
        &mut self,
        tool_call: &tools::ToolCall,
        mut messages: Vec<llm::Message>,
    ) -> Result<Vec<llm::Message>> {
        let Some(tool) = self.tools.get_mut(&tool_call.name) else {
            tracing::warn!(tool = %tool_call.name, "model requested an unknown tool");
            messages.push(llm::Message::Tool {
                id: tool_call.id.clone(),
                name: tool_call.name.clone(),
                result: format!("tool {} does not exist", tool_call.name),
            });
            return Ok(messages);
        };

        // A failing tool is an observation for the model, not a fatal error.
        match tool.invoke(tool_call, messages.clone()).await {
            Ok(updated) => Ok(updated),
            Err(err) => {
                tracing::warn!(tool = %tool_call.name, error = %err, "tool call failed");
                messages.push(llm::Message::Tool {
                    id: tool_call.id.clone(),
                    name: tool_call.name.clone(),
                    result: format!("tool {} failed: {}", tool_call.name, err),
                });
                Ok(messages)
            }
        }
    }

    /// Runs the loop until the stop condition fires or the step cap is hit.
    /// On the cap the history so far is returned; the caller decides what to
    /// make of a run that never produced a final answer.
    pub async fn run(&mut self, mut messages: Vec<llm::Message>) -> Result<Vec<llm::Message>> {
        let mut step = Step::Thinking;
        let mut turns = 0usize;

        loop {
            step = match step {
                Step::Thinking => {
                    if turns == self.max_steps {
                        tracing::warn!(
                            max_steps = self.max_steps,
                            "stopping agent at step limit without a final answer"
                        );
                        return Ok(messages);
                    }
                    turns += 1;

                    let next = self
                        .llm
                        .completion(llm::CompletionRequest {
                            messages: &messages,
                            tools: &self.tool_defs,
                            temperature: None,
                        })
                        .await?;

                    messages.push(llm::Message::Assistant(
                        next.content,
                        next.tool_calls.clone(),
                    ));

                    if next.tool_calls.is_empty() {
                        Step::Observing
                    } else {
                        Step::ToolCall(next.tool_calls)
                    }
                }
                Step::ToolCall(calls) => {
                    for call in &calls {
                        messages = self.execute_tool_call(call, messages).await?;
                    }
                    Step::Observing
                }
                Step::Observing => {
                    for callback in &mut self.callbacks {
                        messages = callback.call(messages).await?;
                    }
                    if self.stop_condition.done(&messages) {
                        Step::Done
                    } else {
                        Step::Thinking
                    }
                }
                Step::Done => return Ok(messages),
            };
        }
    }
}

pub struct AgentBuilder {
    llm: Option<Arc<dyn llm::LLM + Send + Sync>>,
    tools: Vec<Tool>,
    callbacks: Vec<Callback>,
    stop_condition: Option<Box<dyn StopCondition + Send>>,
    max_steps: usize,
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            llm: None,
            tools: Vec::new(),
            callbacks: Vec::new(),
            stop_condition: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn llm(mut self, llm: Arc<dyn llm::LLM + Send + Sync>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools.extend(tools);
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callbacks.push(callback);
        self
    }

    pub fn stop_condition(mut self, cond: Box<dyn StopCondition + Send>) -> Self {
        self.stop_condition = Some(cond);
        self
    }

    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let mut tool_defs = Vec::new();
        let mut tools = HashMap::new();

        for tool in self.tools {
            let def = tool.definition()?;
            tools.insert(def.name.clone(), tool);
            tool_defs.push(def);
        }

        Ok(Agent {
            llm: self
                .llm
                .ok_or(Error::MissingArg("llm is required for agent".to_string()))?,
            tools,
            tool_defs,
            callbacks: self.callbacks,
            stop_condition: self.stop_condition.ok_or(Error::MissingArg(
                "stop_condition is required for agent".to_string(),
            ))?,
            max_steps: self.max_steps,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::llm::{CompletionRequest, CompletionResponse, LLM, Message};
    use crate::tools::{FunctionalTool, ToolCall, ToolDefinition};
    use crate::{AgentBuilder, Result, StopCondition};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct MockLLM;

    #[async_trait]
    impl LLM for MockLLM {
        async fn completion<'a>(
            &self,
            request: CompletionRequest<'a>,
        ) -> Result<CompletionResponse> {
            match request.messages.last() {
                Some(Message::User(_)) => Ok(CompletionResponse {
                    content: "calling a tool".to_string(),
                    tool_calls: vec![ToolCall {
                        id: "call1".to_string(),
                        name: "double".to_string(),
                        args: "{\"arg\":123}".to_string(),
                    }],
                }),
                Some(Message::Tool { .. }) => Ok(CompletionResponse {
                    content: "completed".to_string(),
                    tool_calls: vec![],
                }),
                _ => panic!("unexpected message sequence"),
            }
        }
    }

    struct DoubleTool;

    #[derive(serde::Deserialize, schemars::JsonSchema)]
    struct DoubleArgs {
        arg: i32,
    }

    #[async_trait]
    impl FunctionalTool for DoubleTool {
        fn definition(&self) -> Result<ToolDefinition> {
            ToolDefinition::new::<DoubleArgs>("double", "double a number")
        }

        async fn invoke(&mut self, tool_call: &ToolCall) -> Result<Message> {
            let args: DoubleArgs = tool_call.args()?;
            Ok(Message::Tool {
                id: tool_call.id.clone(),
                name: "double".to_string(),
                result: format!("2 * {} = {}", args.arg, 2 * args.arg),
            })
        }
    }

    struct SimpleStop;

    impl StopCondition for SimpleStop {
        fn done(&self, history: &[Message]) -> bool {
            if let Some(Message::Assistant(content, _)) = history.last() {
                content == "completed"
            } else {
                false
            }
        }
    }

    #[tokio::test]
    async fn test_agent_runs_tool_then_finishes() -> Result<()> {
        let mut agent = AgentBuilder::new()
            .llm(Arc::new(MockLLM))
            .tool(Box::new(DoubleTool))
            .stop_condition(Box::new(SimpleStop))
            .build()?;

        let history = agent
            .run(vec![Message::User("do stuff".to_string())])
            .await?;

        assert_eq!(history.len(), 4);

        assert!(matches!(&history[0], Message::User(content) if content == "do stuff"));
        assert!(matches!(&history[1], Message::Assistant(_, tool_calls) if tool_calls.len() == 1));
        assert!(matches!(&history[2], Message::Tool { result, .. } if result == "2 * 123 = 246"));
        assert!(
            matches!(&history[3], Message::Assistant(content, tool_calls) if content == "completed" && tool_calls.is_empty())
        );

        Ok(())
    }

    struct NeverFinishes;

    #[async_trait]
    impl LLM for NeverFinishes {
        async fn completion<'a>(
            &self,
            _request: CompletionRequest<'a>,
        ) -> Result<CompletionResponse> {
            Ok(CompletionResponse {
                content: "one more lookup".to_string(),
                tool_calls: vec![ToolCall {
                    id: "call".to_string(),
                    name: "double".to_string(),
                    args: "{\"arg\":1}".to_string(),
                }],
            })
        }
    }

    #[tokio::test]
    async fn test_agent_stops_at_step_limit() -> Result<()> {
        let mut agent = AgentBuilder::new()
            .llm(Arc::new(NeverFinishes))
            .tool(Box::new(DoubleTool))
            .stop_condition(Box::new(SimpleStop))
            .max_steps(3)
            .build()?;

        let history = agent
            .run(vec![Message::User("loop forever".to_string())])
            .await?;

        let assistant_turns = history
            .iter()
            .filter(|message| matches!(message, Message::Assistant(_, _)))
            .count();
        assert_eq!(assistant_turns, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_tool_is_reported_to_the_model() -> Result<()> {
        struct WrongTool;

        #[async_trait]
        impl LLM for WrongTool {
            async fn completion<'a>(
                &self,
                request: CompletionRequest<'a>,
            ) -> Result<CompletionResponse> {
                match request.messages.last() {
                    Some(Message::Tool { .. }) => Ok(CompletionResponse {
                        content: "completed".to_string(),
                        tool_calls: vec![],
                    }),
                    _ => Ok(CompletionResponse {
                        content: String::new(),
                        tool_calls: vec![ToolCall {
                            id: "call1".to_string(),
                            name: "no_such_tool".to_string(),
                            args: "{}".to_string(),
                        }],
                    }),
                }
            }
        }

        let mut agent = AgentBuilder::new()
            .llm(Arc::new(WrongTool))
            .tool(Box::new(DoubleTool))
            .stop_condition(Box::new(SimpleStop))
            .build()?;

        let history = agent.run(vec![Message::User("go".to_string())]).await?;

        assert!(history.iter().any(|message| matches!(
            message,
            Message::Tool { result, .. } if result == "tool no_such_tool does not exist"
        )));

        Ok(())
    }
}
