use crate::response::ResearchResponse;
use agent::Result;
use agent::llm::Message;
use agent::structured;

const SYSTEM_TEMPLATE: &str = include_str!("prompts/direct.md");
const AGENT_TEMPLATE: &str = include_str!("prompts/agent.md");

pub const NO_WEB_RESULTS: &str = "No web results available";
pub const NO_WIKI_RESULTS: &str = "No Wikipedia results available";

/// Builds the system + human message pair for the direct pipeline. An empty
/// tool result is replaced by a placeholder so the model knows the tool ran
/// and came back with nothing.
pub fn build(query: &str, web: Option<&str>, wiki: Option<&str>) -> Result<Vec<Message>> {
    let web = non_empty(web).unwrap_or(NO_WEB_RESULTS);
    let wiki = non_empty(wiki).unwrap_or(NO_WIKI_RESULTS);

    let human = format!(
        "Query: {query}\n\nWeb Search Results:\n{web}\n\nWikipedia Results:\n{wiki}\n\nBased on this information, provide a structured response."
    );

    Ok(vec![
        Message::System(system_prompt(SYSTEM_TEMPLATE)?),
        Message::User(human),
    ])
}

pub fn agent_system() -> Result<String> {
    system_prompt(AGENT_TEMPLATE)
}

fn system_prompt(template: &str) -> Result<String> {
    Ok(template.replace(
        "{format_instructions}",
        &structured::format_instructions::<ResearchResponse>()?,
    ))
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::{NO_WEB_RESULTS, NO_WIKI_RESULTS, agent_system, build};
    use agent::Result;
    use agent::llm::Message;

    fn human_text(messages: &[Message]) -> &str {
        match messages.last() {
            Some(Message::User(content)) => content,
            _ => panic!("expected a trailing user message"),
        }
    }

    #[test]
    fn test_build_interpolates_query_and_tool_output() -> Result<()> {
        let messages = build(
            "history of the Eiffel Tower",
            Some("Eiffel Tower built 1889..."),
            Some("The Eiffel Tower is a wrought-iron tower..."),
        )?;

        assert_eq!(messages.len(), 2);
        assert!(matches!(&messages[0], Message::System(_)));

        let human = human_text(&messages);
        assert!(human.contains("history of the Eiffel Tower"));
        assert!(human.contains("Eiffel Tower built 1889..."));
        assert!(human.contains("The Eiffel Tower is a wrought-iron tower..."));
        Ok(())
    }

    #[test]
    fn test_build_substitutes_placeholder_for_failed_tool() -> Result<()> {
        let messages = build("anything", None, Some("wiki text"))?;

        let human = human_text(&messages);
        assert!(human.contains(NO_WEB_RESULTS));
        assert!(human.contains("wiki text"));
        assert!(!human.contains(NO_WIKI_RESULTS));
        Ok(())
    }

    #[test]
    fn test_build_treats_blank_output_as_missing() -> Result<()> {
        let messages = build("anything", Some("   "), Some(""))?;

        let human = human_text(&messages);
        assert!(human.contains(NO_WEB_RESULTS));
        assert!(human.contains(NO_WIKI_RESULTS));
        Ok(())
    }

    #[test]
    fn test_system_prompts_embed_format_instructions() -> Result<()> {
        let messages = build("anything", None, None)?;
        let Message::System(system) = &messages[0] else {
            panic!("expected a leading system message");
        };

        let agent_prompt = agent_system()?;
        for prompt in [system.as_str(), agent_prompt.as_str()] {
            assert!(prompt.contains("tools_used"));
            assert!(prompt.contains("sources"));
            assert!(!prompt.contains("{format_instructions}"));
        }
        Ok(())
    }
}
