use crate::Result;
use crate::llm::Message;
use crate::tools::{FunctionalTool, ToolCall, ToolDefinition};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const SEPARATOR: &str = "------------------------------------------------------------";

/// Appends research output to a flat text file, one separator-delimited
/// entry per call. Concurrent runs may interleave entries; that is fine.
pub struct SaveTool {
    path: PathBuf,
}

impl SaveTool {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, content: &str) -> Result<String> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        write!(file, "{}\n{}\n", content.trim_end(), SEPARATOR)?;

        Ok(format!("research output saved to {}", self.path.display()))
    }
}

#[derive(Deserialize, JsonSchema)]
struct SaveArgs {
    content: String,
}

#[async_trait]
impl FunctionalTool for SaveTool {
    fn definition(&self) -> Result<ToolDefinition> {
        ToolDefinition::new::<SaveArgs>(
            "save",
            "append the given text to the research output file",
        )
    }

    async fn invoke(&mut self, call: &ToolCall) -> Result<Message> {
        let args: SaveArgs = call.args()?;
        Ok(Message::Tool {
            id: call.id.clone(),
            name: "save".to_string(),
            result: self.save(&args.content)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{SEPARATOR, SaveTool};
    use crate::Result;

    #[test]
    fn test_save_appends_delimited_entries() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("research_output.txt");
        let tool = SaveTool::new(&path);

        tool.save("Title: first entry")?;
        tool.save("Title: second entry")?;

        let contents = std::fs::read_to_string(&path)?;
        let entries = contents
            .split(SEPARATOR)
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect::<Vec<_>>();

        assert_eq!(entries, vec!["Title: first entry", "Title: second entry"]);
        Ok(())
    }

    #[test]
    fn test_save_reports_path() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.txt");
        let confirmation = SaveTool::new(&path).save("hello")?;

        assert!(confirmation.contains("out.txt"));
        Ok(())
    }
}
