use crate::Result;
use crate::callbacks::Callback;
use crate::llm::Message;
use async_trait::async_trait;

/// Emits every new message on the debug channel as the agent works through
/// its loop, so a run can be followed with RUST_LOG=debug.
pub struct TraceLogger {
    seen: usize,
}

impl TraceLogger {
    pub fn new() -> Box<Self> {
        Box::new(Self { seen: 0 })
    }
}

#[async_trait]
impl Callback for TraceLogger {
    async fn call(&mut self, messages: Vec<Message>) -> Result<Vec<Message>> {
        if messages.len() < self.seen {
            // history was rewritten under us, replay from the start
            tracing::debug!("message history rewritten, replaying trace");
            self.seen = 0;
        }

        for message in &messages[self.seen..] {
            tracing::debug!("{}", message);
        }
        self.seen = messages.len();

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::TraceLogger;
    use crate::Result;
    use crate::callbacks::Callback;
    use crate::llm::Message;

    #[tokio::test]
    async fn test_trace_logger_passes_messages_through() -> Result<()> {
        let mut logger = TraceLogger::new();

        let messages = vec![
            Message::User("hello".to_string()),
            Message::Assistant("hi".to_string(), vec![]),
        ];

        let returned = logger.call(messages.clone()).await?;
        assert_eq!(returned.len(), 2);

        // cursor advances, a shrunken history resets it rather than panicking
        let returned = logger.call(vec![Message::User("fresh".to_string())]).await?;
        assert_eq!(returned.len(), 1);

        Ok(())
    }
}
