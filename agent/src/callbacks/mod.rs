use crate::Result;
use crate::llm::Message;
use async_trait::async_trait;

mod trace;
pub use trace::TraceLogger;

#[async_trait]
pub trait Callback {
    async fn call(&mut self, messages: Vec<Message>) -> Result<Vec<Message>>;
}
