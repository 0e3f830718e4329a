use async_trait::async_trait;

use crate::{domain::ChatId, Result};

/// Outbound side of the chat transport.
///
/// Replies are plain text; the adapter decides how to deliver them.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
