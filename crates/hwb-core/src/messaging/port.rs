use async_trait::async_trait;

use crate::{domain::ChatId, Result};

/// Messenger port.
///
/// Telegram is the only implementation; the poll loop only ever needs to push
/// plain text into a single chat.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;
}
