use std::sync::Arc;

use crate::{domain::ChatId, messaging::port::MessagingPort};

/// Sends notifications to the configured chat.
///
/// Delivery failures are logged and dropped: a lost message must never stop
/// the poll loop.
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn MessagingPort>,
    chat_id: ChatId,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn MessagingPort>, chat_id: ChatId) -> Self {
        Self { messenger, chat_id }
    }

    /// Returns whether the message was delivered. Callers are free to ignore it.
    pub async fn notify(&self, text: &str) -> bool {
        tracing::debug!(chat_id = self.chat_id.0, "sending message: {text}");
        match self.messenger.send_text(self.chat_id, text).await {
            Ok(()) => {
                tracing::info!(chat_id = self.chat_id.0, "message sent: {text}");
                true
            }
            Err(e) => {
                tracing::error!(chat_id = self.chat_id.0, "failed to send message \"{text}\": {e}");
                false
            }
        }
    }
}
