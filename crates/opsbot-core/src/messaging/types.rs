use crate::domain::{ChatId, UserId};

/// Incoming text message, stripped of transport specifics.
#[derive(Clone, Debug)]
pub struct IncomingText {
    pub chat_id: ChatId,
    pub user_id: UserId,
    /// Display name used in greetings.
    pub full_name: String,
    pub text: String,
}
