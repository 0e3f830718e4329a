use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, warn};

use opsbot_core::{
    domain::{ChatId, UserId},
    messaging::types::IncomingText,
};

use crate::router::AppState;

pub async fn handle_text(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let incoming = incoming_text(msg.chat.id.0, user.id.0, user.full_name(), text);
    debug!(
        chat_id = incoming.chat_id.0,
        user_id = incoming.user_id.0,
        "text message"
    );

    let replies = state.router.handle(&incoming).await;
    for reply in replies {
        if let Err(e) = state.messenger.send_text(incoming.chat_id, &reply).await {
            warn!(chat_id = incoming.chat_id.0, error = %e, "failed to send reply");
        }
    }

    Ok(())
}

fn incoming_text(chat_id: i64, user_id: u64, full_name: String, text: &str) -> IncomingText {
    IncomingText {
        chat_id: ChatId(chat_id),
        user_id: UserId(user_id as i64),
        full_name,
        text: text.to_string(),
    }
}
