use std::sync::Arc;

use secrecy::ExposeSecret;
use teloxide::{dispatching::Dispatcher, dptree, prelude::*, types::BotCommand};
use tracing::{info, warn};

use opsbot_core::{
    commands::COMMANDS, config::Config, messaging::port::MessagingPort, router::Router,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub router: Arc<Router>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Command menu shown by Telegram clients.
pub fn menu_commands() -> Vec<BotCommand> {
    COMMANDS
        .iter()
        .map(|(name, _, description)| BotCommand::new(*name, *description))
        .collect()
}

pub async fn run_polling(cfg: Arc<Config>, router: Arc<Router>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.expose_secret().clone());

    match bot.get_me().await {
        Ok(me) => info!(username = %me.username(), "opsbot started"),
        Err(e) => warn!(error = %e, "getMe failed"),
    }
    info!(
        host = %cfg.ssh.host,
        port = cfg.ssh.port,
        database = %cfg.postgres.database,
        "targets"
    );

    // Best-effort: the bot works without a registered menu.
    if let Err(e) = bot.set_my_commands(menu_commands()).await {
        warn!(error = %e, "failed to register command menu");
    }

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let state = Arc::new(AppState {
        cfg,
        router,
        messenger,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    info!("opsbot stopped");
    Ok(())
}
