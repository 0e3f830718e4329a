//! Message router: command → handler, otherwise active workflow, otherwise echo.
//!
//! Unknown `/commands` are dropped without touching the session.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    commands::{help_text, parse_command, system_info_menu, Command, RemoteQuery},
    config::Config,
    conversation::ConversationEngine,
    messaging::types::IncomingText,
    remote::{self, RemoteExecutor},
    session::{Session, SessionStore},
    store::{fetch_for_reply, Store},
    utils::truncate_text,
};

pub struct Router {
    remote: Arc<dyn RemoteExecutor>,
    store: Arc<dyn Store>,
    engine: ConversationEngine,
    sessions: SessionStore,
    reply_limit: usize,
    secrets: Vec<String>,
}

impl Router {
    pub fn new(cfg: &Config, remote: Arc<dyn RemoteExecutor>, store: Arc<dyn Store>) -> Self {
        Self::with_limits(remote, store, cfg.telegram_safe_limit, cfg.secrets())
    }

    pub fn with_limits(
        remote: Arc<dyn RemoteExecutor>,
        store: Arc<dyn Store>,
        reply_limit: usize,
        secrets: Vec<String>,
    ) -> Self {
        Self {
            engine: ConversationEngine::new(remote.clone(), store.clone(), secrets.clone()),
            remote,
            store,
            sessions: SessionStore::default(),
            reply_limit,
            secrets,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one message and return the replies to send, in order.
    ///
    /// The user's session stays locked for the whole call.
    pub async fn handle(&self, msg: &IncomingText) -> Vec<String> {
        let mut session = self.sessions.lock(msg.user_id).await;

        let replies = match Command::parse(&msg.text) {
            Some(command) => self.run_command(command, msg, &mut session).await,
            None if parse_command(&msg.text).is_some() => {
                debug!(user_id = msg.user_id.0, "unknown command ignored");
                Vec::new()
            }
            None => match session.take() {
                Some(state) => {
                    let step = self.engine.advance(state, &msg.text).await;
                    if step.next.is_none() {
                        debug!(user_id = msg.user_id.0, "workflow finished");
                    }
                    session.set(step.next);
                    step.replies
                }
                None => vec![msg.text.clone()],
            },
        };

        replies.iter().map(|r| self.finish_reply(r)).collect()
    }

    async fn run_command(
        &self,
        command: Command,
        msg: &IncomingText,
        session: &mut Session,
    ) -> Vec<String> {
        info!(user_id = msg.user_id.0, ?command, "command");
        let reply = match command {
            Command::Begin(workflow) => {
                if let Some(previous) = session.workflow() {
                    debug!(user_id = msg.user_id.0, ?previous, "workflow replaced");
                }
                let step = self.engine.start(workflow);
                session.set(step.next);
                return step.replies;
            }
            Command::Start => format!("Привет {}!", msg.full_name),
            Command::Help => help_text(),
            Command::SystemInfo => system_info_menu(),
            Command::Remote(query) => self.run_remote(query).await,
            Command::List(table) => {
                fetch_for_reply(self.store.as_ref(), table, &self.secrets).await
            }
        };
        vec![reply]
    }

    async fn run_remote(&self, query: RemoteQuery) -> String {
        let command = query.shell_command();
        match remote::run_text(self.remote.as_ref(), command).await {
            Ok(text) => query.shape().apply(&text),
            Err(e) => remote::error_reply(command, &e, &self.secrets),
        }
    }

    fn finish_reply(&self, reply: &str) -> String {
        truncate_text(reply, self.reply_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        conversation::{
            ConversationState, Workflow, APT_INVALID_CHOICE, APT_LIST_COMMAND, EMAIL_PROMPT,
            PASSWORD_PROMPT, SAVE_PROMPT,
        },
        domain::{ChatId, UserId},
        store::Record,
        testing::{FakeRemote, MemoryStore},
    };

    struct Harness {
        router: Router,
        remote: FakeRemote,
        store: MemoryStore,
    }

    fn harness(remote: FakeRemote) -> Harness {
        let store = MemoryStore::default();
        let router = Router::with_limits(
            Arc::new(remote.clone()),
            Arc::new(store.clone()),
            4000,
            vec!["s3cr3t".to_string()],
        );
        Harness {
            router,
            remote,
            store,
        }
    }

    fn text(user: i64, text: &str) -> IncomingText {
        IncomingText {
            chat_id: ChatId(user),
            user_id: UserId(user),
            full_name: "Ivan Petrov".to_string(),
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn echoes_without_active_workflow() {
        let h = harness(FakeRemote::default());
        assert_eq!(h.router.handle(&text(1, "hello")).await, vec!["hello"]);
        assert!(h.remote.commands().is_empty());
    }

    #[tokio::test]
    async fn start_greets_by_name() {
        let h = harness(FakeRemote::default());
        assert_eq!(
            h.router.handle(&text(1, "/start")).await,
            vec!["Привет Ivan Petrov!"]
        );
    }

    #[tokio::test]
    async fn remote_commands_run_their_shell_command() {
        let h = harness(FakeRemote::replying("Linux ops 6.1\n"));
        assert_eq!(
            h.router.handle(&text(1, "/get_uname")).await,
            vec!["Linux ops 6.1"]
        );
        h.router.handle(&text(1, "/get_critical")).await;
        assert_eq!(
            h.remote.commands(),
            vec!["hostnamectl", "journalctl -r -p crit -n 5 | head -n 5"]
        );
    }

    #[tokio::test]
    async fn auths_keeps_first_ten_lines() {
        let out = (1..=30).map(|i| format!("user{i}")).collect::<Vec<_>>().join("\n");
        let h = harness(FakeRemote::replying(&out));
        let replies = h.router.handle(&text(1, "/get_auths")).await;
        assert_eq!(replies[0].lines().count(), 10);
        assert!(replies[0].ends_with("user10"));
    }

    #[tokio::test]
    async fn repl_logs_keep_the_tail() {
        let out = format!("{}{}", "x".repeat(5000), "END");
        let h = harness(FakeRemote::replying(&out));
        let replies = h.router.handle(&text(1, "/get_repl_logs")).await;
        assert_eq!(replies[0].chars().count(), 4000);
        assert!(replies[0].ends_with("END"));
    }

    #[tokio::test]
    async fn unreachable_host_is_a_reply_with_secrets_redacted() {
        let remote = FakeRemote::failing(crate::errors::Error::RemoteConnection(
            "auth failed for password s3cr3t".into(),
        ));
        let h = harness(remote);
        let replies = h.router.handle(&text(1, "/get_df")).await;
        assert_eq!(replies, vec!["Ошибка подключения к SSH: auth failed for password ***"]);
    }

    #[tokio::test]
    async fn long_replies_are_truncated() {
        let h = harness(FakeRemote::replying(&"y".repeat(9000)));
        let replies = h.router.handle(&text(1, "/get_ps")).await;
        assert_eq!(replies[0].chars().count(), 4000);
        assert!(replies[0].ends_with("..."));
    }

    #[tokio::test]
    async fn email_workflow_end_to_end() {
        let h = harness(FakeRemote::default());

        assert_eq!(h.router.handle(&text(1, "/find_email")).await, vec![EMAIL_PROMPT]);
        assert_eq!(
            h.router.sessions().active_workflow(UserId(1)).await,
            Some(Workflow::FindEmail)
        );

        let replies = h
            .router
            .handle(&text(1, "contacts: ops@corp.ru, dev@corp.ru"))
            .await;
        assert_eq!(replies, vec!["1. ops@corp.ru\n2. dev@corp.ru\n", SAVE_PROMPT]);

        let replies = h.router.handle(&text(1, "да")).await;
        assert_eq!(
            replies,
            vec![
                "Почта ops@corp.ru сохранена успешно",
                "Почта dev@corp.ru сохранена успешно",
            ]
        );
        assert_eq!(h.store.inserts().len(), 2);
        assert_eq!(h.router.sessions().active_workflow(UserId(1)).await, None);

        // Terminal input again is just echoed; nothing more is saved.
        assert_eq!(h.router.handle(&text(1, "да")).await, vec!["да"]);
        assert_eq!(h.store.inserts().len(), 2);

        assert_eq!(
            h.router.handle(&text(1, "/get_emails")).await,
            vec!["1. ops@corp.ru\n2. dev@corp.ru\n"]
        );
    }

    #[tokio::test]
    async fn declined_confirmation_saves_nothing_and_ends() {
        let h = harness(FakeRemote::default());
        h.router.handle(&text(1, "/find_phone_number")).await;
        h.router.handle(&text(1, "+7 (912) 345-67-89")).await;

        assert!(h.router.handle(&text(1, "нет")).await.is_empty());
        assert!(h.store.inserts().is_empty());
        assert_eq!(h.router.sessions().active_workflow(UserId(1)).await, None);
    }

    #[tokio::test]
    async fn not_found_ends_the_workflow() {
        let h = harness(FakeRemote::default());
        h.router.handle(&text(1, "/find_phone_number")).await;
        h.router.handle(&text(1, "no digits")).await;
        assert_eq!(h.router.sessions().active_workflow(UserId(1)).await, None);
        assert!(h.store.inserts().is_empty());
    }

    #[tokio::test]
    async fn entry_point_replaces_active_workflow() {
        let h = harness(FakeRemote::default());
        h.router.handle(&text(1, "/find_email")).await;
        h.router.handle(&text(1, "a@b.cd")).await;

        assert_eq!(
            h.router.handle(&text(1, "/verify_password")).await,
            vec![PASSWORD_PROMPT]
        );
        assert_eq!(
            h.router.handle(&text(1, "да")).await,
            vec!["Пароль простой"]
        );
        assert!(h.store.inserts().is_empty());
    }

    #[tokio::test]
    async fn stateless_command_keeps_workflow() {
        let h = harness(FakeRemote::replying("up 3 days"));
        h.router.handle(&text(1, "/verify_password")).await;
        assert_eq!(h.router.handle(&text(1, "/get_uptime")).await, vec!["up 3 days"]);
        assert_eq!(
            h.router.handle(&text(1, "Abc12345!")).await,
            vec!["Пароль сложный"]
        );
    }

    #[tokio::test]
    async fn unknown_command_is_ignored_and_keeps_workflow() {
        let h = harness(FakeRemote::default());
        h.router.handle(&text(1, "/get_apt_list")).await;
        assert!(h.router.handle(&text(1, "/unknown")).await.is_empty());
        assert_eq!(
            h.router.sessions().lock(UserId(1)).await.state(),
            Some(&ConversationState::AwaitingPackageChoice)
        );
        assert_eq!(
            h.router.handle(&text(1, "3")).await,
            vec![APT_INVALID_CHOICE]
        );
        assert!(h.remote.commands().is_empty());
    }

    #[tokio::test]
    async fn unknown_command_without_workflow_is_not_echoed() {
        let h = harness(FakeRemote::default());
        assert!(h.router.handle(&text(1, "/foo bar")).await.is_empty());
        assert_eq!(h.router.sessions().active_workflow(UserId(1)).await, None);
    }

    #[tokio::test]
    async fn user_text_containing_a_secret_is_not_masked() {
        let h = harness(FakeRemote::replying("s3cr3t  1234  0.0 s3cr3t: checkpointer"));
        assert_eq!(
            h.router.handle(&text(1, "connect as s3cr3t@db.local")).await,
            vec!["connect as s3cr3t@db.local"]
        );
        assert_eq!(
            h.router.handle(&text(1, "/get_ps")).await,
            vec!["s3cr3t  1234  0.0 s3cr3t: checkpointer"]
        );

        h.router.handle(&text(1, "/find_email")).await;
        let replies = h.router.handle(&text(1, "s3cr3t@db.local")).await;
        assert_eq!(replies, vec!["1. s3cr3t@db.local\n", SAVE_PROMPT]);
        h.router.handle(&text(1, "да")).await;
        assert_eq!(h.store.inserts()[0].value(), "s3cr3t@db.local");
    }

    #[tokio::test]
    async fn workflows_are_isolated_per_user() {
        let h = harness(FakeRemote::replying("pkgs"));
        h.router.handle(&text(1, "/get_apt_list")).await;
        h.router.handle(&text(2, "/find_email")).await;

        assert_eq!(h.router.handle(&text(1, "1")).await, vec!["pkgs"]);
        assert_eq!(h.remote.commands(), vec![APT_LIST_COMMAND]);
        assert_eq!(
            h.router.sessions().active_workflow(UserId(2)).await,
            Some(Workflow::FindEmail)
        );
    }

    #[tokio::test]
    async fn phone_list_renders_saved_rows() {
        let h = harness(FakeRemote::default());
        h.store
            .insert(&Record::Phone(crate::domain::PhoneRecord {
                number: "89123456789".into(),
            }))
            .await
            .unwrap();
        assert_eq!(
            h.router.handle(&text(1, "/get_phone_numbers")).await,
            vec!["1. 89123456789\n"]
        );
        assert_eq!(h.router.handle(&text(1, "/get_emails")).await, vec![""]);
    }
}
