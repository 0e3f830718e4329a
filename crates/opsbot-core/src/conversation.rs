//! Multi-step workflows as explicit state machines.
//!
//! Each workflow is a closed set of states. A state consumes one free-text
//! message and yields replies plus either the next state or `None` (terminal).
//! Candidates awaiting confirmation live inside the confirmation state, so they
//! are dropped together with it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    domain::{EmailRecord, PhoneRecord},
    extract::{classify_password, find_emails, find_phones, numbered_list, PasswordStrength},
    remote::{self, RemoteExecutor},
    store::{store_error_reply, Record, Store},
};

pub const EMAIL_PROMPT: &str = "Введите текст для поиска электронных почт: ";
pub const EMAIL_NOT_FOUND: &str = "Эл. почта не найдена";
pub const PHONE_PROMPT: &str = "Введите текст для поиска телефонных номеров: ";
pub const PHONE_NOT_FOUND: &str = "Телефонные номера не найдены";
pub const SAVE_PROMPT: &str = "Хотите сохранить данные в базу данных?/ Введите 'Да/да'";
pub const PASSWORD_PROMPT: &str = "Введите пароль для проверки на сложность: ";
pub const PASSWORD_COMPLEX: &str = "Пароль сложный";
pub const PASSWORD_SIMPLE: &str = "Пароль простой";
pub const APT_MENU: &str = "Введите номер команды, которую хотите вызвать:\n 1. Вывод всех пакетов\n 2. Поиск информации о пакете";
pub const APT_NAME_PROMPT: &str = "Введите название пакета";
pub const APT_INVALID_CHOICE: &str = "Неверная команда";
pub const APT_INVALID_PACKAGE: &str = "Неверное название пакета";

pub const APT_LIST_COMMAND: &str = "dpkg-query -l | head -n 20";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Workflow {
    FindEmail,
    FindPhone,
    VerifyPassword,
    AptList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversationState {
    AwaitingEmailText,
    AwaitingEmailConfirmation { candidates: Vec<String> },
    AwaitingPhoneText,
    AwaitingPhoneConfirmation { candidates: Vec<String> },
    AwaitingPassword,
    AwaitingPackageChoice,
    AwaitingPackageName,
}

impl ConversationState {
    pub fn workflow(&self) -> Workflow {
        match self {
            ConversationState::AwaitingEmailText
            | ConversationState::AwaitingEmailConfirmation { .. } => Workflow::FindEmail,
            ConversationState::AwaitingPhoneText
            | ConversationState::AwaitingPhoneConfirmation { .. } => Workflow::FindPhone,
            ConversationState::AwaitingPassword => Workflow::VerifyPassword,
            ConversationState::AwaitingPackageChoice | ConversationState::AwaitingPackageName => {
                Workflow::AptList
            }
        }
    }
}

/// Outcome of feeding one message to a workflow.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    pub replies: Vec<String>,
    pub next: Option<ConversationState>,
}

impl Step {
    fn go(reply: impl Into<String>, next: ConversationState) -> Self {
        Self {
            replies: vec![reply.into()],
            next: Some(next),
        }
    }

    fn end(replies: Vec<String>) -> Self {
        Self {
            replies,
            next: None,
        }
    }
}

/// `true` for the literal confirmation tokens; nothing else confirms.
pub fn is_confirmation(text: &str) -> bool {
    matches!(text, "да" | "Да" | "+")
}

pub fn package_files_command(package: &str) -> String {
    // try_quote only rejects NUL bytes.
    let cleaned = package.replace('\0', "");
    let quoted = shlex::try_quote(&cleaned)
        .map(|q| q.into_owned())
        .unwrap_or_default();
    format!("dpkg -L {quoted} | head -n 20")
}

pub struct ConversationEngine {
    remote: Arc<dyn RemoteExecutor>,
    store: Arc<dyn Store>,
    /// Masked in error replies only.
    secrets: Vec<String>,
}

impl ConversationEngine {
    pub fn new(
        remote: Arc<dyn RemoteExecutor>,
        store: Arc<dyn Store>,
        secrets: Vec<String>,
    ) -> Self {
        Self {
            remote,
            store,
            secrets,
        }
    }

    /// Entry point: prompt and initial state.
    pub fn start(&self, workflow: Workflow) -> Step {
        match workflow {
            Workflow::FindEmail => Step::go(EMAIL_PROMPT, ConversationState::AwaitingEmailText),
            Workflow::FindPhone => Step::go(PHONE_PROMPT, ConversationState::AwaitingPhoneText),
            Workflow::VerifyPassword => {
                Step::go(PASSWORD_PROMPT, ConversationState::AwaitingPassword)
            }
            Workflow::AptList => Step::go(APT_MENU, ConversationState::AwaitingPackageChoice),
        }
    }

    /// Transition table.
    pub async fn advance(&self, state: ConversationState, text: &str) -> Step {
        debug!(workflow = ?state.workflow(), "advancing conversation");
        match state {
            ConversationState::AwaitingEmailText => found_or_end(
                find_emails(text),
                EMAIL_NOT_FOUND,
                |candidates| ConversationState::AwaitingEmailConfirmation { candidates },
            ),
            ConversationState::AwaitingPhoneText => found_or_end(
                find_phones(text),
                PHONE_NOT_FOUND,
                |candidates| ConversationState::AwaitingPhoneConfirmation { candidates },
            ),
            ConversationState::AwaitingEmailConfirmation { candidates } => {
                let records = candidates
                    .into_iter()
                    .map(|address| Record::Email(EmailRecord { address }));
                self.save_if_confirmed(text, records).await
            }
            ConversationState::AwaitingPhoneConfirmation { candidates } => {
                let records = candidates
                    .into_iter()
                    .map(|number| Record::Phone(PhoneRecord { number }));
                self.save_if_confirmed(text, records).await
            }
            ConversationState::AwaitingPassword => {
                let reply = match classify_password(text) {
                    PasswordStrength::Complex => PASSWORD_COMPLEX,
                    PasswordStrength::Simple => PASSWORD_SIMPLE,
                };
                Step::end(vec![reply.to_string()])
            }
            ConversationState::AwaitingPackageChoice => match text {
                "1" => {
                    let out = remote::run_for_reply(
                        self.remote.as_ref(),
                        APT_LIST_COMMAND,
                        &self.secrets,
                    )
                    .await;
                    Step::end(vec![out])
                }
                "2" => Step::go(APT_NAME_PROMPT, ConversationState::AwaitingPackageName),
                _ => Step::end(vec![APT_INVALID_CHOICE.to_string()]),
            },
            ConversationState::AwaitingPackageName => {
                let command = package_files_command(text);
                match remote::run_text(self.remote.as_ref(), &command).await {
                    Ok(out) => Step::end(vec![out]),
                    Err(e) => {
                        warn!(package = text, error = %e, "package lookup failed");
                        Step::end(vec![APT_INVALID_PACKAGE.to_string()])
                    }
                }
            }
        }
    }

    async fn save_if_confirmed(
        &self,
        text: &str,
        records: impl Iterator<Item = Record>,
    ) -> Step {
        if !is_confirmation(text) {
            return Step::end(Vec::new());
        }

        let mut replies = Vec::new();
        for record in records {
            match self.store.insert(&record).await {
                Ok(()) => {
                    info!(table = ?record.table(), "record saved");
                    replies.push(saved_reply(&record));
                }
                Err(e) => {
                    warn!(table = ?record.table(), error = %e, "record not saved");
                    replies.push(format!(
                        "Не удалось сохранить {}: {}",
                        record.value(),
                        store_error_reply(&e, &self.secrets)
                    ));
                }
            }
        }
        Step::end(replies)
    }
}

fn found_or_end(
    candidates: Vec<String>,
    not_found: &str,
    confirm: impl FnOnce(Vec<String>) -> ConversationState,
) -> Step {
    if candidates.is_empty() {
        return Step::end(vec![not_found.to_string()]);
    }
    Step {
        replies: vec![numbered_list(&candidates), SAVE_PROMPT.to_string()],
        next: Some(confirm(candidates)),
    }
}

fn saved_reply(record: &Record) -> String {
    match record {
        Record::Email(r) => format!("Почта {} сохранена успешно", r.address),
        Record::Phone(r) => format!("Телефон {} сохранен успешно", r.number),
    }
}
