//! Chat command table.

use crate::{conversation::Workflow, store::Table};

/// Diagnostic commands that map to a fixed shell command on the remote host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemoteQuery {
    Release,
    Uname,
    Uptime,
    Df,
    Free,
    Mpstat,
    W,
    Auths,
    Critical,
    Ps,
    Ss,
    Services,
    ReplLogs,
}

/// How remote output is cut down before it becomes a reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputShape {
    Full,
    HeadLines(usize),
    TailChars(usize),
}

impl OutputShape {
    pub fn apply(self, text: &str) -> String {
        match self {
            OutputShape::Full => text.to_string(),
            OutputShape::HeadLines(n) => text.split('\n').take(n).collect::<Vec<_>>().join("\n"),
            OutputShape::TailChars(n) => {
                let len = text.chars().count();
                text.chars().skip(len.saturating_sub(n)).collect()
            }
        }
    }
}

impl RemoteQuery {
    pub fn shell_command(self) -> &'static str {
        match self {
            RemoteQuery::Release => "cat /etc/os-release",
            RemoteQuery::Uname => "hostnamectl",
            RemoteQuery::Uptime => "uptime",
            RemoteQuery::Df => "df",
            RemoteQuery::Free => "free",
            RemoteQuery::Mpstat => "mpstat",
            RemoteQuery::W => "w",
            RemoteQuery::Auths => "last",
            RemoteQuery::Critical => "journalctl -r -p crit -n 5 | head -n 5",
            RemoteQuery::Ps => "ps | head -n 20",
            RemoteQuery::Ss => "ss | head -n 20",
            RemoteQuery::Services => "systemctl | head -n 20",
            RemoteQuery::ReplLogs => "docker logs db | grep replication",
        }
    }

    pub fn shape(self) -> OutputShape {
        match self {
            RemoteQuery::Auths => OutputShape::HeadLines(10),
            RemoteQuery::ReplLogs => OutputShape::TailChars(4000),
            _ => OutputShape::Full,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    SystemInfo,
    Remote(RemoteQuery),
    List(Table),
    Begin(Workflow),
}

/// Every recognized command with its menu description, in display order.
pub const COMMANDS: &[(&str, Command, &str)] = &[
    ("start", Command::Start, "Приветствие"),
    ("help", Command::Help, "Список команд"),
    ("get_system_info", Command::SystemInfo, "Меню информации о системе"),
    ("get_release", Command::Remote(RemoteQuery::Release), "Информация о релизе"),
    ("get_uname", Command::Remote(RemoteQuery::Uname), "Информация о системе"),
    ("get_uptime", Command::Remote(RemoteQuery::Uptime), "Время работы"),
    ("get_df", Command::Remote(RemoteQuery::Df), "Состояние файловой системы"),
    ("get_free", Command::Remote(RemoteQuery::Free), "Состояние оперативной памяти"),
    ("get_mpstat", Command::Remote(RemoteQuery::Mpstat), "Производительность системы"),
    ("get_w", Command::Remote(RemoteQuery::W), "Работающие пользователи"),
    ("get_auths", Command::Remote(RemoteQuery::Auths), "Последние 10 входов"),
    ("get_critical", Command::Remote(RemoteQuery::Critical), "Последние 5 критических событий"),
    ("get_ps", Command::Remote(RemoteQuery::Ps), "Запущенные процессы"),
    ("get_ss", Command::Remote(RemoteQuery::Ss), "Используемые порты"),
    ("get_services", Command::Remote(RemoteQuery::Services), "Запущенные сервисы"),
    ("get_repl_logs", Command::Remote(RemoteQuery::ReplLogs), "Логи репликации"),
    ("get_emails", Command::List(Table::Emails), "Сохраненные эл. почты"),
    ("get_phone_numbers", Command::List(Table::Phones), "Сохраненные телефоны"),
    ("find_email", Command::Begin(Workflow::FindEmail), "Поиск эл. почт в тексте"),
    ("find_phone_number", Command::Begin(Workflow::FindPhone), "Поиск телефонов в тексте"),
    ("verify_password", Command::Begin(Workflow::VerifyPassword), "Проверка сложности пароля"),
    ("get_apt_list", Command::Begin(Workflow::AptList), "Установленные пакеты"),
];

/// Split `/cmd@botname args` into a lowercase command name and the rest.
///
/// Returns `None` unless `/` is the very first character and a name follows it.
pub fn parse_command(text: &str) -> Option<(String, String)> {
    if !text.starts_with('/') {
        return None;
    }

    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();
    if cmd.is_empty() {
        return None;
    }

    Some((cmd, rest))
}

impl Command {
    /// Recognize a command token; unknown `/tokens` are not commands.
    pub fn parse(text: &str) -> Option<Command> {
        let (name, _args) = parse_command(text)?;
        COMMANDS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, cmd, _)| *cmd)
    }
}

pub fn system_info_menu() -> String {
    let mut out = String::from("Выберите информацию о системе:\n");
    for (name, cmd, desc) in COMMANDS {
        let listed = matches!(cmd, Command::Remote(q) if *q != RemoteQuery::ReplLogs)
            || *cmd == Command::Begin(Workflow::AptList);
        if listed {
            out.push_str(&format!("/{name} - {desc}\n"));
        }
    }
    out
}

pub fn help_text() -> String {
    let mut out = String::from("Доступные команды:\n");
    for (name, _, desc) in COMMANDS {
        out.push_str(&format!("/{name} - {desc}\n"));
    }
    out
}
