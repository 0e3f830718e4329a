// ============== Reply Helpers ==============

/// Cut `s` to `max_len` characters, marking the cut with "...".
pub fn truncate_text(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let mut out = s
        .chars()
        .take(max_len.saturating_sub(3))
        .collect::<String>();
    out.push_str("...");
    out
}

/// Replace every occurrence of a secret with `***`.
///
/// Remote and store errors are echoed to the chat, and some of them quote the
/// connection parameters.
pub fn redact_secrets(s: &str, secrets: &[String]) -> String {
    let mut out = s.to_string();
    for secret in secrets {
        if secret.is_empty() {
            continue;
        }
        out = out.replace(secret.as_str(), "***");
    }
    out
}
