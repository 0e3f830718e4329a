//! Regex-based extraction and classification over pasted text.
//!
//! Everything here is pure: text in, structured result out.

use std::sync::OnceLock;

use regex::Regex;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

const PASSWORD_SPECIALS: &str = "!@#$%^&*";
const PASSWORD_MIN_LEN: usize = 8;

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+").expect("valid regex")
    })
}

fn phone_re() -> &'static Regex {
    // `+7` or `8`, then one of six layouts:
    //   " (XXX) XXX-XX-XX", "XXXXXXXXXX", "(XXX)XXXXXXX",
    //   " XXX XXX XX XX", " (XXX) XXX XX XX", "-XXX-XXX-XX-XX"
    PHONE_RE.get_or_init(|| {
        Regex::new(concat!(
            r"(?:\+7|8)(?:",
            r" \(\d{3}\) \d{3}-\d{2}-\d{2}",
            r"|\d{10}",
            r"|\(\d{3}\)\d{7}",
            r"| \d{3} \d{3} \d{2} \d{2}",
            r"| \(\d{3}\) \d{3} \d{2} \d{2}",
            r"|-\d{3}-\d{3}-\d{2}-\d{2}",
            r")"
        ))
        .expect("valid regex")
    })
}

/// All email-looking substrings, in order of first occurrence.
pub fn find_emails(text: &str) -> Vec<String> {
    email_re()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// All CIS phone numbers (`+7...` / `8...`) in one of the supported layouts.
pub fn find_phones(text: &str) -> Vec<String> {
    phone_re()
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordStrength {
    Complex,
    Simple,
}

/// Classify a password by the leading run of allowed characters.
///
/// Complex iff that run is at least 8 long and holds a digit, one of
/// `!@#$%^&*`, a lowercase and an uppercase ASCII letter. Characters after the
/// run (spaces, Cyrillic, ...) never count.
pub fn classify_password(text: &str) -> PasswordStrength {
    let run: Vec<char> = text
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || PASSWORD_SPECIALS.contains(*c))
        .collect();

    let complex = run.len() >= PASSWORD_MIN_LEN
        && run.iter().any(|c| c.is_ascii_digit())
        && run.iter().any(|c| PASSWORD_SPECIALS.contains(*c))
        && run.iter().any(|c| c.is_ascii_lowercase())
        && run.iter().any(|c| c.is_ascii_uppercase());

    if complex {
        PasswordStrength::Complex
    } else {
        PasswordStrength::Simple
    }
}

/// Render candidates as a 1-indexed list, one per line.
pub fn numbered_list(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {s}\n", i + 1))
        .collect()
}
