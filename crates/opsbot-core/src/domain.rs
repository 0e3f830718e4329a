/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// A confirmed email candidate on its way to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailRecord {
    pub address: String,
}

/// A confirmed phone candidate on its way to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhoneRecord {
    pub number: String,
}
