use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    conversation::{ConversationState, Workflow},
    domain::UserId,
};

/// Per-user conversation record. `None` means no active workflow.
#[derive(Debug, Default)]
pub struct Session {
    state: Option<ConversationState>,
}

impl Session {
    pub fn workflow(&self) -> Option<Workflow> {
        self.state.as_ref().map(ConversationState::workflow)
    }

    pub fn state(&self) -> Option<&ConversationState> {
        self.state.as_ref()
    }

    /// Take the current state out, leaving the session idle.
    pub fn take(&mut self) -> Option<ConversationState> {
        self.state.take()
    }

    pub fn set(&mut self, next: Option<ConversationState>) {
        self.state = next;
    }
}

/// Sessions keyed by user, one lock per user.
///
/// Holding the guard returned by [`SessionStore::lock`] serializes every
/// handler for that user; different users never wait on each other beyond the
/// brief map lookup.
///
/// Entries are never evicted: the map grows by one idle `Session` per user
/// who has ever written, which is fine for an operator bot with a handful of
/// users.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<UserId, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub async fn lock(&self, user_id: UserId) -> OwnedMutexGuard<Session> {
        let session = {
            let mut map = self.inner.lock().await;
            map.entry(user_id)
                .or_insert_with(|| Arc::new(Mutex::new(Session::default())))
                .clone()
        };
        session.lock_owned().await
    }

    pub async fn active_workflow(&self, user_id: UserId) -> Option<Workflow> {
        self.lock(user_id).await.workflow()
    }
}
