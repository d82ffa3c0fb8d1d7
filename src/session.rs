use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

/// Per-user pending-state tokens.
///
/// A user with no entry (or an empty token) has nothing pending and gets the
/// default main-menu behavior. Handlers for different updates run concurrently,
/// so every access goes through the lock.
#[derive(Default)]
pub struct SessionStore {
    states: Mutex<HashMap<i64, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending token for `user_id`, if any non-empty one is set.
    #[allow(dead_code)]
    pub async fn get(&self, user_id: i64) -> Option<String> {
        let states = self.states.lock().await;
        states.get(&user_id).filter(|s| !s.is_empty()).cloned()
    }

    #[allow(dead_code)]
    pub async fn set(&self, user_id: i64, token: impl Into<String>) {
        let mut states = self.states.lock().await;
        states.insert(user_id, token.into());
    }

    #[allow(dead_code)]
    pub async fn clear(&self, user_id: i64) {
        let mut states = self.states.lock().await;
        states.remove(&user_id);
    }

    /// Remove and return the pending token in one step.
    pub async fn take_pending(&self, user_id: i64) -> Option<String> {
        let mut states = self.states.lock().await;
        states.remove(&user_id).filter(|s| !s.is_empty())
    }

    #[cfg(test)]
    pub async fn contains(&self, user_id: i64) -> bool {
        self.states.lock().await.contains_key(&user_id)
    }
}

/// Chats that talked to the bot since startup; targets of the daily reminder.
#[derive(Default)]
pub struct Audience {
    chats: Mutex<HashSet<i64>>,
}

impl Audience {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time a chat is seen.
    pub async fn record(&self, chat_id: i64) -> bool {
        self.chats.lock().await.insert(chat_id)
    }

    /// Sorted copy of the known chats.
    pub async fn snapshot(&self) -> Vec<i64> {
        let chats = self.chats.lock().await;
        let mut ids: Vec<i64> = chats.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn len(&self) -> usize {
        self.chats.lock().await.len()
    }
}
