//! In-memory session table
//!
//! Process-local, lost on restart. One session id maps to one session.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::entity::user_session::UserSession;

/// Guarded `session_id -> session` map
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: Mutex<HashMap<String, UserSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Entries are plain values, a panic elsewhere cannot leave one half-written
    fn lock(&self) -> MutexGuard<'_, HashMap<String, UserSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a session, replacing any entry with the same id
    pub fn insert(&self, session: UserSession) {
        self.lock().insert(session.session_id.clone(), session);
    }

    pub fn get(&self, session_id: &str) -> Option<UserSession> {
        self.lock().get(session_id).cloned()
    }

    /// Returns whether the session existed
    pub fn remove(&self, session_id: &str) -> bool {
        self.lock().remove(session_id).is_some()
    }

    /// Number of live entries
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_id::UserId;
    use std::sync::Arc;

    #[test]
    fn test_insert_get_remove() {
        let store = MemorySessionStore::new();
        let user_id = UserId::new();
        store.insert(UserSession::new("abc", user_id));

        assert_eq!(store.get("abc").unwrap().user_id, user_id);
        assert!(store.get("xyz").is_none());
        assert!(store.remove("abc"));
        assert!(!store.remove("abc"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_concurrent_inserts_are_all_visible() {
        let store = Arc::new(MemorySessionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..50 {
                        store.insert(UserSession::new(format!("{i}-{j}"), UserId::new()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 400);
    }
}
