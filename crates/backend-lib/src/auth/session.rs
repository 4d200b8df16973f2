// ============================
// crates/backend-lib/src/auth/session.rs
// ============================
//! Session identifier → user identifier mapping.
//!
//! Sessions live until they are destroyed; nothing expires them.
use std::{fmt, sync::Arc};

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use metrics::{counter, gauge};
use tracing::debug;
use uuid::Uuid;

use crate::metrics::{SESSION_ACTIVE, SESSION_CREATED, SESSION_DESTROYED};

/// A live session
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: Uuid,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

// The id is a bearer credential.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Concurrency-safe session store.
///
/// Cloning is cheap and every clone shares the same map, so one instance is
/// built at start-up and handed to whatever needs it.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, Session>>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("live", &self.sessions.len())
            .finish()
    }
}

/// Only the exact spelling handed out by [`SessionStore::create`] is accepted;
/// braced, urn, simple and uppercase forms of the same UUID are not.
fn parse_session_id(session_id: &str) -> Option<Uuid> {
    let key = Uuid::parse_str(session_id).ok()?;
    (key.hyphenated().to_string() == session_id).then_some(key)
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session for `user_id` and return its identifier.
    ///
    /// Returns `None` for an empty user id. One user may hold any number of
    /// sessions at once.
    pub fn create(&self, user_id: &str) -> Option<String> {
        if user_id.is_empty() {
            return None;
        }

        let session = loop {
            // never overwrite a live session on an id clash
            match self.sessions.entry(Uuid::new_v4()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(slot) => {
                    let session = Session {
                        session_id: *slot.key(),
                        user_id: user_id.to_string(),
                        created_at: Utc::now(),
                    };
                    slot.insert(session.clone());
                    break session;
                },
            }
        };

        counter!(SESSION_CREATED).increment(1);
        gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        debug!(user_id = %session.user_id, "session created");

        Some(session.session_id.to_string())
    }

    /// User id owning `session_id`, or `None` if unknown or not a well-formed id
    pub fn lookup(&self, session_id: &str) -> Option<String> {
        self.get(session_id).map(|session| session.user_id)
    }

    /// Full session record for `session_id`
    pub fn get(&self, session_id: &str) -> Option<Session> {
        let key = parse_session_id(session_id)?;
        self.sessions.get(&key).map(|entry| entry.value().clone())
    }

    /// Remove a session. Returns whether it existed.
    pub fn destroy(&self, session_id: &str) -> bool {
        let Some(key) = parse_session_id(session_id) else {
            return false;
        };
        let removed = self.sessions.remove(&key).is_some();
        if removed {
            counter!(SESSION_DESTROYED).increment(1);
            gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        }
        removed
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop every session, e.g. on shutdown
    pub fn clear(&self) {
        self.sessions.clear();
        gauge!(SESSION_ACTIVE).set(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_session_management() {
        let store = SessionStore::new();

        let sid = store.create("user-1").unwrap();
        assert_eq!(store.lookup(&sid).as_deref(), Some("user-1"));

        let session = store.get(&sid).unwrap();
        assert_eq!(session.session_id.to_string(), sid);
        assert_eq!(session.user_id, "user-1");
        assert!(session.created_at <= Utc::now());

        assert!(store.destroy(&sid));
        assert_eq!(store.lookup(&sid), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_rejects_empty_user() {
        let store = SessionStore::new();
        assert_eq!(store.create(""), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_many_sessions_for_one_user() {
        let store = SessionStore::new();
        let ids: Vec<String> = (0..50).map(|_| store.create("user-1").unwrap()).collect();

        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert_eq!(store.len(), ids.len());
        for id in &ids {
            assert_eq!(store.lookup(id).as_deref(), Some("user-1"));
        }

        // destroying one leaves the others alone
        assert!(store.destroy(&ids[0]));
        assert_eq!(store.lookup(&ids[0]), None);
        assert_eq!(store.lookup(&ids[1]).as_deref(), Some("user-1"));
        assert_eq!(store.len(), ids.len() - 1);
    }

    #[test]
    fn test_destroy_unknown_session() {
        let store = SessionStore::new();
        let sid = store.create("user-1").unwrap();

        assert!(!store.destroy(&Uuid::new_v4().to_string()));
        assert!(!store.destroy("not-a-session-id"));
        assert!(!store.destroy(""));
        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup(&sid).as_deref(), Some("user-1"));

        assert!(store.destroy(&sid));
        assert!(!store.destroy(&sid));
    }

    #[test]
    fn test_lookup_malformed_id() {
        let store = SessionStore::new();
        store.create("user-1").unwrap();
        assert_eq!(store.lookup(""), None);
        assert_eq!(store.lookup("'; DROP TABLE sessions; --"), None);
        assert_eq!(store.lookup(&Uuid::new_v4().to_string()), None);
    }

    #[test]
    fn test_only_canonical_id_spelling_matches() {
        let store = SessionStore::new();
        let sid = store.create("user-1").unwrap();
        let key = Uuid::parse_str(&sid).unwrap();

        let aliases = [
            sid.to_uppercase(),
            format!("{{{sid}}}"),
            format!("urn:uuid:{sid}"),
            key.simple().to_string(),
        ];
        for alias in &aliases {
            assert_eq!(store.lookup(alias), None, "{alias}");
            assert!(store.get(alias).is_none());
            assert!(!store.destroy(alias));
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.lookup(&sid).as_deref(), Some("user-1"));
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        let sid = store.create("user-1").unwrap();
        assert_eq!(other.lookup(&sid).as_deref(), Some("user-1"));
        other.clear();
        assert_eq!(store.lookup(&sid), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates() {
        const TASKS: usize = 16;
        const PER_TASK: usize = 250;

        let store = SessionStore::new();
        let handles: Vec<_> = (0..TASKS)
            .map(|t| {
                let store = store.clone();
                tokio::spawn(async move {
                    (0..PER_TASK)
                        .map(|_| store.create(&format!("user-{t}")).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for id in handle.await.unwrap() {
                assert!(all.insert(id));
            }
        }

        assert_eq!(all.len(), TASKS * PER_TASK);
        assert_eq!(store.len(), TASKS * PER_TASK);
    }
}
