//! In-memory content API
//!
//! Stands in for the real API in tests and offline demos. Sessions map auth
//! tokens to user IDs so writes can stamp the acting user like the server
//! does. Every call is counted, including failed ones.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};

use crate::domain::result::{Error, Result};
use crate::domain::{CommentDraft, RawComment, RawUser};
use crate::ports::CommentTransport;

#[derive(Debug, Default)]
struct Store {
    comments: BTreeMap<i64, RawComment>,
    users: BTreeMap<i64, RawUser>,
    sessions: HashMap<String, i64>,
    next_id: i64,
}

/// Content API backed by in-process maps
#[derive(Debug, Default)]
pub struct MemoryTransport {
    store: Mutex<Store>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

fn now_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comment(self, comment: RawComment) -> Self {
        self.insert_comment(comment);
        self
    }

    pub fn with_user(self, user: RawUser) -> Self {
        self.insert_user(user);
        self
    }

    /// Accept `token` as the session of user `user_id`
    pub fn with_session(self, token: &str, user_id: i64) -> Self {
        self.lock().sessions.insert(token.to_string(), user_id);
        self
    }

    pub fn insert_comment(&self, comment: RawComment) {
        let mut store = self.lock();
        store.next_id = store.next_id.max(comment.id);
        store.comments.insert(comment.id, comment);
    }

    pub fn insert_user(&self, user: RawUser) {
        self.lock().users.insert(user.id, user);
    }

    /// Make every following call fail with a transport error
    pub fn fail_all(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of transport calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn comments(&self) -> Vec<RawComment> {
        self.lock().comments.values().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        // A panic while holding the lock leaves plain data behind; keep going
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin_call(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::transport("simulated connection failure"));
        }
        Ok(())
    }

    fn session_user(store: &Store, auth_token: &str) -> Result<i64> {
        store
            .sessions
            .get(auth_token)
            .copied()
            .ok_or_else(|| Error::transport("HTTP 401: invalid auth token"))
    }
}

#[async_trait]
impl CommentTransport for MemoryTransport {
    async fn get_comment_by_id(&self, id: i64) -> Result<Option<RawComment>> {
        self.begin_call()?;
        Ok(self.lock().comments.get(&id).cloned())
    }

    async fn put_comment(
        &self,
        id: i64,
        comment: &RawComment,
        auth_token: &str,
    ) -> Result<RawComment> {
        self.begin_call()?;
        let mut store = self.lock();
        let user_id = Self::session_user(&store, auth_token)?;

        let stored = store
            .comments
            .get_mut(&id)
            .ok_or_else(|| Error::transport(format!("HTTP 404: no comment {}", id)))?;

        stored.content = comment.content.clone();
        stored.deleted = comment.deleted;
        stored.edit_user_id = user_id;
        stored.edit_date = now_string();
        Ok(stored.clone())
    }

    async fn post_comment(&self, draft: &CommentDraft, auth_token: &str) -> Result<RawComment> {
        self.begin_call()?;
        let mut store = self.lock();
        let user_id = Self::session_user(&store, auth_token)?;

        store.next_id += 1;
        let now = now_string();
        let comment = RawComment {
            parent_id: draft.parent_id,
            content: draft.content.clone(),
            create_date: now.clone(),
            edit_date: now,
            create_user_id: user_id,
            edit_user_id: user_id,
            deleted: false,
            id: store.next_id,
        };
        store.comments.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<RawUser>> {
        self.begin_call()?;
        let store = self.lock();
        Ok(ids
            .iter()
            .filter_map(|id| store.users.get(id).cloned())
            .collect())
    }
}
