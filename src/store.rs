//! Per-user conversation state.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

/// Conversation state for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationState {
    /// Profile name captured from the first event that carried one.
    /// Once set, never overwritten.
    pub display_name: Option<String>,
    /// True once the welcome sequence has been sent. Never reset.
    pub welcomed: bool,
}

impl ConversationState {
    /// Set the display name unless one is already present. Empty names
    /// count as absent.
    pub fn set_name_if_absent(&mut self, name: &str) {
        if self.display_name.is_none() && !name.is_empty() {
            self.display_name = Some(name.to_string());
        }
    }
}

/// In-process store of per-user conversation state.
///
/// Each user's state sits behind its own lock; holding the entry lock
/// across the handling of one event serializes overlapping deliveries
/// for that user without blocking anyone else. Entries are created
/// lazily on first access and live for the process lifetime — there is
/// no eviction.
pub struct ConversationStore {
    users: Mutex<HashMap<String, Arc<Mutex<ConversationState>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the entry for `id`, creating the default state on first access.
    pub async fn entry(&self, id: &str) -> Arc<Mutex<ConversationState>> {
        let mut users = self.users.lock().await;
        if let Some(entry) = users.get(id) {
            return Arc::clone(entry);
        }
        let entry = Arc::new(Mutex::new(ConversationState::default()));
        users.insert(id.to_string(), Arc::clone(&entry));
        debug!(user = %id, users = users.len(), "created conversation state");
        entry
    }

    /// Snapshot of the state for `id`, creating it if absent.
    pub async fn get(&self, id: &str) -> ConversationState {
        let entry = self.entry(id).await;
        let state = entry.lock().await;
        state.clone()
    }

    /// Whether a state row exists for `id`. Does not create one.
    pub async fn contains(&self, id: &str) -> bool {
        self.users.lock().await.contains_key(id)
    }

    /// Number of users with state rows.
    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.lock().await.is_empty()
    }

    /// Record the user's profile name if none is stored yet.
    pub async fn set_name_if_absent(&self, id: &str, name: &str) {
        let entry = self.entry(id).await;
        let mut state = entry.lock().await;
        state.set_name_if_absent(name);
    }

    /// Mark the welcome sequence as sent. One-way.
    pub async fn mark_welcomed(&self, id: &str) {
        let entry = self.entry(id).await;
        let mut state = entry.lock().await;
        state.welcomed = true;
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}
