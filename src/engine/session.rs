use std::collections::HashMap;

use tokio::sync::Mutex;

use chromeaudit_cdp::browser_protocol::target::{SessionId, TargetId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Attached(SessionId),
}

/// Maps `targetId -> SessionState`. At most one entry per target; `Pending`
/// exists only between issuing an attach command and its acknowledging
/// event, and the `Pending -> Attached` transition happens at most once per
/// attach lifecycle (a target may cycle through pending/attached/absent
/// again after a destroy).
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<TargetId, SessionState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `Pending` only if no entry exists yet. Returns `true` if this
    /// call actually inserted it (the caller should only then issue the
    /// attach command — duplicate `targetCreated` notifications are
    /// suppressed this way).
    pub async fn begin_attach(&self, target_id: &TargetId) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.contains_key(target_id) {
            false
        } else {
            inner.insert(target_id.clone(), SessionState::Pending);
            true
        }
    }

    pub async fn complete_attach(&self, target_id: &TargetId, session_id: SessionId) {
        let mut inner = self.inner.lock().await;
        inner.insert(target_id.clone(), SessionState::Attached(session_id));
    }

    pub async fn release_target(&self, target_id: &TargetId) -> Option<SessionId> {
        let mut inner = self.inner.lock().await;
        match inner.remove(target_id) {
            Some(SessionState::Attached(session_id)) => Some(session_id),
            _ => None,
        }
    }

    pub async fn state(&self, target_id: &TargetId) -> Option<SessionState> {
        self.inner.lock().await.get(target_id).cloned()
    }

    pub async fn session_id(&self, target_id: &TargetId) -> Option<SessionId> {
        match self.state(target_id).await {
            Some(SessionState::Attached(session_id)) => Some(session_id),
            _ => None,
        }
    }

    /// Linear scan in the other direction; sessions are few so this is
    /// cheaper than maintaining a second index.
    pub async fn target_for_session(&self, session_id: &SessionId) -> Option<TargetId> {
        let inner = self.inner.lock().await;
        inner.iter().find_map(|(target_id, state)| match state {
            SessionState::Attached(sid) if sid == session_id => Some(target_id.clone()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn begin_attach_is_idempotent() {
        let registry = SessionRegistry::new();
        let target: TargetId = "T1".to_string().into();
        assert!(registry.begin_attach(&target).await);
        assert!(!registry.begin_attach(&target).await);
    }

    #[tokio::test]
    async fn at_most_one_entry_per_target() {
        let registry = SessionRegistry::new();
        let target: TargetId = "T1".to_string().into();
        registry.begin_attach(&target).await;
        registry
            .complete_attach(&target, "S1".to_string().into())
            .await;
        assert_eq!(
            registry.state(&target).await,
            Some(SessionState::Attached("S1".to_string().into()))
        );
        assert_eq!(registry.release_target(&target).await, Some("S1".to_string().into()));
        assert_eq!(registry.state(&target).await, None);
    }

    #[tokio::test]
    async fn reverse_lookup_by_session() {
        let registry = SessionRegistry::new();
        let target: TargetId = "T1".to_string().into();
        registry.begin_attach(&target).await;
        registry
            .complete_attach(&target, "S1".to_string().into())
            .await;
        assert_eq!(
            registry.target_for_session(&"S1".to_string().into()).await,
            Some(target)
        );
    }
}
