use std::collections::HashMap;

use tokio::sync::Mutex;

use chromeaudit_cdp::browser_protocol::page::{ClientNavigationDisposition, ClientNavigationReason};

use crate::engine::frame::{NavReason, Uid};

#[derive(Debug, Clone)]
pub struct ScheduledEntry {
    pub reason: NavReason,
    pub destination_url: String,
    pub disposition: Option<ClientNavigationDisposition>,
}

pub fn normalize_reason(reason: ClientNavigationReason) -> NavReason {
    match reason {
        ClientNavigationReason::ScriptInitiated => NavReason::Script,
        ClientNavigationReason::MetaTagRefresh => NavReason::Html,
        ClientNavigationReason::HttpHeaderRefresh => NavReason::Http,
        ClientNavigationReason::AnchorClick => NavReason::User,
        _ => NavReason::Other,
    }
}

/// Remembers scheduled/requested navigations keyed by the frame's current
/// UID, consumed by the `frameNavigated` handler to classify the cause of
/// the eventual navigation. Held behind its own lock, disjoint from the
/// frame-state lock, per the concurrency model.
#[derive(Default)]
pub struct ScheduledNavigations {
    inner: Mutex<HashMap<Uid, ScheduledEntry>>,
}

impl ScheduledNavigations {
    pub fn new() -> Self {
        Self::default()
    }

    /// First-wins: if an entry already exists for this UID it is left
    /// untouched.
    pub async fn schedule(
        &self,
        uid: Uid,
        reason: NavReason,
        destination_url: String,
        disposition: Option<ClientNavigationDisposition>,
    ) {
        let mut inner = self.inner.lock().await;
        inner.entry(uid).or_insert(ScheduledEntry {
            reason,
            destination_url,
            disposition,
        });
    }

    /// Pops the entry for `uid`, if any. The `frameNavigated` handler
    /// defaults to `User` (or `Other` for an urgent-created frame) when
    /// nothing was scheduled.
    pub async fn take(&self, uid: &Uid) -> Option<ScheduledEntry> {
        self.inner.lock().await.remove(uid)
    }

    pub async fn remove_for_uid(&self, uid: &Uid) {
        self.inner.lock().await.remove(uid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromeaudit_cdp::browser_protocol::page::ClientNavigationReason;

    #[test]
    fn reason_mapping() {
        assert_eq!(
            normalize_reason(ClientNavigationReason::ScriptInitiated),
            NavReason::Script
        );
        assert_eq!(
            normalize_reason(ClientNavigationReason::MetaTagRefresh),
            NavReason::Html
        );
        assert_eq!(
            normalize_reason(ClientNavigationReason::HttpHeaderRefresh),
            NavReason::Http
        );
        assert_eq!(
            normalize_reason(ClientNavigationReason::AnchorClick),
            NavReason::User
        );
        assert_eq!(
            normalize_reason(ClientNavigationReason::Reload),
            NavReason::Other
        );
    }

    #[tokio::test]
    async fn first_wins() {
        let sched = ScheduledNavigations::new();
        let uid = Uid::for_test(1);
        sched
            .schedule(uid, NavReason::Script, "https://a/".into(), None)
            .await;
        sched
            .schedule(uid, NavReason::Http, "https://b/".into(), None)
            .await;
        let entry = sched.take(&uid).await.unwrap();
        assert_eq!(entry.reason, NavReason::Script);
        assert_eq!(entry.destination_url, "https://a/");
    }
}
