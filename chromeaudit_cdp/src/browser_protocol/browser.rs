use serde::{Deserialize, Serialize};

use chromeaudit_types::{Command, Method};

use super::target::BrowserContextId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DownloadBehavior {
    Deny,
    Allow,
    AllowAndName,
    Default,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetDownloadBehaviorParams {
    pub behavior: DownloadBehavior,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<BrowserContextId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events_enabled: Option<bool>,
}
impl SetDownloadBehaviorParams {
    pub const IDENTIFIER: &'static str = "Browser.setDownloadBehavior";

    pub fn allow_with_events() -> Self {
        Self {
            behavior: DownloadBehavior::Allow,
            browser_context_id: None,
            events_enabled: Some(true),
        }
    }
}
impl Method for SetDownloadBehaviorParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for SetDownloadBehaviorParams {
    type Response = super::target::EmptyReturns;
}

/// CDP exposes download notifications under both `Browser.downloadWillBegin`
/// and `Page.downloadWillBegin`; both are routed to the same download
/// handler (see `engine::handlers::download`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDownloadWillBegin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<super::page::FrameId>,
    pub guid: String,
    pub url: String,
    pub suggested_filename: String,
}
impl Method for EventDownloadWillBegin {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Browser.downloadWillBegin".into()
    }
}
