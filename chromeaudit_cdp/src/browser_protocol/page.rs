use serde::{Deserialize, Serialize};

use chromeaudit_types::{Command, Method};

use crate::browser_protocol::network::LoaderId;
use crate::js_protocol::runtime::StackTrace;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameId(String);
impl AsRef<str> for FrameId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<String> for FrameId {
    fn from(s: String) -> Self {
        FrameId(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: FrameId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<FrameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader_id: Option<LoaderId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_fragment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unreachable_url: Option<String>,
}

/// Matches the `ClientNavigationReason` enum of the real protocol, normalized
/// further by the navigation correlator (see the engine's `nav` module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientNavigationReason {
    FormSubmissionGet,
    FormSubmissionPost,
    HttpHeaderRefresh,
    ScriptInitiated,
    MetaTagRefresh,
    PageBlockInterstitial,
    Reload,
    AnchorClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClientNavigationDisposition {
    CurrentTab,
    NewTab,
    NewWindow,
    Download,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigationType {
    Navigation,
    BackForwardCacheRestore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FileChooserMode {
    SelectSingle,
    SelectMultiple,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnableParams {}
impl EnableParams {
    pub const IDENTIFIER: &'static str = "Page.enable";
}
impl Method for EnableParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for EnableParams {
    type Response = super::target::EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetLifecycleEventsEnabledParams {
    pub enabled: bool,
}
impl SetLifecycleEventsEnabledParams {
    pub const IDENTIFIER: &'static str = "Page.setLifecycleEventsEnabled";

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}
impl Method for SetLifecycleEventsEnabledParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for SetLifecycleEventsEnabledParams {
    type Response = super::target::EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetInterceptFileChooserDialogParams {
    pub enabled: bool,
}
impl SetInterceptFileChooserDialogParams {
    pub const IDENTIFIER: &'static str = "Page.setInterceptFileChooserDialog";

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}
impl Method for SetInterceptFileChooserDialogParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for SetInterceptFileChooserDialogParams {
    type Response = super::target::EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameAttached {
    pub frame_id: FrameId,
    pub parent_frame_id: FrameId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackTrace>,
}
impl Method for EventFrameAttached {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Page.frameAttached".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameNavigated {
    pub frame: Frame,
    #[serde(rename = "type")]
    pub navigation_type: NavigationType,
}
impl Method for EventFrameNavigated {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Page.frameNavigated".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameRequestedNavigation {
    pub frame_id: FrameId,
    pub reason: ClientNavigationReason,
    pub url: String,
    pub disposition: ClientNavigationDisposition,
}
impl Method for EventFrameRequestedNavigation {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Page.frameRequestedNavigation".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFrameScheduledNavigation {
    pub frame_id: FrameId,
    pub delay: f64,
    pub reason: ClientNavigationReason,
    pub url: String,
}
impl Method for EventFrameScheduledNavigation {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Page.frameScheduledNavigation".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDownloadWillBegin {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<FrameId>,
    pub guid: String,
    pub url: String,
    pub suggested_filename: String,
}
impl Method for EventDownloadWillBegin {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Page.downloadWillBegin".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFileChooserOpened {
    pub frame_id: FrameId,
    pub mode: FileChooserMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_node_id: Option<i64>,
}
impl Method for EventFileChooserOpened {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Page.fileChooserOpened".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDocumentOpened {
    pub frame: Frame,
}
impl Method for EventDocumentOpened {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Page.documentOpened".into()
    }
}
