use serde::{Deserialize, Serialize};

use chromeaudit_types::{Command, Method};

use crate::browser_protocol::page::FrameId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(String);
impl AsRef<str> for TargetId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<String> for TargetId {
    fn from(s: String) -> Self {
        TargetId(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);
impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<String> for SessionId {
    fn from(s: String) -> Self {
        SessionId(s)
    }
}
impl From<SessionId> for String {
    fn from(s: SessionId) -> Self {
        s.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrowserContextId(String);

/// The only target types the engine attaches to; everything else
/// (worker, shared_worker, ...) is left alone.
pub const ATTACHABLE_TYPES: &[&str] = &["page", "iframe", "browser", "script"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub target_id: TargetId,
    #[serde(rename = "type")]
    pub target_type: String,
    pub title: String,
    pub url: String,
    pub attached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener_id: Option<TargetId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_access_opener: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener_frame_id: Option<FrameId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser_context_id: Option<BrowserContextId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AttachToBrowserTargetParams {}
impl AttachToBrowserTargetParams {
    pub const IDENTIFIER: &'static str = "Target.attachToBrowserTarget";
}
impl Method for AttachToBrowserTargetParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToBrowserTargetReturns {
    pub session_id: SessionId,
}
impl Command for AttachToBrowserTargetParams {
    type Response = AttachToBrowserTargetReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetParams {
    pub target_id: TargetId,
    pub flatten: bool,
}
impl AttachToTargetParams {
    pub const IDENTIFIER: &'static str = "Target.attachToTarget";

    pub fn new(target_id: TargetId) -> Self {
        Self {
            target_id,
            flatten: true,
        }
    }
}
impl Method for AttachToTargetParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachToTargetReturns {
    pub session_id: SessionId,
}
impl Command for AttachToTargetParams {
    type Response = AttachToTargetReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAutoAttachParams {
    pub auto_attach: bool,
    pub wait_for_debugger_on_start: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flatten: Option<bool>,
}
impl SetAutoAttachParams {
    pub const IDENTIFIER: &'static str = "Target.setAutoAttach";

    pub fn disabled_flatten() -> Self {
        Self {
            auto_attach: false,
            wait_for_debugger_on_start: false,
            flatten: Some(true),
        }
    }
}
impl Method for SetAutoAttachParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmptyReturns {}
impl Command for SetAutoAttachParams {
    type Response = EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDiscoverTargetsParams {
    pub discover: bool,
}
impl SetDiscoverTargetsParams {
    pub const IDENTIFIER: &'static str = "Target.setDiscoverTargets";

    pub fn new(discover: bool) -> Self {
        Self { discover }
    }
}
impl Method for SetDiscoverTargetsParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for SetDiscoverTargetsParams {
    type Response = EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetCreated {
    pub target_info: TargetInfo,
}
impl Method for EventTargetCreated {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Target.targetCreated".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetDestroyed {
    pub target_id: TargetId,
}
impl Method for EventTargetDestroyed {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Target.targetDestroyed".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAttachedToTarget {
    pub session_id: SessionId,
    pub target_info: TargetInfo,
    pub waiting_for_debugger: bool,
}
impl Method for EventAttachedToTarget {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Target.attachedToTarget".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTargetInfoChanged {
    pub target_info: TargetInfo,
}
impl Method for EventTargetInfoChanged {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Target.targetInfoChanged".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetachedFromTarget {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<TargetId>,
}
impl Method for EventDetachedFromTarget {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Target.detachedFromTarget".into()
    }
}
