use serde::{Deserialize, Serialize};

use chromeaudit_types::{Command, Method};

use crate::browser_protocol::page::FrameId;
use crate::js_protocol::runtime::StackTrace;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);
impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoaderId(String);
impl AsRef<str> for LoaderId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub headers: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub url: String,
    pub status: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    #[serde(default)]
    pub headers: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InitiatorType {
    Parser,
    Script,
    Preload,
    SignedExchange,
    Preflight,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Initiator {
    #[serde(rename = "type")]
    pub initiator_type: InitiatorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<StackTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnableParams {}
impl EnableParams {
    pub const IDENTIFIER: &'static str = "Network.enable";
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
pub struct SetAttachDebugStackParams {
    pub enabled: bool,
}
impl SetAttachDebugStackParams {
    pub const IDENTIFIER: &'static str = "Network.setAttachDebugStack";

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}
impl Method for SetAttachDebugStackParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for SetAttachDebugStackParams {
    type Response = super::target::EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequestWillBeSent {
    pub request_id: RequestId,
    pub loader_id: LoaderId,
    pub document_url: String,
    pub request: Request,
    pub timestamp: f64,
    pub initiator: Initiator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_response: Option<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<FrameId>,
}
impl Method for EventRequestWillBeSent {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Network.requestWillBeSent".into()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponseReceived {
    pub request_id: RequestId,
    pub loader_id: LoaderId,
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub response: Response,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<FrameId>,
}
impl Method for EventResponseReceived {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Network.responseReceived".into()
    }
}
