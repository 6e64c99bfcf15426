use serde::{Deserialize, Serialize};

use chromeaudit_types::{Command, Method};

use crate::js_protocol::debugger::ScriptId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackTraceId {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debugger_id: Option<String>,
}

/// One frame of a JS call stack, as attached to `Debugger.scriptParsed` and
/// `Network.requestWillBeSent`'s initiator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFrame {
    pub function_name: String,
    pub script_id: ScriptId,
    pub url: String,
    pub line_number: i64,
    pub column_number: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub call_frames: Vec<CallFrame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Box<StackTrace>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<StackTraceId>,
}

impl StackTrace {
    /// Flattens the `parent` chain into one ordered (innermost-first)
    /// sequence of call frames, so callers don't have to walk `parent`
    /// themselves at every use site.
    pub fn flatten(&self) -> Vec<&CallFrame> {
        let mut out = Vec::new();
        let mut current = Some(self);
        while let Some(trace) = current {
            out.extend(trace.call_frames.iter());
            current = trace.parent.as_deref();
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnableParams {}
impl EnableParams {
    pub const IDENTIFIER: &'static str = "Runtime.enable";
}
impl Method for EnableParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for EnableParams {
    type Response = super::super::browser_protocol::target::EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAsyncCallStackDepthParams {
    pub max_depth: i64,
}
impl SetAsyncCallStackDepthParams {
    pub const IDENTIFIER: &'static str = "Runtime.setAsyncCallStackDepth";

    pub fn new(max_depth: i64) -> Self {
        Self { max_depth }
    }
}
impl Method for SetAsyncCallStackDepthParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for SetAsyncCallStackDepthParams {
    type Response = super::super::browser_protocol::target::EmptyReturns;
}
