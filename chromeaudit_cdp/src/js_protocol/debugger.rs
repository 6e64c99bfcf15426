use serde::{Deserialize, Serialize};

use chromeaudit_types::{Command, Event, Method};

use crate::js_protocol::runtime::StackTrace;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptId(String);
impl AsRef<str> for ScriptId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl std::fmt::Display for ScriptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<String> for ScriptId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContextId(i64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnableParams {}
impl EnableParams {
    pub const IDENTIFIER: &'static str = "Debugger.enable";
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
    pub const IDENTIFIER: &'static str = "Debugger.setAsyncCallStackDepth";

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

/// Fired once per compiled script. `stack_trace` carries the synchronous and
/// (if async stacks are enabled) asynchronous call chain that led to the
/// script being spawned, which the frame/script state component flattens
/// into the Script Spawn causal edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventScriptParsed {
    pub script_id: ScriptId,
    pub url: String,
    pub execution_context_id: ExecutionContextId,
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<StackTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_module: Option<bool>,
}
impl Method for EventScriptParsed {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        "Debugger.scriptParsed".into()
    }
}
impl Event for EventScriptParsed {
    fn session_id(&self) -> Option<&str> {
        None
    }
}
