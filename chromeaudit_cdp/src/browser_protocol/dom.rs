use serde::{Deserialize, Serialize};

use chromeaudit_types::{Command, Method};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EnableParams {}
impl EnableParams {
    pub const IDENTIFIER: &'static str = "DOM.enable";
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
pub struct SetNodeStackTracesEnabledParams {
    pub enable: bool,
}
impl SetNodeStackTracesEnabledParams {
    pub const IDENTIFIER: &'static str = "DOM.setNodeStackTracesEnabled";

    pub fn new(enable: bool) -> Self {
        Self { enable }
    }
}
impl Method for SetNodeStackTracesEnabledParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for SetNodeStackTracesEnabledParams {
    type Response = super::target::EmptyReturns;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FocusParams {}
impl FocusParams {
    pub const IDENTIFIER: &'static str = "DOM.focus";
}
impl Method for FocusParams {
    fn identifier(&self) -> std::borrow::Cow<'static, str> {
        Self::IDENTIFIER.into()
    }
}
impl Command for FocusParams {
    type Response = super::target::EmptyReturns;
}
