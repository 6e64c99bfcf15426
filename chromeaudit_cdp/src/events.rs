//! Aggregates every typed event this tool cares about into one enum so the
//! dispatcher can match on a single value instead of re-inspecting the wire
//! `method` string at every handler call site.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::browser_protocol::{browser, network, page, target};
use crate::js_protocol::debugger;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum CdpEvent {
    TargetCreated(target::EventTargetCreated),
    TargetDestroyed(target::EventTargetDestroyed),
    AttachedToTarget(target::EventAttachedToTarget),
    TargetInfoChanged(target::EventTargetInfoChanged),
    DetachedFromTarget(target::EventDetachedFromTarget),
    FrameAttached(page::EventFrameAttached),
    FrameNavigated(page::EventFrameNavigated),
    FrameRequestedNavigation(page::EventFrameRequestedNavigation),
    FrameScheduledNavigation(page::EventFrameScheduledNavigation),
    DocumentOpened(page::EventDocumentOpened),
    FileChooserOpened(page::EventFileChooserOpened),
    PageDownloadWillBegin(page::EventDownloadWillBegin),
    BrowserDownloadWillBegin(browser::EventDownloadWillBegin),
    ScriptParsed(debugger::EventScriptParsed),
    RequestWillBeSent(network::EventRequestWillBeSent),
    ResponseReceived(network::EventResponseReceived),
    /// Anything else the browser sends that this tool has no typed handler
    /// for. Kept rather than dropped at the transport layer so a future
    /// handler can be registered without touching the dispatch site.
    Unknown(serde_json::Value),
}

impl CdpEvent {
    /// Parses `params` according to the wire method name. Mirrors the
    /// `method`-keyed `match` a hand-rolled CDP client does before it has
    /// generated bindings for every domain.
    pub fn from_method_and_params(
        method: &str,
        params: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        Ok(match method {
            "Target.targetCreated" => CdpEvent::TargetCreated(serde_json::from_value(params)?),
            "Target.targetDestroyed" => CdpEvent::TargetDestroyed(serde_json::from_value(params)?),
            "Target.attachedToTarget" => {
                CdpEvent::AttachedToTarget(serde_json::from_value(params)?)
            }
            "Target.targetInfoChanged" => {
                CdpEvent::TargetInfoChanged(serde_json::from_value(params)?)
            }
            "Target.detachedFromTarget" => {
                CdpEvent::DetachedFromTarget(serde_json::from_value(params)?)
            }
            "Page.frameAttached" => CdpEvent::FrameAttached(serde_json::from_value(params)?),
            "Page.frameNavigated" => CdpEvent::FrameNavigated(serde_json::from_value(params)?),
            "Page.frameRequestedNavigation" => {
                CdpEvent::FrameRequestedNavigation(serde_json::from_value(params)?)
            }
            "Page.frameScheduledNavigation" => {
                CdpEvent::FrameScheduledNavigation(serde_json::from_value(params)?)
            }
            "Page.documentOpened" => CdpEvent::DocumentOpened(serde_json::from_value(params)?),
            "Page.fileChooserOpened" => {
                CdpEvent::FileChooserOpened(serde_json::from_value(params)?)
            }
            "Page.downloadWillBegin" => {
                CdpEvent::PageDownloadWillBegin(serde_json::from_value(params)?)
            }
            "Browser.downloadWillBegin" => {
                CdpEvent::BrowserDownloadWillBegin(serde_json::from_value(params)?)
            }
            "Debugger.scriptParsed" => CdpEvent::ScriptParsed(serde_json::from_value(params)?),
            "Network.requestWillBeSent" => {
                CdpEvent::RequestWillBeSent(serde_json::from_value(params)?)
            }
            "Network.responseReceived" => {
                CdpEvent::ResponseReceived(serde_json::from_value(params)?)
            }
            _ => CdpEvent::Unknown(params),
        })
    }

    /// The wire method name this event was (or would be) delivered under,
    /// used for tracing and for the audit sink's `origin` field.
    pub fn method_name(&self) -> &'static str {
        match self {
            CdpEvent::TargetCreated(_) => "Target.targetCreated",
            CdpEvent::TargetDestroyed(_) => "Target.targetDestroyed",
            CdpEvent::AttachedToTarget(_) => "Target.attachedToTarget",
            CdpEvent::TargetInfoChanged(_) => "Target.targetInfoChanged",
            CdpEvent::DetachedFromTarget(_) => "Target.detachedFromTarget",
            CdpEvent::FrameAttached(_) => "Page.frameAttached",
            CdpEvent::FrameNavigated(_) => "Page.frameNavigated",
            CdpEvent::FrameRequestedNavigation(_) => "Page.frameRequestedNavigation",
            CdpEvent::FrameScheduledNavigation(_) => "Page.frameScheduledNavigation",
            CdpEvent::DocumentOpened(_) => "Page.documentOpened",
            CdpEvent::FileChooserOpened(_) => "Page.fileChooserOpened",
            CdpEvent::PageDownloadWillBegin(_) => "Page.downloadWillBegin",
            CdpEvent::BrowserDownloadWillBegin(_) => "Browser.downloadWillBegin",
            CdpEvent::ScriptParsed(_) => "Debugger.scriptParsed",
            CdpEvent::RequestWillBeSent(_) => "Network.requestWillBeSent",
            CdpEvent::ResponseReceived(_) => "Network.responseReceived",
            CdpEvent::Unknown(_) => "Unknown",
        }
    }
}

/// A parsed inbound event together with the flattened session id CDP attaches
/// to every message once `Target.attachToTarget` is called with `flatten`.
#[derive(Debug, Clone)]
pub struct CdpEventMessage {
    pub session_id: Option<target::SessionId>,
    pub event: CdpEvent,
}

impl<'de> Deserialize<'de> for CdpEventMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            method: String,
            #[serde(rename = "sessionId", default)]
            session_id: Option<String>,
            #[serde(default)]
            params: serde_json::Value,
        }

        let raw = Raw::deserialize(deserializer)?;
        let event = CdpEvent::from_method_and_params(&raw.method, raw.params)
            .map_err(de::Error::custom)?;
        Ok(CdpEventMessage {
            session_id: raw.session_id.map(target::SessionId::from),
            event,
        })
    }
}
