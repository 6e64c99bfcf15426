//! Wire envelope types shared by every CDP domain type in `chromeaudit_cdp`.
//!
//! This mirrors the split between the typed protocol surface and the
//! untyped transport envelope that most CDP clients use: a [`Method`]
//! identifies a domain/method pair like `Target.attachToTarget`, a
//! [`Command`] additionally knows its expected response type, and an
//! [`Event`] is anything the browser can push unsolicited.

use std::borrow::Cow;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Monotonically increasing identifier assigned to every outgoing command.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CallId(usize);

impl CallId {
    pub fn new(id: usize) -> Self {
        CallId(id)
    }

    pub fn value(self) -> usize {
        self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallId({})", self.0)
    }
}

/// A fully addressed request as it goes out on the wire.
#[derive(Serialize, Debug, PartialEq)]
pub struct MethodCall {
    pub id: CallId,
    #[serde(rename = "sessionId", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub method: Cow<'static, str>,
    pub params: serde_json::Value,
}

/// A domain/method identifier, e.g. `DOM.removeNode`.
pub trait Method {
    /// The whole string identifier for this method like: `DOM.removeNode`
    fn identifier(&self) -> Cow<'static, str>;

    /// The name of the domain this method belongs to: `DOM`
    fn domain_name(&self) -> Cow<'static, str> {
        self.split().0
    }

    /// The standalone identifier of the method inside the domain: `removeNode`
    fn method_name(&self) -> Cow<'static, str> {
        self.split().1
    }

    /// Tuple of (`domain_name`, `method_name`)
    fn split(&self) -> (Cow<'static, str>, Cow<'static, str>) {
        match self.identifier() {
            Cow::Borrowed(id) => {
                let mut iter = id.split('.');
                (iter.next().unwrap().into(), iter.next().unwrap().into())
            }
            Cow::Owned(id) => {
                let mut iter = id.split('.');
                (
                    Cow::Owned(iter.next().unwrap().into()),
                    Cow::Owned(iter.next().unwrap().into()),
                )
            }
        }
    }
}

/// A command that can be sent to the browser and that expects a typed
/// response back.
pub trait Command: serde::ser::Serialize + Method {
    type Response: DeserializeOwned + fmt::Debug;
}

/// An event the browser can push without being asked, e.g. `Target.targetCreated`.
pub trait Event: Method + DeserializeOwned {
    fn session_id(&self) -> Option<&str>;
}

/// Untyped response as read straight off the websocket, before the
/// matching [`Command::Response`] is known (the dispatcher only learns the
/// expected type from the [`crate::PendingCommands`]-equivalent at the call
/// site).
#[derive(Deserialize, Debug, Clone)]
pub struct Response {
    pub id: CallId,
    pub result: Option<serde_json::Value>,
    pub error: Option<Error>,
}

/// Either a reply to a command, or an unsolicited event, exactly as they
/// arrive interleaved on the single websocket.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum Message<T> {
    Response(Response),
    Event(T),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("chrome devtools error {code}: {message}")]
pub struct Error {
    pub code: i64,
    pub message: String,
}
