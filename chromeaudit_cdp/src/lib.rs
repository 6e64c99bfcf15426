//! Typed bindings for the slice of the Chrome DevTools Protocol this
//! collector speaks.
//!
//! Unlike a full protocol binding generated from the upstream `.pdl` files,
//! this crate is hand-written and only covers the `Target`, `Page`,
//! `Network`, `Browser`, `DOM`, `Debugger`, and `Runtime` members the
//! collector actually sends or consumes. Anything else is deserialized into
//! [`events::CdpEvent::Unknown`] and left to the dispatcher to ignore.

pub mod browser_protocol;
pub mod events;
pub mod js_protocol;

pub use chromeaudit_types::{CallId, Command, Error, Event, Message, Method, MethodCall, Response};
