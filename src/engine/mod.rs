pub mod cmd;
pub mod frame;
pub mod nav;
pub mod session;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tracing::{debug, error, warn};

use chromeaudit_cdp::events::{CdpEvent, CdpEventMessage};
use chromeaudit_cdp::{Message, Response};

use crate::conn::Transport;
use crate::error::{CdpError, ConfigError};
use crate::handlers;
use crate::sink::AuditSink;

use cmd::CommandRouter;
use frame::FrameState;
use nav::ScheduledNavigations;
use session::SessionRegistry;

/// Every CDP method this collector registers a handler for. Checked for
/// duplicates at startup; the dispatcher itself never needs this table
/// since the match in `Engine::handle_event` is exhaustive over
/// `CdpEvent`, but the check documents and enforces the "one handler per
/// method" contract the same way an explicit registry would.
const HANDLED_METHODS: &[&str] = &[
    "Target.targetCreated",
    "Target.targetDestroyed",
    "Target.attachedToTarget",
    "Target.targetInfoChanged",
    "Page.frameAttached",
    "Page.frameNavigated",
    "Page.frameRequestedNavigation",
    "Page.frameScheduledNavigation",
    "Page.downloadWillBegin",
    "Page.fileChooserOpened",
    "Browser.downloadWillBegin",
    "Debugger.scriptParsed",
    "Network.requestWillBeSent",
    "Network.responseReceived",
];

/// The stable, positive audit event ids. Index order is arbitrary but fixed
/// at compile time, matching invariant 1 (ids are positive and stable for a
/// given event name).
const EVENT_NAMES: &[&str] = &[
    "[Main Frame Created]",
    "[Sub-Frame Created]",
    "[Frame Info Update to]",
    "[Frame Attach to Frame]",
    "[Script Create Sub-Frame]",
    "[Frame Execute Script]",
    "[Script Spawn Script]",
    "[Script Call Script]",
    "[Frame Navigate by User]",
    "[Frame Navigate by Script]",
    "[Frame Navigate by HTTP]",
    "[Frame Navigate by HTML]",
    "[Frame Navigate by Other]",
    "[File Download Start]",
    "[File Chooser Opened]",
    "[Target Destroyed]",
];

/// Enable/disable table for every emittable audit event name: a signed
/// integer per name, positive when enabled and negated when disabled.
pub struct EventTable {
    ids: HashMap<&'static str, AtomicI64>,
}

impl EventTable {
    fn new() -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        let mut ids = HashMap::new();
        for (i, name) in EVENT_NAMES.iter().enumerate() {
            if !seen.insert(*name) {
                return Err(ConfigError::DuplicateEvent(name));
            }
            ids.insert(*name, AtomicI64::new(i as i64 + 1));
        }
        Ok(EventTable { ids })
    }

    /// The signed id for `name`: positive if enabled, negative if disabled.
    /// Returns `None` for a name this collector never registered.
    pub fn signed_id(&self, name: &str) -> Option<i64> {
        self.ids.get(name).map(|a| a.load(Ordering::SeqCst))
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.signed_id(name).map(|id| id > 0).unwrap_or(false)
    }

    pub fn enable(&self, name: &str) {
        if let Some(a) = self.ids.get(name) {
            let v = a.load(Ordering::SeqCst);
            a.store(v.abs(), Ordering::SeqCst);
        }
    }

    pub fn disable(&self, name: &str) {
        if let Some(a) = self.ids.get(name) {
            let v = a.load(Ordering::SeqCst);
            a.store(-v.abs(), Ordering::SeqCst);
        }
    }

    pub fn active(&self) -> Vec<(&'static str, i64)> {
        EVENT_NAMES
            .iter()
            .filter_map(|name| {
                let id = self.signed_id(name)?;
                (id > 0).then_some((*name, id))
            })
            .collect()
    }

    pub fn all(&self) -> Vec<(&'static str, i64)> {
        EVENT_NAMES
            .iter()
            .filter_map(|name| self.signed_id(name).map(|id| (*name, id)))
            .collect()
    }
}

/// The audit engine: session/target manager, per-frame/script state,
/// navigation correlator, and dispatcher, bundled behind `Arc` so every
/// dispatched handler invocation can run as its own task.
pub struct Engine {
    pub transport: Arc<Transport>,
    pub cmd: CommandRouter,
    pub sessions: SessionRegistry,
    pub frames: FrameState,
    pub nav: ScheduledNavigations,
    pub sink: AuditSink,
    pub events: EventTable,
}

impl Engine {
    pub fn new(transport: Arc<Transport>, sink: AuditSink) -> Result<Arc<Engine>, ConfigError> {
        let mut seen = HashSet::new();
        for method in HANDLED_METHODS {
            if !seen.insert(*method) {
                return Err(ConfigError::DuplicateHandler(method));
            }
        }

        Ok(Arc::new(Engine {
            cmd: CommandRouter::new(transport.clone()),
            transport,
            sessions: SessionRegistry::new(),
            frames: FrameState::new(),
            nav: ScheduledNavigations::new(),
            sink,
            events: EventTable::new()?,
        }))
    }

    /// Emits an audit event if its name is currently enabled. `payload`
    /// should already be a JSON-serializable snapshot, never a live
    /// reference into engine state.
    pub async fn emit(&self, name: &'static str, payload: serde_json::Value) {
        let Some(id) = self.events.signed_id(name) else {
            warn!(name, "emit called for an unregistered event name");
            return;
        };
        if id < 0 {
            return;
        }
        debug!(id, name, "audit event synthesized");
        if let Err(err) = self.sink.log(id, name, payload).await {
            error!(error = %err, name, "failed to write audit event");
        }
    }

    /// Pulls messages from the transport forever, dispatching each to the
    /// command router (replies) or a freshly spawned handler task (events).
    /// The receive loop itself never awaits a handler, so one slow command
    /// reply never delays the next inbound frame.
    pub async fn run(self: Arc<Self>) -> Result<(), CdpError> {
        loop {
            let raw = self.transport.recv().await?;
            let message: Message<CdpEventMessage> = match serde_json::from_value(raw) {
                Ok(m) => m,
                Err(err) => {
                    warn!(error = %err, "malformed message, dropped");
                    continue;
                }
            };

            match message {
                Message::Response(response) => {
                    self.dispatch_response(response).await;
                }
                Message::Event(event_message) => {
                    let engine = self.clone();
                    tokio::spawn(async move {
                        engine.dispatch_event(event_message).await;
                    });
                }
            }
        }
    }

    async fn dispatch_response(&self, response: Response) {
        self.cmd.complete(response).await;
    }

    async fn dispatch_event(&self, message: CdpEventMessage) {
        let session_id = message.session_id;
        let result = match message.event {
            CdpEvent::TargetCreated(e) => handlers::target::on_target_created(self, e).await,
            CdpEvent::TargetDestroyed(e) => handlers::target::on_target_destroyed(self, e).await,
            CdpEvent::AttachedToTarget(e) => {
                handlers::target::on_attached_to_target(self, e).await
            }
            CdpEvent::TargetInfoChanged(e) => {
                handlers::target::on_target_info_changed(self, session_id, e).await
            }
            CdpEvent::DetachedFromTarget(_) => Ok(()),
            CdpEvent::FrameAttached(e) => handlers::frame::on_frame_attached(self, e).await,
            CdpEvent::FrameNavigated(e) => handlers::navigation::on_frame_navigated(self, e).await,
            CdpEvent::FrameRequestedNavigation(e) => {
                handlers::navigation::on_frame_requested_navigation(self, e).await
            }
            CdpEvent::FrameScheduledNavigation(e) => {
                handlers::navigation::on_frame_scheduled_navigation(self, e).await
            }
            CdpEvent::DocumentOpened(_) => Ok(()),
            CdpEvent::FileChooserOpened(e) => handlers::misc::on_file_chooser_opened(self, e).await,
            CdpEvent::PageDownloadWillBegin(e) => {
                handlers::misc::on_page_download_will_begin(self, e).await
            }
            CdpEvent::BrowserDownloadWillBegin(e) => {
                handlers::misc::on_browser_download_will_begin(self, e).await
            }
            CdpEvent::ScriptParsed(e) => {
                handlers::script::on_script_parsed(self, session_id, e).await
            }
            CdpEvent::RequestWillBeSent(e) => {
                handlers::network::on_request_will_be_sent(self, e).await
            }
            CdpEvent::ResponseReceived(e) => {
                handlers::network::on_response_received(self, e).await
            }
            CdpEvent::Unknown(_) => Ok(()),
        };

        if let Err(err) = result {
            warn!(error = %err, "handler failed");
        }
    }
}
