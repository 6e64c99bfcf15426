use std::collections::HashMap;

use fnv::FnvHashMap;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, warn};

use chromeaudit_cdp::{CallId, Command, MethodCall, Response};

use crate::conn::Transport;
use crate::error::CdpError;

/// One outstanding command: resolved by the dispatcher when its reply
/// arrives, keyed by `CallId`. Replaces a busy-wait-with-yield loop with a
/// one-shot completion primitive so waiting callers don't burn scheduler
/// turns.
struct Pending {
    reply: oneshot::Sender<Response>,
}

/// Correlates outgoing commands with their replies. `next_id` is
/// monotonically increasing and strictly greater than any id ever issued;
/// if no command has ever been sent the first id is 1.
pub struct CommandRouter {
    transport: std::sync::Arc<Transport>,
    next_id: Mutex<usize>,
    pending: Mutex<FnvHashMap<usize, Pending>>,
}

impl CommandRouter {
    pub fn new(transport: std::sync::Arc<Transport>) -> Self {
        CommandRouter {
            transport,
            next_id: Mutex::new(1),
            pending: Mutex::new(HashMap::default()),
        }
    }

    /// Sends `cmd` on `session_id` and awaits its typed reply.
    pub async fn send<C: Command>(
        &self,
        cmd: &C,
        session_id: Option<String>,
    ) -> Result<C::Response, CdpError> {
        let (tx, rx) = oneshot::channel();
        let id = {
            let mut next = self.next_id.lock().await;
            let id = *next;
            *next += 1;
            id
        };

        self.pending
            .lock()
            .await
            .insert(id, Pending { reply: tx });

        let call = MethodCall {
            id: CallId::new(id),
            session_id,
            method: cmd.identifier(),
            params: serde_json::to_value(cmd)?,
        };
        debug!(id, method = %call.method, "command submitted");
        self.transport.send(&call).await?;

        let response = rx.await.map_err(|_| CdpError::UnmatchedReply(id))?;
        if let Some(err) = response.error {
            return Err(CdpError::Chrome(err));
        }
        let result = response.result.unwrap_or(serde_json::Value::Null);
        Ok(serde_json::from_value(result)?)
    }

    /// Deposits a reply the dispatcher read off the wire into the matching
    /// pending slot. Logs and drops replies with no matching pending id.
    pub async fn complete(&self, response: Response) {
        let id = response.id.value();
        let pending = self.pending.lock().await.remove(&id);
        match pending {
            Some(p) => {
                let _ = p.reply.send(response);
            }
            None => warn!(id, "reply arrived with no matching pending command"),
        }
    }
}
