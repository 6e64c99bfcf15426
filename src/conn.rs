use std::time::Duration;

use async_tungstenite::tokio::ConnectStream;
use async_tungstenite::tungstenite::Message as WsMessage;
use async_tungstenite::WebSocketStream;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use chromeaudit_cdp::MethodCall;

use crate::error::CdpError;

#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: Option<String>,
}

type WsStream = WebSocketStream<ConnectStream>;

/// The single websocket to the browser: HTTP discovery, then one
/// bidirectional connection every command and event flows through.
///
/// The write half is guarded by its own mutex so any task can send a
/// command concurrently; only the receive loop reads, but the read half is
/// still behind a mutex so `connect`/reconnect can swap it out in place.
pub struct Transport {
    host: String,
    port: u32,
    http: reqwest::Client,
    write: Mutex<SplitSink<WsStream, WsMessage>>,
    read: Mutex<SplitStream<WsStream>>,
}

impl Transport {
    pub async fn connect(host: &str, port: u32) -> Result<Self, CdpError> {
        let http = reqwest::Client::new();
        Self::wait_for_debugger(&http, host, port).await;
        let ws_url = Self::discover_ws_url(&http, host, port).await?;
        let (ws, _) = async_tungstenite::tokio::connect_async(&ws_url).await?;
        let (write, read) = ws.split();
        Ok(Transport {
            host: host.to_string(),
            port,
            http,
            write: Mutex::new(write),
            read: Mutex::new(read),
        })
    }

    async fn wait_for_debugger(http: &reqwest::Client, host: &str, port: u32) {
        let url = format!("http://{host}:{port}/");
        loop {
            match http.head(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => {
                    debug!(%url, "debuggee not reachable yet, retrying in 1s");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }

    async fn discover_ws_url(http: &reqwest::Client, host: &str, port: u32) -> Result<String, CdpError> {
        let url = format!("http://{host}:{port}/json/version");
        let info: VersionInfo = http.get(&url).send().await?.json().await?;
        info.web_socket_debugger_url.ok_or(CdpError::NoDebuggerUrl)
    }

    /// Serializes and sends one command frame.
    pub async fn send(&self, call: &MethodCall) -> Result<(), CdpError> {
        let text = serde_json::to_string(call)?;
        trace!(%text, "send");
        let mut write = self.write.lock().await;
        write.send(WsMessage::Text(text)).await?;
        Ok(())
    }

    /// Awaits the next text frame, reconnecting transparently if the
    /// socket has closed. Binary/ping/pong frames are skipped.
    pub async fn recv(&self) -> Result<serde_json::Value, CdpError> {
        loop {
            let next = {
                let mut read = self.read.lock().await;
                read.next().await
            };
            match next {
                Some(Ok(WsMessage::Text(text))) => {
                    trace!(%text, "recv");
                    return Ok(serde_json::from_str(&text)?);
                }
                Some(Ok(_)) => continue,
                Some(Err(err)) => {
                    warn!(error = %err, "websocket error, reconnecting");
                    self.reconnect().await?;
                }
                None => {
                    warn!("websocket closed, reconnecting");
                    self.reconnect().await?;
                }
            }
        }
    }

    async fn reconnect(&self) -> Result<(), CdpError> {
        Self::wait_for_debugger(&self.http, &self.host, self.port).await;
        let ws_url = Self::discover_ws_url(&self.http, &self.host, self.port).await?;
        let (ws, _) = async_tungstenite::tokio::connect_async(&ws_url).await?;
        let (write, read) = ws.split();
        *self.write.lock().await = write;
        *self.read.lock().await = read;
        Ok(())
    }
}
