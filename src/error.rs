use std::io;

use async_tungstenite::tungstenite;
use thiserror::Error;

/// Errors surfaced while talking to the browser over the CDP websocket.
#[derive(Debug, Error)]
pub enum CdpError {
    #[error("{0}")]
    Ws(#[from] tungstenite::Error),
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Chrome(#[from] chromeaudit_cdp::Error),
    #[error("no websocket debugger url in /json/version response")]
    NoDebuggerUrl,
    #[error("reply for command {0} arrived with no matching pending entry")]
    UnmatchedReply(usize),
}

/// Errors raised while assembling a [`crate::config::Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("config file {path} is not valid YAML: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("port {0} is out of range (must be 1..=65535)")]
    InvalidPort(u32),
    #[error("log directory {0} could not be created")]
    LogDir(String),
    #[error("remote logging is enabled but no remote host was given")]
    MissingRemoteHost,
    #[error("handler for method {0} is already registered")]
    DuplicateHandler(&'static str),
    #[error("audit event {0} is already registered")]
    DuplicateEvent(&'static str),
}

/// Errors raised while delivering an audit line to its local file or remote
/// endpoint.
#[derive(Debug, Error)]
pub enum LogSinkError {
    #[error("could not open audit log file {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("could not write to audit log file: {0}")]
    Write(#[source] io::Error),
    #[error("remote delivery failed: {0}")]
    Remote(#[from] reqwest::Error),
}

/// Top-level error returned from `main`, unifying the three subsystem error
/// types behind one `Display` so the binary can report a single message and
/// exit non-zero.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Cdp(#[from] CdpError),
    #[error("{0}")]
    LogSink(#[from] LogSinkError),
}
