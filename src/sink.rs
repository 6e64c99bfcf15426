use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

use crate::config::Config;
use crate::error::LogSinkError;

#[derive(Debug, Serialize)]
struct StrictEnvelope {
    #[serde(rename = "eventNumber")]
    event_number: i64,
    #[serde(rename = "eventName")]
    event_name: String,
    #[serde(rename = "eventData")]
    event_data: Value,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct RemoteFields {
    hostname: String,
    logtag: String,
}

#[derive(Debug, Serialize)]
struct RemoteEnvelope {
    #[serde(flatten)]
    envelope: StrictEnvelope,
    fields: RemoteFields,
}

/// Accepts synthesized audit events and delivers them to the local log file
/// and, if configured, a remote HTTP endpoint.
///
/// Pausing keeps the file open but skips writes, matching the "disabling
/// logging flushes but keeps the file open" behavior expected of the
/// collaborator console's `log pause`/`log start` commands.
pub struct AuditSink {
    config: Mutex<Config>,
    file: Mutex<Option<tokio::fs::File>>,
    http: reqwest::Client,
    paused: AtomicBool,
}

impl AuditSink {
    pub async fn open(config: Config) -> Result<Self, LogSinkError> {
        let file = Self::open_file(&config).await?;
        Ok(AuditSink {
            config: Mutex::new(config),
            file: Mutex::new(Some(file)),
            http: reqwest::Client::new(),
            paused: AtomicBool::new(false),
        })
    }

    async fn open_file(config: &Config) -> Result<tokio::fs::File, LogSinkError> {
        let path = config.log_file_path();
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|source| LogSinkError::Open {
                path: path.display().to_string(),
                source,
            })
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    /// Re-opens the log file under the sink's current config, closing the
    /// previous stream, for the console's `log config set`/`log config cd`.
    pub async fn reconfigure(&self, new_config: Config) -> Result<(), LogSinkError> {
        let file = Self::open_file(&new_config).await?;
        *self.file.lock().await = Some(file);
        *self.config.lock().await = new_config;
        Ok(())
    }

    pub async fn current_config(&self) -> Config {
        self.config.lock().await.clone()
    }

    /// `origin` is the `"<id> - <eventName>"` pair; `payload` is the raw
    /// event body before any strict-mode wrapping.
    pub async fn log(
        &self,
        id: i64,
        event_name: &str,
        payload: Value,
    ) -> Result<(), LogSinkError> {
        if self.paused.load(Ordering::SeqCst) {
            return Ok(());
        }

        let timestamp = Utc::now().to_rfc3339();
        let config = self.config.lock().await.clone();

        let line = if config.strict_log {
            let envelope = StrictEnvelope {
                event_number: id,
                event_name: event_name.to_string(),
                event_data: payload.clone(),
                timestamp: timestamp.clone(),
            };
            serde_json::to_string(&envelope).map_err(|e| LogSinkError::Write(e.into()))?
        } else {
            payload.to_string()
        };

        let full_line = format!("{timestamp} - {id} - {event_name} - {line}\n");
        {
            let mut file = self.file.lock().await;
            if let Some(f) = file.as_mut() {
                f.write_all(full_line.as_bytes())
                    .await
                    .map_err(LogSinkError::Write)?;
            }
        }

        if let Some(remote) = &config.remote {
            let envelope = RemoteEnvelope {
                envelope: StrictEnvelope {
                    event_number: id,
                    event_name: event_name.to_string(),
                    event_data: payload,
                    timestamp,
                },
                fields: RemoteFields {
                    hostname: config.hostname.clone(),
                    logtag: config.tag.clone(),
                },
            };
            let scheme = if remote.use_ssl { "https" } else { &remote.scheme };
            let url = format!("{scheme}://{}:{}", remote.host, remote.port);
            if let Err(err) = self.http.post(&url).json(&envelope).send().await {
                warn!(error = %err, "remote audit delivery failed, continuing");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &std::path::Path) -> Config {
        Config {
            log_dir: dir.to_path_buf(),
            username: "u".to_string(),
            tag: "t".to_string(),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn writes_plain_line() {
        let dir = std::env::temp_dir().join(format!("chromeaudit_sink_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let sink = AuditSink::open(test_config(&dir)).await.unwrap();
        sink.log(1, "[Main Frame Created]", serde_json::json!({"a": 1}))
            .await
            .unwrap();
        let content = tokio::fs::read_to_string(dir.join("u-t.log")).await.unwrap();
        assert!(content.contains("[Main Frame Created]"));
    }

    #[tokio::test]
    async fn pause_suppresses_writes() {
        let dir = std::env::temp_dir().join(format!("chromeaudit_sink2_{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let sink = AuditSink::open(test_config(&dir)).await.unwrap();
        sink.pause();
        sink.log(1, "[Target Destroyed]", serde_json::json!({}))
            .await
            .unwrap();
        let content = tokio::fs::read_to_string(dir.join("u-t.log")).await.unwrap();
        assert!(content.is_empty());
    }
}
