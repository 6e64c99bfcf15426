use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::engine::Engine;

/// Interactive REPL collaborator: resolves whitespace-separated input
/// tokens down a fixed command tree to a leaf action, mutating the engine
/// only through its already-public operations (enable/disable an audit
/// event, pause/resume the sink, reopen the log file).
pub struct Console {
    engine: Arc<Engine>,
    shutdown: mpsc::Sender<()>,
}

impl Console {
    pub fn new(engine: Arc<Engine>, shutdown: mpsc::Sender<()>) -> Self {
        Console { engine, shutdown }
    }

    pub async fn run(self) {
        let stdin = tokio::io::stdin();
        let mut lines = BufReader::new(stdin).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let tokens: Vec<&str> = line.split_whitespace().collect();
                    if tokens.is_empty() {
                        continue;
                    }
                    if self.dispatch(&tokens).await {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    /// Returns `true` once `exit` has been invoked.
    async fn dispatch(&self, tokens: &[&str]) -> bool {
        match tokens[0] {
            "log" => self.cmd_log(&tokens[1..]).await,
            "event" => self.cmd_event(&tokens[1..]).await,
            "chrome" => self.cmd_chrome(&tokens[1..]).await,
            "memory" => self.cmd_memory(&tokens[1..]),
            "help" => self.print_help(),
            "exit" => {
                let _ = self.shutdown.send(()).await;
                return true;
            }
            other => println!("unknown command: {other}"),
        }
        false
    }

    async fn cmd_log(&self, tokens: &[&str]) {
        match tokens {
            ["pause"] => {
                self.engine.sink.pause();
                println!("audit log paused");
            }
            ["start"] => {
                self.engine.sink.resume();
                println!("audit log resumed");
            }
            ["config", "show"] => {
                let config = self.engine.sink.current_config().await;
                println!("{config:#?}");
            }
            ["config", "set", field, value] => self.log_config_set(field, value).await,
            ["config", "cd", dir] => {
                let mut config = self.engine.sink.current_config().await;
                config.log_dir = dir.into();
                self.apply_config(config).await;
            }
            _ => println!("usage: log {{config {{show|set <field> <value>|cd <dir>}}|pause|start}}"),
        }
    }

    async fn log_config_set(&self, field: &str, value: &str) {
        let mut config = self.engine.sink.current_config().await;
        match field {
            "tag" => config.tag = value.to_string(),
            "username" => config.username = value.to_string(),
            "hostname" => config.hostname = value.to_string(),
            "strictlog" => config.strict_log = value.parse().unwrap_or(config.strict_log),
            other => {
                println!("unknown config field: {other}");
                return;
            }
        }
        self.apply_config(config).await;
    }

    async fn apply_config(&self, config: Config) {
        match self.engine.sink.reconfigure(config).await {
            Ok(()) => println!("ok"),
            Err(err) => println!("error: {err}"),
        }
    }

    async fn cmd_event(&self, tokens: &[&str]) {
        match tokens {
            ["show", "active"] => {
                for (name, id) in self.engine.events.active() {
                    println!("{id}\t{name}");
                }
            }
            ["show", "all"] => {
                for (name, id) in self.engine.events.all() {
                    println!("{id}\t{name}");
                }
            }
            ["disable", name] => {
                self.engine.events.disable(name);
                println!("disabled {name}");
            }
            ["enable", name] => {
                self.engine.events.enable(name);
                println!("enabled {name}");
            }
            _ => println!("usage: event {{show {{active|all}}|disable <name>|enable <name>}}"),
        }
    }

    async fn cmd_chrome(&self, tokens: &[&str]) {
        match tokens {
            ["config"] => {
                let config = self.engine.sink.current_config().await;
                println!("debugee {}:{}", config.debugee_host, config.debugee_port);
            }
            _ => println!("usage: chrome config"),
        }
    }

    fn cmd_memory(&self, tokens: &[&str]) {
        match tokens {
            ["usage"] => match read_rss_kb() {
                Some(kb) => println!("resident set size: {kb} KiB"),
                None => println!("resident set size: unavailable"),
            },
            _ => println!("usage: memory usage"),
        }
    }

    fn print_help(&self) {
        println!(
            "commands:\n  log config {{show|set <field> <value>|cd <dir>}}\n  log {{pause|start}}\n  event show {{active|all}}\n  event {{enable|disable}} <name>\n  chrome config\n  memory usage\n  help\n  exit"
        );
        info!("help printed");
    }
}

fn read_rss_kb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    status.lines().find_map(|line| {
        line.strip_prefix("VmRSS:")
            .and_then(|rest| rest.trim().split_whitespace().next())
            .and_then(|kb| kb.parse().ok())
    })
}
