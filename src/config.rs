use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
struct FileConfig {
    debugeehost: Option<String>,
    debugeeport: Option<u32>,
    logdir: Option<String>,
    username: Option<String>,
    hostname: Option<String>,
    tag: Option<String>,
    strictlog: Option<bool>,
    enable_remote: Option<bool>,
    remote_scheme: Option<String>,
    remote_host: Option<String>,
    remote_port: Option<u32>,
    remote_usessl: Option<bool>,
}

/// Command-line surface. Flags override whatever the YAML file (if any) sets.
#[derive(Debug, Parser, Default)]
#[command(name = "chromeaudit", about = "Browser auditing collector")]
pub struct CliArgs {
    #[arg(long = "debugeehost", short = 'H')]
    pub debugee_host: Option<String>,

    #[arg(long = "debugeeport", short = 'P')]
    pub debugee_port: Option<u32>,

    #[arg(long = "tag", short = 't')]
    pub tag: Option<String>,

    #[arg(long = "username", short = 'u')]
    pub username: Option<String>,

    #[arg(long = "logdir", short = 'd')]
    pub log_dir: Option<String>,

    #[arg(long = "config", short = 'c')]
    pub config_path: Option<PathBuf>,

    #[arg(long = "strict-log")]
    pub strict_log: bool,

    #[arg(long = "enable-remote")]
    pub enable_remote: bool,

    #[arg(long = "remote-scheme")]
    pub remote_scheme: Option<String>,

    #[arg(long = "remote-host")]
    pub remote_host: Option<String>,

    #[arg(long = "remote-port")]
    pub remote_port: Option<u32>,

    #[arg(long = "remote-use-ssl")]
    pub remote_use_ssl: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub scheme: String,
    pub use_ssl: bool,
    pub host: String,
    pub port: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub debugee_host: String,
    pub debugee_port: u32,
    pub log_dir: PathBuf,
    pub username: String,
    pub hostname: String,
    pub tag: String,
    pub strict_log: bool,
    pub remote: Option<RemoteConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            debugee_host: "localhost".to_string(),
            debugee_port: 9222,
            log_dir: PathBuf::from("."),
            username: "default".to_string(),
            hostname: "default".to_string(),
            tag: "default".to_string(),
            strict_log: false,
            remote: None,
        }
    }
}

impl Config {
    /// Merges built-in defaults, an optional YAML file, and CLI flags (in
    /// that order of increasing precedence), then validates the result.
    pub fn load(cli: CliArgs) -> Result<Config, ConfigError> {
        let mut cfg = Config::default();

        if let Some(path) = &cli.config_path {
            apply_file(&mut cfg, path)?;
        }

        if let Some(v) = cli.debugee_host {
            cfg.debugee_host = v;
        }
        if let Some(v) = cli.debugee_port {
            cfg.debugee_port = v;
        }
        if let Some(v) = cli.tag {
            cfg.tag = v;
        }
        if let Some(v) = cli.username {
            cfg.username = v;
        }
        if let Some(v) = cli.log_dir {
            cfg.log_dir = PathBuf::from(v);
        }
        if cli.strict_log {
            cfg.strict_log = true;
        }

        if cli.enable_remote {
            let remote = cfg.remote.take().unwrap_or(RemoteConfig {
                scheme: "http".to_string(),
                use_ssl: false,
                host: String::new(),
                port: 80,
            });
            let mut remote = remote;
            if let Some(v) = cli.remote_scheme {
                remote.scheme = v;
            }
            if let Some(v) = cli.remote_host {
                remote.host = v;
            }
            if let Some(v) = cli.remote_port {
                remote.port = v;
            }
            if cli.remote_use_ssl {
                remote.use_ssl = true;
            }
            cfg.remote = Some(remote);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_port(self.debugee_port)?;
        if let Some(remote) = &self.remote {
            validate_port(remote.port)?;
            if remote.host.is_empty() {
                return Err(ConfigError::MissingRemoteHost);
            }
        }
        fs::create_dir_all(&self.log_dir)
            .map_err(|_| ConfigError::LogDir(self.log_dir.display().to_string()))?;
        Ok(())
    }

    pub fn log_file_path(&self) -> PathBuf {
        self.log_dir.join(format!("{}-{}.log", self.username, self.tag))
    }
}

fn validate_port(port: u32) -> Result<(), ConfigError> {
    if port == 0 || port > 65535 {
        return Err(ConfigError::InvalidPort(port));
    }
    Ok(())
}

fn apply_file(cfg: &mut Config, path: &Path) -> Result<(), ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let file: FileConfig = serde_yaml::from_str(&text).map_err(|source| ConfigError::Yaml {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(v) = file.debugeehost {
        cfg.debugee_host = v;
    }
    if let Some(v) = file.debugeeport {
        cfg.debugee_port = v;
    }
    if let Some(v) = file.logdir {
        cfg.log_dir = PathBuf::from(v);
    }
    if let Some(v) = file.username {
        cfg.username = v;
    }
    if let Some(v) = file.hostname {
        cfg.hostname = v;
    }
    if let Some(v) = file.tag {
        cfg.tag = v;
    }
    if let Some(v) = file.strictlog {
        cfg.strict_log = v;
    }
    if file.enable_remote.unwrap_or(false) {
        cfg.remote = Some(RemoteConfig {
            scheme: file.remote_scheme.unwrap_or_else(|| "http".to_string()),
            use_ssl: file.remote_usessl.unwrap_or(false),
            host: file.remote_host.unwrap_or_default(),
            port: file.remote_port.unwrap_or(80),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::load(CliArgs::default()).unwrap();
        assert_eq!(cfg.debugee_port, 9222);
        assert!(cfg.remote.is_none());
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        let mut cli = CliArgs::default();
        cli.debugee_port = Some(70000);
        assert!(matches!(
            Config::load(cli),
            Err(ConfigError::InvalidPort(70000))
        ));
    }

    #[test]
    fn remote_without_host_is_rejected() {
        let mut cli = CliArgs::default();
        cli.enable_remote = true;
        assert!(matches!(
            Config::load(cli),
            Err(ConfigError::MissingRemoteHost)
        ));
    }

    #[test]
    fn cli_overrides_file() {
        let dir = std::env::temp_dir().join(format!(
            "chromeaudit_test_{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cfg.yaml");
        std::fs::write(&path, "debugeeport: 1234\ntag: fromfile\n").unwrap();

        let mut cli = CliArgs::default();
        cli.config_path = Some(path);
        cli.tag = Some("fromcli".to_string());

        let cfg = Config::load(cli).unwrap();
        assert_eq!(cfg.debugee_port, 1234);
        assert_eq!(cfg.tag, "fromcli");
    }
}
