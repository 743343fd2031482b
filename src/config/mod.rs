//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const LOCAL_CONFIG_BASENAME: &str = "larder";
const ENV_PREFIX: &str = "LARDER";
const DEFAULT_BACKEND_ORIGIN: &str = "http://localhost:8000";
const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PROXY_HOST: &str = "127.0.0.1";
const DEFAULT_PROXY_PORT: u16 = 8788;

/// Command-line arguments for the `larder` proxy binary.
#[derive(Debug, Parser)]
#[command(name = "larder", version, about = "Larder edge proxy")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "LARDER_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the backend origin RPC calls are sent to.
    #[arg(long = "backend-origin", value_name = "URL")]
    pub backend_origin: Option<String>,

    /// Override the fixed per-request timeout in seconds.
    #[arg(long = "backend-timeout-seconds", value_name = "SECONDS")]
    pub backend_timeout_seconds: Option<u64>,

    /// Override the proxy listener host.
    #[arg(long = "proxy-host", value_name = "HOST")]
    pub proxy_host: Option<String>,

    /// Override the proxy listener port.
    #[arg(long = "proxy-port", value_name = "PORT")]
    pub proxy_port: Option<u16>,

    /// Override the origin the proxy forwards `/api/*` requests to.
    #[arg(long = "proxy-backend-origin", value_name = "URL")]
    pub proxy_backend_origin: Option<String>,

    /// Override the session storage directory (omit for in-memory only).
    #[arg(long = "storage-dir", value_name = "PATH")]
    pub storage_dir: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] config::ConfigError),
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Base origin for RPC calls; may carry a path prefix (e.g. a proxy's
    /// `/api`).
    pub origin: Url,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub host: String,
    pub port: u16,
    /// Where `/api/*` requests are forwarded; the proxy refuses to forward
    /// when unset.
    pub backend_origin: Option<String>,
}

impl ProxySettings {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|err| ConfigError::invalid(format!("invalid proxy listen address: {err}")))
    }
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// Directory for persisted session state; `None` keeps everything in
    /// memory.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendSettings,
    pub proxy: ProxySettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSettings {
    backend: RawBackend,
    proxy: RawProxy,
    storage: RawStorage,
    logging: RawLogging,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawBackend {
    origin: String,
    timeout_seconds: u64,
}

impl Default for RawBackend {
    fn default() -> Self {
        Self {
            origin: DEFAULT_BACKEND_ORIGIN.to_owned(),
            timeout_seconds: DEFAULT_BACKEND_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawProxy {
    host: String,
    port: u16,
    backend_origin: Option<String>,
}

impl Default for RawProxy {
    fn default() -> Self {
        Self {
            host: DEFAULT_PROXY_HOST.to_owned(),
            port: DEFAULT_PROXY_PORT,
            backend_origin: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStorage {
    dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawLogging {
    level: String,
    json: bool,
}

impl Default for RawLogging {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

/// Parse CLI arguments and load the layered settings they select.
pub fn load_with_cli() -> Result<(CliArgs, Settings), ConfigError> {
    let cli = CliArgs::parse();
    let settings = load(cli.config_file.as_deref(), &cli.overrides)?;
    Ok((cli, settings))
}

/// Load settings from an optional file, the `LARDER_*` environment, and CLI
/// overrides, in increasing precedence.
pub fn load(
    config_file: Option<&std::path::Path>,
    overrides: &Overrides,
) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();
    builder = match config_file {
        Some(path) => builder.add_source(File::from(path.to_path_buf())),
        None => builder.add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false)),
    };
    builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    let raw: RawSettings = builder.build()?.try_deserialize()?;
    resolve(raw, overrides)
}

fn resolve(mut raw: RawSettings, overrides: &Overrides) -> Result<Settings, ConfigError> {
    if let Some(origin) = &overrides.backend_origin {
        raw.backend.origin = origin.clone();
    }
    if let Some(timeout) = overrides.backend_timeout_seconds {
        raw.backend.timeout_seconds = timeout;
    }
    if let Some(host) = &overrides.proxy_host {
        raw.proxy.host = host.clone();
    }
    if let Some(port) = overrides.proxy_port {
        raw.proxy.port = port;
    }
    if let Some(origin) = &overrides.proxy_backend_origin {
        raw.proxy.backend_origin = Some(origin.clone());
    }
    if let Some(dir) = &overrides.storage_dir {
        raw.storage.dir = Some(dir.clone());
    }
    if let Some(level) = &overrides.log_level {
        raw.logging.level = level.clone();
    }
    if let Some(json) = overrides.log_json {
        raw.logging.json = json;
    }

    let origin = Url::parse(&raw.backend.origin)
        .map_err(|err| ConfigError::invalid(format!("invalid backend origin: {err}")))?;
    if raw.backend.timeout_seconds == 0 {
        return Err(ConfigError::invalid("backend timeout must be positive"));
    }
    let level = LevelFilter::from_str(&raw.logging.level)
        .map_err(|_| ConfigError::invalid(format!("invalid log level: {}", raw.logging.level)))?;

    Ok(Settings {
        backend: BackendSettings {
            origin,
            timeout: Duration::from_secs(raw.backend.timeout_seconds),
        },
        proxy: ProxySettings {
            host: raw.proxy.host,
            port: raw.proxy.port,
            backend_origin: raw.proxy.backend_origin,
        },
        storage: StorageSettings {
            dir: raw.storage.dir,
        },
        logging: LoggingSettings {
            level,
            format: if raw.logging.json {
                LogFormat::Json
            } else {
                LogFormat::Compact
            },
        },
    })
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn defaults_resolve() {
        let settings = load(None, &Overrides::default()).expect("default settings");
        assert_eq!(settings.backend.origin.as_str(), "http://localhost:8000/");
        assert_eq!(settings.backend.timeout, Duration::from_secs(10));
        assert_eq!(settings.proxy.port, DEFAULT_PROXY_PORT);
        assert!(settings.proxy.backend_origin.is_none());
        assert!(settings.storage.dir.is_none());
        assert_eq!(settings.logging.level, LevelFilter::INFO);
        assert_eq!(settings.logging.format, LogFormat::Compact);
    }

    #[test]
    #[serial]
    fn cli_overrides_win() {
        let overrides = Overrides {
            backend_origin: Some("http://127.0.0.1:9001/api".to_owned()),
            proxy_port: Some(9788),
            log_level: Some("debug".to_owned()),
            log_json: Some(true),
            ..Overrides::default()
        };
        let settings = load(None, &overrides).expect("settings");
        assert_eq!(
            settings.backend.origin.as_str(),
            "http://127.0.0.1:9001/api"
        );
        assert_eq!(settings.proxy.port, 9788);
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn environment_layer_applies() {
        unsafe {
            std::env::set_var("LARDER_PROXY__BACKEND_ORIGIN", "http://10.0.0.2:8000");
        }
        let settings = load(None, &Overrides::default()).expect("settings");
        unsafe {
            std::env::remove_var("LARDER_PROXY__BACKEND_ORIGIN");
        }
        assert_eq!(
            settings.proxy.backend_origin.as_deref(),
            Some("http://10.0.0.2:8000")
        );
    }

    #[test]
    #[serial]
    fn rejects_bad_origin() {
        let overrides = Overrides {
            backend_origin: Some("not a url".to_owned()),
            ..Overrides::default()
        };
        assert!(matches!(
            load(None, &overrides),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    #[serial]
    fn rejects_zero_timeout() {
        let overrides = Overrides {
            backend_timeout_seconds: Some(0),
            ..Overrides::default()
        };
        assert!(matches!(
            load(None, &overrides),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
