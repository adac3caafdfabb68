use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CONTEXT_KEY: &str = "camera";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 9555;
pub const DEFAULT_SERVICE_NAME: &str = "adservice-client";

/// How long `shutdown` waits for in-flight calls
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(5);

const SERVICE_NAME_ENV: &str = "ADSERVICE_SERVICE_NAME";
const TRACING_DISABLED_ENV: &str = "ADSERVICE_TRACING_DISABLED";
const SPAN_EXPORTER_ENV: &str = "ADSERVICE_SPAN_EXPORTER";

/// Where and how the client connects
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Per-call deadline. `None` leaves calls unbounded.
    pub call_timeout: Option<Duration>,
    pub shutdown_grace: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            call_timeout: None,
            shutdown_grace: SHUTDOWN_GRACE_PERIOD,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Plaintext URI of the server. IPv6 literals are bracketed.
    pub fn endpoint_uri(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("http://[{}]:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// Parse a port argument, falling back to [`DEFAULT_PORT`] with a warning.
pub fn port_or_default(raw: Option<&str>) -> u16 {
    match raw {
        None => DEFAULT_PORT,
        Some(raw) => match raw.trim().parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                tracing::warn!("Port {} is invalid, use default port {}.", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }
        },
    }
}

/// Which exporter receives finished spans
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ExporterKind {
    /// OpenTelemetry stdout exporter
    #[default]
    Stdout,
    None,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown span exporter `{0}` (expected stdout or none)")]
pub struct UnknownExporter(String);

impl FromStr for ExporterKind {
    type Err = UnknownExporter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" | "logging" => Ok(Self::Stdout),
            "none" | "off" => Ok(Self::None),
            _ => Err(UnknownExporter(s.to_string())),
        }
    }
}

impl fmt::Display for ExporterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stdout => "stdout",
            Self::None => "none",
        })
    }
}

/// Process-wide tracing settings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub enabled: bool,
    pub exporter: ExporterKind,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            enabled: true,
            exporter: ExporterKind::Stdout,
        }
    }
}

impl TelemetryConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let service_name = lookup(SERVICE_NAME_ENV)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.service_name);

        let enabled = lookup(TRACING_DISABLED_ENV).is_none();

        let exporter = match lookup(SPAN_EXPORTER_ENV) {
            None => defaults.exporter,
            Some(raw) => raw.parse().unwrap_or_else(|e: UnknownExporter| {
                tracing::warn!("{}, using {}", e, defaults.exporter);
                defaults.exporter
            }),
        };

        Self {
            service_name,
            enabled,
            exporter,
        }
    }
}
