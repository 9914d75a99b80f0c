use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::SampQueryError;
use crate::opcode::Opcode;

pub const DEFAULT_PORT: u32 = 7777;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(1000);

/// Substring of the `version` rule reported by open.mp servers.
pub const OPEN_MP_MARKER: &str = "omp";

/// Everything a [Session](crate::session::Session) and a query run need to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryConfig {
    /// IP literal or hostname
    pub host: String,
    /// Checked against 1..=65535 by [validate](QueryConfig::validate)
    pub port: u32,
    /// Bounded wait for each reply
    pub timeout: Duration,
    /// Reject replies whose echoed header differs from the request's
    pub strict_header: bool,
    /// `version` rule substring identifying servers without detailed player lists
    pub flavor_marker: String,
    /// Queried when no opcode was requested
    pub default_opcode: Opcode,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            host: "127.0.0.1".to_owned(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            strict_header: false,
            flavor_marker: OPEN_MP_MARKER.to_owned(),
            default_opcode: Opcode::Info,
        }
    }
}

impl QueryConfig {
    pub fn new(host: impl Into<String>, port: u32) -> Self {
        QueryConfig {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_strict_header(mut self, strict: bool) -> Self {
        self.strict_header = strict;
        self
    }

    pub fn with_flavor_marker(mut self, marker: impl Into<String>) -> Self {
        self.flavor_marker = marker.into();
        self
    }

    pub fn with_default_opcode(mut self, opcode: Opcode) -> Self {
        self.default_opcode = opcode;
        self
    }

    /// Defaults overridden by `SAMPQUERY_*` environment variables.
    ///
    /// A value that does not parse is an error rather than a silent fallback.
    /// Range checks are left to [validate](QueryConfig::validate).
    pub fn from_env() -> Result<Self, SampQueryError> {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("SAMPQUERY_HOST") {
            config.host = host;
        }

        if let Some(port) = env_parse::<u32>("SAMPQUERY_PORT")? {
            config.port = port;
        }

        if let Some(ms) = env_parse::<u64>("SAMPQUERY_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }

        if let Some(strict) = env_parse::<bool>("SAMPQUERY_STRICT_HEADER")? {
            config.strict_header = strict;
        }

        if let Ok(marker) = std::env::var("SAMPQUERY_FLAVOR_MARKER") {
            config.flavor_marker = marker;
        }

        Ok(config)
    }

    /// Check host syntax and port range. Does no I/O.
    pub fn validate(&self) -> Result<(), SampQueryError> {
        if !is_valid_host(&self.host) {
            return Err(SampQueryError::InvalidHost(self.host.clone()));
        }
        if !(1..=u32::from(u16::MAX)).contains(&self.port) {
            return Err(SampQueryError::InvalidPort(self.port));
        }
        Ok(())
    }
}

fn env_parse<T: FromStr>(var: &'static str) -> Result<Option<T>, SampQueryError> {
    match std::env::var(var) {
        Ok(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| SampQueryError::InvalidEnv { var, value }),
        Err(_) => Ok(None),
    }
}

/// An IP literal, or a hostname made of dot-separated labels of letters, digits and hyphens.
pub fn is_valid_host(host: &str) -> bool {
    host.parse::<IpAddr>().is_ok() || is_valid_hostname(host)
}

fn is_valid_hostname(host: &str) -> bool {
    let host: &str = host.strip_suffix('.').unwrap_or(host);
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}
