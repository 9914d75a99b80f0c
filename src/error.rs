use std::io;

use thiserror::Error;

use crate::opcode::Opcode;

pub type Result<T> = std::result::Result<T, SampQueryError>;

/// Everything that can go wrong while talking to a SA-MP / open.mp server.
///
/// Construction-time variants ([InvalidHost](SampQueryError::InvalidHost) through
/// [Unreachable](SampQueryError::Unreachable)) abort a whole run.
/// [Truncated](SampQueryError::Truncated) and [HeaderMismatch](SampQueryError::HeaderMismatch)
/// are scoped to the single opcode being decoded.
#[derive(Debug, Error)]
pub enum SampQueryError {
    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid port: {0}")]
    InvalidPort(u32),

    #[error("invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("could not resolve {0} to an IPv4 address")]
    Resolution(String),

    #[error("failed to bind a local UDP port: {0}")]
    FailedPortBind(#[source] io::Error),

    #[error("failed to connect UDP socket: {0}")]
    FailedConnect(#[source] io::Error),

    #[error("unable to connect to server at '{host}:{port}'. server is offline or did not respond to ping")]
    Unreachable { host: String, port: u16 },

    #[error("truncated payload: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("reply header does not match the {0} request")]
    HeaderMismatch(Opcode),

    #[error("unknown opcode byte {0:#04x}")]
    UnknownOpcode(u8),
}
