//! Unified error type for the impostor server.

use impostor_protocol::ProtocolError;
use impostor_roles::RoleError;
use impostor_session::RevealError;
use impostor_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates a `From` impl, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum ImpostorError {
    /// Connection, send, or receive failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Encode, decode, or invalid message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A new game could not be dealt.
    #[error(transparent)]
    Role(#[from] RoleError),

    /// Unknown or stale token.
    #[error(transparent)]
    Reveal(#[from] RevealError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A configuration value could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An environment variable was set to something unparseable.
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    /// The crew pool was set but contained no names.
    #[error("crew pool must contain at least one identity")]
    EmptyCrewPool,
}
