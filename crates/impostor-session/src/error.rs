//! Error types for the session layer.

use impostor_protocol::Token;

/// Errors raised while assembling a [`GameSession`](crate::GameSession).
///
/// These guard the session invariants: a token or display name may
/// appear only once per game.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The token is already assigned to another player in this game.
    #[error("token {} is already in use", .0.fingerprint())]
    DuplicateToken(Token),

    /// Two players were given the same display name.
    #[error("display name {0:?} is already taken")]
    DuplicateName(String),
}

/// Errors returned by the reveal gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RevealError {
    /// No player in the current game holds this token. Either the link
    /// was mistyped or a newer game has replaced the one it belonged to.
    #[error("invalid or expired link")]
    NotFound,
}
