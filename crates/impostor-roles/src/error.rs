//! Error types for role assignment.

use impostor_session::SessionError;

/// A new-game request was rejected. Nothing was created or replaced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Fewer players than the game needs.
    #[error("too few players: need at least {min}, got {got}")]
    TooFewPlayers { min: usize, got: usize },

    /// More players than the server allows.
    #[error("too many players: at most {max}, got {got}")]
    TooManyPlayers { max: usize, got: usize },

    /// Impostor count outside `1..players`.
    #[error(
        "invalid impostor count: {impostors} impostors for {players} players \
         (need at least 1 and fewer than the player count)"
    )]
    InvalidImpostorCount { impostors: usize, players: usize },

    /// Supplied names don't match the player count.
    #[error("expected {expected} names, got {got}")]
    NameCountMismatch { expected: usize, got: usize },

    /// A supplied name is empty or whitespace. `position` is 1-based.
    #[error("name #{position} is blank")]
    BlankName { position: usize },

    /// Two supplied names are the same after trimming.
    #[error("name {0:?} is used more than once")]
    DuplicateName(String),

    /// The configured crew pool has nothing to choose from.
    #[error("no crew identities configured")]
    EmptyCrewPool,
}

/// Anything that can stop a game from being dealt.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    /// The request itself was bad (caller's fault).
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The session refused a player. Only happens when the token source
    /// keeps returning tokens that are already in use.
    #[error(transparent)]
    Session(#[from] SessionError),
}
