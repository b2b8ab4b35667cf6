//! The role assignment engine: request in, fully dealt game out.
//!
//! ```text
//! GameRequest ──validate──→ names ──sample──→ impostor seats
//!                                   └─choose─→ crew identity
//!                                   └─mint───→ one token per player
//!                                                  │
//!                                                  ▼
//!                                            GameSession (complete)
//! ```
//!
//! The engine never touches the [`SessionStore`](impostor_session::SessionStore).
//! It returns a finished session and the caller swaps it in, so a
//! failed request can't disturb the game that is already running.

use std::collections::HashSet;

use impostor_session::{GameSession, RandomTokens, Seat, TokenSource};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::sample::sample_indices;
use crate::{GameConfig, RoleError, ValidationError};

/// How many times to redraw a token that is already seated before giving
/// up. A healthy random source never needs a second draw.
const MAX_TOKEN_DRAWS: usize = 16;

// ---------------------------------------------------------------------------
// GameRequest
// ---------------------------------------------------------------------------

/// A request to deal a new game.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameRequest {
    pub players: usize,
    pub impostors: usize,
    /// Optional display names, one per player, in seating order.
    pub names: Option<Vec<String>>,
}

impl GameRequest {
    /// A request with generated names (`Player 1 … Player N`).
    pub fn new(players: usize, impostors: usize) -> Self {
        Self {
            players,
            impostors,
            names: None,
        }
    }

    /// Supplies display names instead of generated ones.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Checks the counts against `config` and resolves display names.
    ///
    /// Counts are checked first, in the order a game creator would fix
    /// them: player count, then impostor count, then names.
    pub fn validate(
        &self,
        config: &GameConfig,
    ) -> Result<Vec<String>, ValidationError> {
        let min = config.effective_min_players();
        if self.players < min {
            return Err(ValidationError::TooFewPlayers {
                min,
                got: self.players,
            });
        }
        if let Some(max) = config.max_players {
            if self.players > max {
                return Err(ValidationError::TooManyPlayers {
                    max,
                    got: self.players,
                });
            }
        }
        if self.impostors < 1 || self.impostors >= self.players {
            return Err(ValidationError::InvalidImpostorCount {
                impostors: self.impostors,
                players: self.players,
            });
        }
        if config.crew_pool.is_empty() {
            return Err(ValidationError::EmptyCrewPool);
        }

        match &self.names {
            None => Ok((1..=self.players).map(|i| format!("Player {i}")).collect()),
            Some(names) => resolve_names(names, self.players),
        }
    }
}

/// Trims supplied names and rejects blanks, duplicates, and a wrong count.
fn resolve_names(
    names: &[String],
    expected: usize,
) -> Result<Vec<String>, ValidationError> {
    if names.len() != expected {
        return Err(ValidationError::NameCountMismatch {
            expected,
            got: names.len(),
        });
    }

    let mut seen = HashSet::with_capacity(names.len());
    let mut resolved = Vec::with_capacity(names.len());
    for (i, raw) in names.iter().enumerate() {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::BlankName { position: i + 1 });
        }
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateName(name.to_owned()));
        }
        resolved.push(name.to_owned());
    }
    Ok(resolved)
}

// ---------------------------------------------------------------------------
// create_session
// ---------------------------------------------------------------------------

/// Deals a complete game.
///
/// Randomness comes from `rng` (impostor seats, crew identity) and
/// `tokens` (one token per player), so callers choose between real
/// entropy and a reproducible test setup.
///
/// # Errors
/// - [`RoleError::Invalid`] if the request breaks the rules in `config`
/// - [`RoleError::Session`] if `tokens` can't produce distinct tokens
pub fn create_session<R: Rng + ?Sized>(
    rng: &mut R,
    tokens: &dyn TokenSource,
    config: &GameConfig,
    request: &GameRequest,
) -> Result<GameSession, RoleError> {
    let names = request.validate(config)?;

    let mut seats = vec![Seat::Crew; names.len()];
    for i in sample_indices(rng, names.len(), request.impostors) {
        seats[i] = Seat::Impostor;
    }

    let crew_identity = config
        .crew_pool
        .choose(rng)
        .ok_or(ValidationError::EmptyCrewPool)?;

    let mut session = GameSession::new(crew_identity.as_str());
    for (name, seat) in names.into_iter().zip(seats) {
        let token = mint_unseated(tokens, &session);
        session.add_player(name, token, seat)?;
    }

    tracing::info!(
        game_id = %session.id(),
        players = session.len(),
        impostors = session.impostor_count(),
        "roles dealt"
    );
    tracing::debug!(
        game_id = %session.id(),
        crew_identity = session.crew_identity(),
        "crew identity chosen"
    );
    Ok(session)
}

/// Draws a token that isn't seated yet, within [`MAX_TOKEN_DRAWS`].
///
/// If every draw collides the last one is returned anyway and
/// `add_player` reports the duplicate.
fn mint_unseated(
    tokens: &dyn TokenSource,
    session: &GameSession,
) -> impostor_protocol::Token {
    let mut token = tokens.generate();
    for _ in 1..MAX_TOKEN_DRAWS {
        if !session.contains_token(&token) {
            break;
        }
        tracing::warn!(game_id = %session.id(), "token collision, redrawing");
        token = tokens.generate();
    }
    token
}

// ---------------------------------------------------------------------------
// RoleAssigner
// ---------------------------------------------------------------------------

/// [`create_session`] bundled with its config, RNG, and token source.
///
/// The server keeps one of these behind a mutex. Tests build one with
/// [`with_seed`](Self::with_seed) for reproducible deals.
pub struct RoleAssigner {
    config: GameConfig,
    rng: StdRng,
    tokens: Box<dyn TokenSource>,
}

impl RoleAssigner {
    /// An assigner seeded from the OS, minting [`RandomTokens`].
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
            tokens: Box::new(RandomTokens),
        }
    }

    /// An assigner whose impostor and identity picks are fully determined
    /// by `seed`. Tokens still come from [`RandomTokens`] unless replaced
    /// with [`with_tokens`](Self::with_tokens).
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            tokens: Box::new(RandomTokens),
        }
    }

    /// Replaces the token source.
    pub fn with_tokens(mut self, tokens: impl TokenSource + 'static) -> Self {
        self.tokens = Box::new(tokens);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Deals a game. See [`create_session`].
    pub fn create_session(
        &mut self,
        request: &GameRequest,
    ) -> Result<GameSession, RoleError> {
        create_session(&mut self.rng, self.tokens.as_ref(), &self.config, request)
    }
}

impl std::fmt::Debug for RoleAssigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoleAssigner")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use impostor_session::{Role, SequentialTokens};

    use crate::DEFAULT_MAX_PLAYERS;

    use super::*;

    fn seeded() -> RoleAssigner {
        RoleAssigner::with_seed(GameConfig::default(), 11).with_tokens(SequentialTokens)
    }

    // =====================================================================
    // validate()
    // =====================================================================

    #[test]
    fn test_validate_three_players_too_few() {
        let err = GameRequest::new(3, 1)
            .validate(&GameConfig::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::TooFewPlayers { min: 4, got: 3 });
    }

    #[test]
    fn test_validate_zero_impostors_invalid() {
        let err = GameRequest::new(5, 0)
            .validate(&GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidImpostorCount { .. }));
    }

    #[test]
    fn test_validate_impostors_equal_players_invalid() {
        let err = GameRequest::new(4, 4)
            .validate(&GameConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidImpostorCount {
                impostors: 4,
                players: 4
            }
        );
    }

    #[test]
    fn test_validate_player_count_checked_before_impostors() {
        // Both counts are wrong; the player count is reported.
        let err = GameRequest::new(2, 0)
            .validate(&GameConfig::default())
            .unwrap_err();
        assert!(matches!(err, ValidationError::TooFewPlayers { .. }));
    }

    #[test]
    fn test_validate_generates_sequential_names() {
        let names = GameRequest::new(4, 1)
            .validate(&GameConfig::default())
            .unwrap();
        assert_eq!(names, ["Player 1", "Player 2", "Player 3", "Player 4"]);
    }

    #[test]
    fn test_validate_trims_supplied_names() {
        let names = GameRequest::new(4, 1)
            .with_names([" Ana ", "Ben", "Cai", "Dov"])
            .validate(&GameConfig::default())
            .unwrap();
        assert_eq!(names[0], "Ana");
    }

    #[test]
    fn test_validate_name_count_mismatch() {
        let err = GameRequest::new(4, 1)
            .with_names(["Ana", "Ben"])
            .validate(&GameConfig::default())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::NameCountMismatch {
                expected: 4,
                got: 2
            }
        );
    }

    #[test]
    fn test_validate_blank_name_reports_position() {
        let err = GameRequest::new(4, 1)
            .with_names(["Ana", "  ", "Cai", "Dov"])
            .validate(&GameConfig::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::BlankName { position: 2 });
    }

    #[test]
    fn test_validate_duplicate_after_trim() {
        let err = GameRequest::new(4, 1)
            .with_names(["Ana", "Ben", "Ana ", "Dov"])
            .validate(&GameConfig::default())
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateName("Ana".into()));
    }

    #[test]
    fn test_validate_min_players_below_four_still_requires_four() {
        let config = GameConfig {
            min_players: 2,
            ..GameConfig::default()
        };

        let err = GameRequest::new(3, 1).validate(&config).unwrap_err();

        assert_eq!(err, ValidationError::TooFewPlayers { min: 4, got: 3 });
        assert!(
            RoleAssigner::with_seed(config, 1)
                .create_session(&GameRequest::new(2, 1))
                .is_err()
        );
    }

    #[test]
    fn test_validate_default_caps_player_count() {
        let config = GameConfig::default();

        let err = GameRequest::new(4_000_000_000, 1)
            .validate(&config)
            .unwrap_err();

        assert_eq!(
            err,
            ValidationError::TooManyPlayers {
                max: DEFAULT_MAX_PLAYERS,
                got: 4_000_000_000
            }
        );
        assert!(GameRequest::new(DEFAULT_MAX_PLAYERS, 1).validate(&config).is_ok());
    }

    #[test]
    fn test_create_session_large_game_deals_every_seat() {
        let session = seeded()
            .create_session(&GameRequest::new(DEFAULT_MAX_PLAYERS, 9))
            .unwrap();

        assert_eq!(session.len(), DEFAULT_MAX_PLAYERS);
        assert_eq!(session.impostor_count(), 9);
    }

    #[test]
    fn test_validate_max_players_enforced_when_set() {
        let config = GameConfig {
            max_players: Some(10),
            ..GameConfig::default()
        };
        let err = GameRequest::new(11, 2).validate(&config).unwrap_err();
        assert_eq!(err, ValidationError::TooManyPlayers { max: 10, got: 11 });
    }

    #[test]
    fn test_validate_empty_crew_pool() {
        let config = GameConfig {
            crew_pool: Vec::new(),
            ..GameConfig::default()
        };
        let err = GameRequest::new(4, 1).validate(&config).unwrap_err();
        assert_eq!(err, ValidationError::EmptyCrewPool);
    }

    // =====================================================================
    // create_session()
    // =====================================================================

    #[test]
    fn test_create_session_seats_everyone_in_order() {
        let session = seeded().create_session(&GameRequest::new(6, 2)).unwrap();

        let names: Vec<&str> = session.roster().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            ["Player 1", "Player 2", "Player 3", "Player 4", "Player 5", "Player 6"]
        );
        assert_eq!(session.impostor_count(), 2);
    }

    #[test]
    fn test_create_session_crew_identity_from_pool() {
        let session = seeded().create_session(&GameRequest::new(5, 1)).unwrap();
        let config = GameConfig::default();

        assert!(config.crew_pool.iter().any(|c| c == session.crew_identity()));
        for record in session.records() {
            if let Role::Crew(identity) = record.role {
                assert_eq!(identity, session.crew_identity());
            }
        }
    }

    #[test]
    fn test_create_session_every_pool_identity_reachable() {
        let mut assigner = seeded();
        let seen: HashSet<String> = (0..300)
            .map(|_| {
                let session = assigner.create_session(&GameRequest::new(4, 1)).unwrap();
                session.crew_identity().to_owned()
            })
            .collect();

        assert_eq!(seen.len(), GameConfig::default().crew_pool.len());
    }

    #[test]
    fn test_create_session_same_seed_same_deal() {
        let request = GameRequest::new(8, 3);
        let a = RoleAssigner::with_seed(GameConfig::default(), 99)
            .create_session(&request)
            .unwrap();
        let b = RoleAssigner::with_seed(GameConfig::default(), 99)
            .create_session(&request)
            .unwrap();

        let impostors = |s: &GameSession| -> Vec<String> {
            s.records()
                .into_iter()
                .filter(|r| r.role.is_impostor())
                .map(|r| r.display_name)
                .collect()
        };
        assert_eq!(impostors(&a), impostors(&b));
        assert_eq!(a.crew_identity(), b.crew_identity());
    }

    #[test]
    fn test_create_session_invalid_request_returns_validation_error() {
        let result = seeded().create_session(&GameRequest::new(4, 4));
        assert!(matches!(
            result,
            Err(RoleError::Invalid(ValidationError::InvalidImpostorCount { .. }))
        ));
    }

    #[test]
    fn test_create_session_stuck_token_source_reports_duplicate() {
        struct Constant;
        impl TokenSource for Constant {
            fn generate(&self) -> impostor_protocol::Token {
                impostor_protocol::Token::new("same")
            }
        }

        let mut assigner =
            RoleAssigner::with_seed(GameConfig::default(), 1).with_tokens(Constant);
        let result = assigner.create_session(&GameRequest::new(4, 1));

        assert!(matches!(result, Err(RoleError::Session(_))));
    }
}
