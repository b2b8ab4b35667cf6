//! Session data: one game's roster, roles, and view status.
//!
//! A [`GameSession`] is built once, completely, by the role engine and
//! then handed to the [`SessionStore`](crate::SessionStore). After that
//! the only thing that ever changes inside it is each player's `viewed`
//! flag.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use impostor_protocol::Token;
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Counter for generating game IDs. IDs are only used in logs.
static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// GameId
// ---------------------------------------------------------------------------

/// Identifies one dealt game, so log lines from consecutive games can be
/// told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A player's hidden role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Impostor,
    /// A crew member, carrying the session's crew identity.
    Crew(String),
}

impl Role {
    pub fn is_impostor(&self) -> bool {
        matches!(self, Self::Impostor)
    }
}

/// How a seat is stored internally.
///
/// Crew seats don't carry their own identity string: the session holds
/// exactly one, so "all crew share the same identity" can't be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Seat {
    Impostor,
    Crew,
}

// ---------------------------------------------------------------------------
// PlayerRecord
// ---------------------------------------------------------------------------

/// A snapshot of one player's record.
///
/// Snapshots are cheap copies taken under the store's read lock. They do
/// not track later changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub token: Token,
    pub display_name: String,
    pub role: Role,
    pub viewed: bool,
}

/// Live per-player state inside a session.
#[derive(Debug)]
struct Player {
    display_name: String,
    seat: Seat,
    /// Atomic so a reveal can flip it under a shared (read) lock.
    viewed: AtomicBool,
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// The complete state of one game.
///
/// `players` is keyed by token for reveals; `roster` keeps creation order
/// for the game creator's listing; `names` makes the display-name check
/// a single lookup. All three are only ever written together in
/// [`add_player`](Self::add_player), so they always describe the same
/// player set.
#[derive(Debug)]
pub struct GameSession {
    id: GameId,
    crew_identity: String,
    players: HashMap<Token, Player>,
    roster: Vec<Token>,
    names: HashSet<String>,
}

impl GameSession {
    /// Starts an empty session whose crew members will all be
    /// `crew_identity`.
    pub fn new(crew_identity: impl Into<String>) -> Self {
        Self {
            id: GameId(NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed)),
            crew_identity: crew_identity.into(),
            players: HashMap::new(),
            roster: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Adds a player at the end of the roster.
    ///
    /// # Errors
    /// - [`SessionError::DuplicateToken`] if the token is already seated
    /// - [`SessionError::DuplicateName`] if the display name is taken
    pub fn add_player(
        &mut self,
        display_name: impl Into<String>,
        token: Token,
        seat: Seat,
    ) -> Result<(), SessionError> {
        let display_name = display_name.into();

        if self.players.contains_key(&token) {
            return Err(SessionError::DuplicateToken(token));
        }
        if self.names.contains(&display_name) {
            return Err(SessionError::DuplicateName(display_name));
        }

        self.names.insert(display_name.clone());
        self.roster.push(token.clone());
        self.players.insert(
            token,
            Player {
                display_name,
                seat,
                viewed: AtomicBool::new(false),
            },
        );
        Ok(())
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    /// The identity every crew member in this game shares.
    pub fn crew_identity(&self) -> &str {
        &self.crew_identity
    }

    pub fn contains_token(&self, token: &Token) -> bool {
        self.players.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn impostor_count(&self) -> usize {
        self.players
            .values()
            .filter(|p| p.seat == Seat::Impostor)
            .count()
    }

    /// Snapshot of one player's record.
    pub fn record(&self, token: &Token) -> Option<PlayerRecord> {
        self.players.get(token).map(|p| self.snapshot(token, p))
    }

    /// Snapshots of every record, in roster order.
    pub fn records(&self) -> Vec<PlayerRecord> {
        self.roster
            .iter()
            .filter_map(|token| self.record(token))
            .collect()
    }

    /// `(display_name, token)` pairs in roster order.
    pub fn roster(&self) -> impl Iterator<Item = (&str, &Token)> + '_ {
        self.roster.iter().filter_map(move |token| {
            self.players
                .get(token)
                .map(|p| (p.display_name.as_str(), token))
        })
    }

    /// `(display_name, viewed)` pairs in roster order.
    pub fn view_status(&self) -> impl Iterator<Item = (&str, bool)> + '_ {
        self.roster.iter().filter_map(move |token| {
            self.players.get(token).map(|p| {
                (p.display_name.as_str(), p.viewed.load(Ordering::Acquire))
            })
        })
    }

    /// Sets the player's `viewed` flag and returns their record.
    ///
    /// Idempotent: once set, the flag stays set. Takes `&self` so that
    /// reveals for different players can run side by side under the
    /// store's read lock.
    pub(crate) fn mark_viewed(&self, token: &Token) -> Option<PlayerRecord> {
        let player = self.players.get(token)?;
        player.viewed.store(true, Ordering::Release);
        Some(self.snapshot(token, player))
    }

    fn snapshot(&self, token: &Token, player: &Player) -> PlayerRecord {
        let role = match player.seat {
            Seat::Impostor => Role::Impostor,
            Seat::Crew => Role::Crew(self.crew_identity.clone()),
        };
        PlayerRecord {
            token: token.clone(),
            display_name: player.display_name.clone(),
            role,
            viewed: player.viewed.load(Ordering::Acquire),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(s: &str) -> Token {
        Token::new(s)
    }

    /// Four seats, the second one an impostor.
    fn four_player_session() -> GameSession {
        let mut session = GameSession::new("Messi");
        session.add_player("Player 1", tok("a"), Seat::Crew).unwrap();
        session.add_player("Player 2", tok("b"), Seat::Impostor).unwrap();
        session.add_player("Player 3", tok("c"), Seat::Crew).unwrap();
        session.add_player("Player 4", tok("d"), Seat::Crew).unwrap();
        session
    }

    #[test]
    fn test_add_player_keeps_roster_order() {
        let session = four_player_session();

        let names: Vec<&str> = session.roster().map(|(name, _)| name).collect();
        assert_eq!(names, ["Player 1", "Player 2", "Player 3", "Player 4"]);
    }

    #[test]
    fn test_add_player_duplicate_token_returns_error() {
        let mut session = four_player_session();

        let result = session.add_player("Player 5", tok("a"), Seat::Crew);

        assert!(matches!(result, Err(SessionError::DuplicateToken(t)) if t == tok("a")));
        assert_eq!(session.len(), 4, "failed add must not change the session");
    }

    #[test]
    fn test_add_player_duplicate_name_returns_error() {
        let mut session = four_player_session();

        let result = session.add_player("Player 1", tok("z"), Seat::Crew);

        assert!(matches!(result, Err(SessionError::DuplicateName(n)) if n == "Player 1"));
        assert!(!session.contains_token(&tok("z")));
    }

    #[test]
    fn test_add_player_thousands_of_seats() {
        let mut session = GameSession::new("Messi");
        for i in 0..20_000 {
            session
                .add_player(format!("Player {i}"), tok(&format!("t{i}")), Seat::Crew)
                .unwrap();
        }

        assert_eq!(session.len(), 20_000);
        let result = session.add_player("Player 19999", tok("fresh"), Seat::Crew);
        assert!(matches!(result, Err(SessionError::DuplicateName(_))));
    }

    #[test]
    fn test_add_player_rejected_token_keeps_name_free() {
        let mut session = four_player_session();

        assert!(session.add_player("Player 5", tok("a"), Seat::Crew).is_err());
        assert!(session.add_player("Player 5", tok("e"), Seat::Crew).is_ok());
    }

    #[test]
    fn test_record_crew_carries_session_identity() {
        let session = four_player_session();

        let record = session.record(&tok("c")).unwrap();

        assert_eq!(record.role, Role::Crew("Messi".into()));
        assert_eq!(record.display_name, "Player 3");
        assert!(!record.viewed);
    }

    #[test]
    fn test_impostor_count_counts_impostor_seats() {
        assert_eq!(four_player_session().impostor_count(), 1);
    }

    #[test]
    fn test_mark_viewed_is_idempotent() {
        let session = four_player_session();

        let first = session.mark_viewed(&tok("b")).unwrap();
        let second = session.mark_viewed(&tok("b")).unwrap();

        assert!(first.viewed && second.viewed);
        assert_eq!(
            session.view_status().filter(|(_, viewed)| *viewed).count(),
            1,
            "only the revealed player should be marked"
        );
    }

    #[test]
    fn test_mark_viewed_unknown_token_returns_none() {
        let session = four_player_session();
        assert!(session.mark_viewed(&tok("nope")).is_none());
    }

    #[test]
    fn test_new_sessions_get_distinct_ids() {
        assert_ne!(GameSession::new("x").id(), GameSession::new("x").id());
    }
}
