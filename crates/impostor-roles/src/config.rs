//! Game configuration: player limits and the crew identity pool.

use serde::{Deserialize, Serialize};

/// The fewest players a game can be dealt for. A configured
/// `min_players` below this is raised to it.
pub const DEFAULT_MIN_PLAYERS: usize = 4;

/// Default cap on players per game.
pub const DEFAULT_MAX_PLAYERS: usize = 100;

/// Crew identities a game picks from when nothing else is configured.
pub const DEFAULT_CREW_POOL: [&str; 6] = [
    "Messi",
    "Cristiano Ronaldo",
    "Mbappé",
    "Neymar",
    "Bellingham",
    "Haaland",
];

/// Rules applied to every new-game request.
///
/// ```rust
/// use impostor_roles::GameConfig;
///
/// let config = GameConfig {
///     crew_pool: vec!["Pelé".into(), "Maradona".into()],
///     ..GameConfig::default()
/// };
/// assert_eq!(config.min_players, 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Minimum players per game. Never effectively below
    /// [`DEFAULT_MIN_PLAYERS`]; see [`effective_min_players`].
    ///
    /// [`effective_min_players`]: Self::effective_min_players
    pub min_players: usize,

    /// Upper bound on players per game. `None` removes the cap.
    pub max_players: Option<usize>,

    /// Identities the crew can be assigned. One is chosen uniformly per
    /// game and shared by every crew member. Must not be empty.
    pub crew_pool: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            min_players: DEFAULT_MIN_PLAYERS,
            max_players: Some(DEFAULT_MAX_PLAYERS),
            crew_pool: DEFAULT_CREW_POOL.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl GameConfig {
    /// The minimum actually enforced: `min_players`, but at least
    /// [`DEFAULT_MIN_PLAYERS`].
    pub fn effective_min_players(&self) -> usize {
        self.min_players.max(DEFAULT_MIN_PLAYERS)
    }
}
