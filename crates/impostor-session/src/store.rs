//! The session store: holds the one live game.
//!
//! # Concurrency
//!
//! The store is a cheap-to-clone handle around
//! `Arc<RwLock<Option<GameSession>>>`:
//!
//! - **Replacing** a game takes the write lock, and only for the swap
//!   itself. The new session is fully built before `replace` is called,
//!   so nobody can ever observe a half-dealt game.
//! - **Reading** (roster, lookup) and **revealing** take the read lock.
//!   Reveals only flip an atomic flag, so players opening their links at
//!   the same moment don't wait on each other.
//!
//! The lock is `tokio::sync::RwLock` because the store is shared by
//! connection tasks. It is never held across network I/O.

use std::sync::Arc;

use impostor_protocol::{RosterEntry, RosterLink, Token};
use tokio::sync::{RwLock, RwLockReadGuard};

use crate::{GameId, GameSession, PlayerRecord};

/// Shared handle to the current game, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<GameSession>>>,
}

impl SessionStore {
    /// Creates an empty store (no game yet).
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a new game, discarding the previous one entirely.
    ///
    /// Every token of the old game stops working the moment this returns.
    /// Returns the ID of the game that was replaced, if there was one.
    pub async fn replace(&self, session: GameSession) -> Option<GameId> {
        let new_id = session.id();
        let players = session.len();

        let previous = {
            let mut current = self.current.write().await;
            current.replace(session)
        };
        let previous_id = previous.as_ref().map(GameSession::id);

        tracing::info!(
            game_id = %new_id,
            players,
            replaced = ?previous_id,
            "game session installed"
        );
        previous_id
    }

    /// Returns `true` once a game has been dealt.
    pub async fn is_active(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// The ID of the live game.
    pub async fn current_id(&self) -> Option<GameId> {
        self.current.read().await.as_ref().map(GameSession::id)
    }

    /// Names and view status in creation order, for the shared screen.
    ///
    /// Empty before the first game. Never exposes tokens or roles.
    pub async fn current_roster(&self) -> Vec<RosterEntry> {
        let current = self.current.read().await;
        current
            .as_ref()
            .map(|session| {
                session
                    .view_status()
                    .map(|(name, viewed)| RosterEntry {
                        display_name: name.to_owned(),
                        viewed,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names and tokens in creation order, for the game creator.
    ///
    /// `link` is left empty; the service fills it in when a link base is
    /// configured.
    pub async fn roster_links(&self) -> Vec<RosterLink> {
        let current = self.current.read().await;
        current
            .as_ref()
            .map(|session| {
                session
                    .roster()
                    .map(|(name, token)| RosterLink {
                        display_name: name.to_owned(),
                        token: token.clone(),
                        link: None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Snapshot of the record behind `token` in the current game.
    pub async fn lookup(&self, token: &Token) -> Option<PlayerRecord> {
        self.current.read().await.as_ref()?.record(token)
    }

    /// Read access for the reveal gate.
    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Option<GameSession>> {
        self.current.read().await
    }
}
