//! The game service: the one handle every connection shares.
//!
//! `GameService` owns the session store, the reveal gate, and the role
//! assigner. Connection handlers never touch those directly; they call
//! the four operations here.
//!
//! ## Locking
//!
//! The assigner sits behind a `Mutex`, so two new-game requests are dealt
//! one after the other, and each one's session is installed before the
//! next starts. Dealing happens while only that mutex is held; the
//! store's write lock is taken just for the swap. Reveals and roster reads
//! never touch the assigner.

use std::sync::Arc;

use impostor_protocol::{RevealPayload, RosterEntry, RosterLink, Token};
use impostor_roles::{GameRequest, RoleAssigner, RoleError};
use impostor_session::{
    PlayerRecord, RevealError, RevealGate, RoleMessages, SessionStore,
};
use tokio::sync::Mutex;

/// Cheap-to-clone handle to the live game.
#[derive(Debug, Clone)]
pub struct GameService {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    store: SessionStore,
    gate: RevealGate,
    assigner: Mutex<RoleAssigner>,
    link_base: Option<String>,
}

impl GameService {
    /// Creates a service with no game yet.
    ///
    /// When `link_base` is set, new-game results carry full links of the
    /// form `{link_base}/role/{token}`.
    pub fn new(
        assigner: RoleAssigner,
        messages: RoleMessages,
        link_base: Option<String>,
    ) -> Self {
        let store = SessionStore::new();
        let gate = RevealGate::new(store.clone(), messages);
        let link_base =
            link_base.map(|base| base.trim_end_matches('/').to_string());

        Self {
            inner: Arc::new(Inner {
                store,
                gate,
                assigner: Mutex::new(assigner),
                link_base,
            }),
        }
    }

    /// Deals a new game and makes it the live one.
    ///
    /// On success every token of the previous game is invalid. On failure
    /// the previous game is untouched.
    ///
    /// Returns one link per player, in roster order.
    ///
    /// # Errors
    /// [`RoleError::Invalid`] for bad counts or names.
    pub async fn new_game(
        &self,
        request: &GameRequest,
    ) -> Result<Vec<RosterLink>, RoleError> {
        let mut assigner = self.inner.assigner.lock().await;

        let session = match assigner.create_session(request) {
            Ok(session) => session,
            Err(e) => {
                tracing::info!(
                    players = request.players,
                    impostors = request.impostors,
                    error = %e,
                    "new game rejected"
                );
                return Err(e);
            }
        };

        let game_id = session.id();
        let links: Vec<RosterLink> = session
            .roster()
            .map(|(name, token)| self.link(name, token))
            .collect();

        self.inner.store.replace(session).await;
        drop(assigner);

        tracing::info!(
            %game_id,
            players = request.players,
            impostors = request.impostors,
            "game created"
        );
        Ok(links)
    }

    /// Names and view status of the live game, in creation order.
    pub async fn roster(&self) -> Vec<RosterEntry> {
        self.inner.store.current_roster().await
    }

    /// The live game's links, as returned when it was created.
    pub async fn links(&self) -> Vec<RosterLink> {
        self.inner
            .store
            .roster_links()
            .await
            .into_iter()
            .map(|entry| self.link(&entry.display_name, &entry.token))
            .collect()
    }

    /// Shows a player their role, marking it viewed.
    ///
    /// # Errors
    /// [`RevealError::NotFound`] for unknown or stale tokens.
    pub async fn reveal(&self, token: &Token) -> Result<RevealPayload, RevealError> {
        self.inner.gate.reveal(token).await
    }

    /// Explicit "I've seen my role".
    ///
    /// # Errors
    /// [`RevealError::NotFound`] for unknown or stale tokens.
    pub async fn confirm_viewed(
        &self,
        token: &Token,
    ) -> Result<PlayerRecord, RevealError> {
        self.inner.gate.confirm_viewed(token).await
    }

    /// Returns `true` once a game has been dealt.
    pub async fn is_active(&self) -> bool {
        self.inner.store.is_active().await
    }

    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    fn link(&self, display_name: &str, token: &Token) -> RosterLink {
        RosterLink {
            display_name: display_name.to_owned(),
            token: token.clone(),
            link: self
                .inner
                .link_base
                .as_ref()
                .map(|base| format!("{base}/role/{token}")),
        }
    }
}
