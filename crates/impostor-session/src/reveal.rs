//! The reveal gate: turns a token into "here is your role".
//!
//! Opening a link and pressing "I've seen it" both go through
//! [`RevealGate::record_view`], so `viewed` means "this link has been
//! opened at least once", not "the player explicitly confirmed".

use impostor_protocol::{RevealPayload, Token};
use serde::{Deserialize, Serialize};

use crate::{PlayerRecord, RevealError, Role, SessionStore};

/// Placeholder replaced by the crew identity in [`RoleMessages::crew`].
pub const IDENTITY_PLACEHOLDER: &str = "{identity}";

// ---------------------------------------------------------------------------
// RoleMessages
// ---------------------------------------------------------------------------

/// The text shown to a player for each kind of role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMessages {
    /// Shown to impostors.
    pub impostor: String,

    /// Shown to crew members. [`IDENTITY_PLACEHOLDER`] is replaced by the
    /// game's crew identity.
    pub crew: String,
}

impl Default for RoleMessages {
    fn default() -> Self {
        Self {
            impostor: "🟥 YOU ARE THE IMPOSTOR.".to_string(),
            crew: "🟩 You are {identity}, a professional football player. \
                   Train, play fair and find the impostor."
                .to_string(),
        }
    }
}

impl RoleMessages {
    /// Renders the message for `role`.
    pub fn render(&self, role: &Role) -> String {
        match role {
            Role::Impostor => self.impostor.clone(),
            Role::Crew(identity) => {
                self.crew.replace(IDENTITY_PLACEHOLDER, identity)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// RevealGate
// ---------------------------------------------------------------------------

/// Looks up a token in the live game, marks it viewed, and phrases the
/// result for the player.
#[derive(Debug, Clone)]
pub struct RevealGate {
    store: SessionStore,
    messages: RoleMessages,
}

impl RevealGate {
    pub fn new(store: SessionStore, messages: RoleMessages) -> Self {
        Self { store, messages }
    }

    /// Marks the token's record as viewed and returns it.
    ///
    /// Idempotent: revealing twice leaves `viewed == true`. Runs under the
    /// store's read lock, so it can never race a game replacement into a
    /// half-updated state.
    ///
    /// # Errors
    /// [`RevealError::NotFound`] if the token isn't part of the current
    /// game. Nothing is modified in that case.
    pub async fn record_view(
        &self,
        token: &Token,
    ) -> Result<PlayerRecord, RevealError> {
        let current = self.store.read().await;
        let session = current.as_ref().ok_or(RevealError::NotFound)?;

        let record =
            session.mark_viewed(token).ok_or(RevealError::NotFound)?;

        tracing::debug!(
            game_id = %session.id(),
            token = token.fingerprint(),
            player = %record.display_name,
            "role viewed"
        );
        Ok(record)
    }

    /// The inspection path: mark viewed, then return what to show.
    ///
    /// # Errors
    /// [`RevealError::NotFound`] for unknown or stale tokens.
    pub async fn reveal(
        &self,
        token: &Token,
    ) -> Result<RevealPayload, RevealError> {
        let record = self.record_view(token).await?;
        Ok(RevealPayload {
            message: self.messages.render(&record.role),
            display_name: record.display_name,
            viewed: record.viewed,
        })
    }

    /// The explicit confirmation path. Same effect as [`reveal`], but
    /// returns the record rather than the rendered message.
    ///
    /// [`reveal`]: Self::reveal
    ///
    /// # Errors
    /// [`RevealError::NotFound`] for unknown or stale tokens.
    pub async fn confirm_viewed(
        &self,
        token: &Token,
    ) -> Result<PlayerRecord, RevealError> {
        self.record_view(token).await
    }

    pub fn messages(&self) -> &RoleMessages {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GameSession, Seat};

    async fn gate_with_game() -> RevealGate {
        let store = SessionStore::new();
        let mut session = GameSession::new("Haaland");
        session.add_player("Player 1", Token::new("imp"), Seat::Impostor).unwrap();
        for (i, t) in ["c1", "c2", "c3"].iter().enumerate() {
            session
                .add_player(format!("Player {}", i + 2), Token::new(*t), Seat::Crew)
                .unwrap();
        }
        store.replace(session).await;
        RevealGate::new(store, RoleMessages::default())
    }

    #[test]
    fn test_render_crew_substitutes_identity() {
        let msg = RoleMessages::default().render(&Role::Crew("Messi".into()));
        assert!(msg.contains("You are Messi"));
        assert!(!msg.contains(IDENTITY_PLACEHOLDER));
    }

    #[test]
    fn test_render_impostor_uses_impostor_text() {
        let messages = RoleMessages {
            impostor: "sus".into(),
            crew: "crew {identity}".into(),
        };
        assert_eq!(messages.render(&Role::Impostor), "sus");
    }

    #[tokio::test]
    async fn test_reveal_marks_viewed_and_phrases_role() {
        let gate = gate_with_game().await;

        let payload = gate.reveal(&Token::new("imp")).await.unwrap();

        assert_eq!(payload.display_name, "Player 1");
        assert_eq!(payload.message, RoleMessages::default().impostor);
        assert!(payload.viewed);
    }

    #[tokio::test]
    async fn test_reveal_twice_stays_viewed() {
        let gate = gate_with_game().await;
        let token = Token::new("c2");

        gate.reveal(&token).await.unwrap();
        let again = gate.reveal(&token).await.unwrap();

        assert!(again.viewed);
        let record = gate.store.lookup(&token).await.unwrap();
        assert!(record.viewed);
    }

    #[tokio::test]
    async fn test_reveal_unknown_token_changes_nothing() {
        let gate = gate_with_game().await;

        let result = gate.reveal(&Token::new("bogus")).await;

        assert_eq!(result, Err(RevealError::NotFound));
        let roster = gate.store.current_roster().await;
        assert!(roster.iter().all(|e| !e.viewed));
    }

    #[tokio::test]
    async fn test_reveal_without_any_game_is_not_found() {
        let gate = RevealGate::new(SessionStore::new(), RoleMessages::default());

        let result = gate.reveal(&Token::new("anything")).await;

        assert_eq!(result, Err(RevealError::NotFound));
    }

    #[tokio::test]
    async fn test_confirm_viewed_marks_without_prior_reveal() {
        let gate = gate_with_game().await;

        let record = gate.confirm_viewed(&Token::new("c1")).await.unwrap();

        assert!(record.viewed);
        assert_eq!(record.role, Role::Crew("Haaland".into()));
    }
}
