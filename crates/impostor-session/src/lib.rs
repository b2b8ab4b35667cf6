//! Game session state for the impostor role server.
//!
//! This crate owns everything that exists *after* roles are dealt:
//!
//! 1. **Tokens** — the secret per-player link keys ([`TokenSource`])
//! 2. **Sessions** — one game's roster, roles and view flags
//!    ([`GameSession`])
//! 3. **Storage** — the single live game, swapped atomically
//!    ([`SessionStore`])
//! 4. **Reveals** — token in, role message out ([`RevealGate`])
//!
//! Dealing roles is the job of `impostor-roles`, which builds a
//! `GameSession` and hands it to the store.

mod error;
mod record;
mod reveal;
mod store;
mod token;

pub use error::{RevealError, SessionError};
pub use record::{GameId, GameSession, PlayerRecord, Role, Seat};
pub use reveal::{IDENTITY_PLACEHOLDER, RevealGate, RoleMessages};
pub use store::SessionStore;
pub use token::{RandomTokens, SequentialTokens, TokenSource};
