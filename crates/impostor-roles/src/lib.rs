//! Role assignment for the impostor role server.
//!
//! Given a player count and an impostor count, this crate deals a
//! complete [`GameSession`](impostor_session::GameSession): which seats
//! are impostors, which crew identity everyone else shares, and one
//! secret token per player.
//!
//! # Key types
//!
//! - [`GameRequest`] — what the game creator asked for
//! - [`GameConfig`] — limits and the crew identity pool
//! - [`RoleAssigner`] — config + RNG + token source, ready to deal
//! - [`create_session`] — the same thing as a free function with the
//!   randomness passed in explicitly
//! - [`ValidationError`] / [`RoleError`] — why a request was rejected

mod assign;
mod config;
mod error;
mod sample;

pub use assign::{GameRequest, RoleAssigner, create_session};
pub use config::{
    DEFAULT_CREW_POOL, DEFAULT_MAX_PLAYERS, DEFAULT_MIN_PLAYERS, GameConfig,
};
pub use error::{RoleError, ValidationError};
pub use sample::sample_indices;
