//! Wire protocol for the impostor role server.
//!
//! - **Types** ([`Envelope`], [`Request`], [`Response`], [`Token`]) — the
//!   structures that travel on the wire.
//! - **Codec** ([`Codec`], [`JsonCodec`]) — how they become bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Service (game session)
//! ```
//!
//! The role engine crates also use [`Token`], [`RosterEntry`] and
//! [`RevealPayload`] directly so the core and the wire never drift apart.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Envelope, Payload, Request, Response, RevealPayload, RosterEntry,
    RosterLink, Token,
};
