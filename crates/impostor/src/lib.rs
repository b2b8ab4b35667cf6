//! # Impostor
//!
//! Hidden-role distribution server for local social deduction games.
//!
//! One device creates a game: N players, K impostors. Every player gets a
//! secret link. Opening it shows either "you are the impostor" or the crew
//! identity everyone else shares. The game creator's screen shows who has
//! looked so far. Creating the next game throws the previous one away.
//!
//! The workspace is layered, and this crate ties the layers together:
//!
//! | Layer | Crate |
//! |---|---|
//! | frames over WebSocket | `impostor-transport` |
//! | JSON envelopes | `impostor-protocol` |
//! | live game, reveals | `impostor-session` |
//! | dealing roles | `impostor-roles` |
//! | service + server loop | `impostor` (this crate) |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use impostor::prelude::*;
//!
//! # async fn run() -> Result<(), ImpostorError> {
//! let server = ImpostorServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .link_base("http://192.168.1.20:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! [`GameService`] can also be used on its own, without the network layer.

mod config;
mod error;
mod handler;
mod server;
mod service;

pub use config::{DEFAULT_BIND_ADDR, DEFAULT_IDLE_TIMEOUT, ServerConfig};
pub use error::{ConfigError, ImpostorError};
pub use server::{ImpostorServer, ImpostorServerBuilder};
pub use service::GameService;

pub use impostor_protocol as protocol;
pub use impostor_roles as roles;
pub use impostor_session as session;
pub use impostor_transport as transport;

/// Everything needed to embed or talk to the server.
pub mod prelude {
    pub use crate::{
        ConfigError, GameService, ImpostorError, ImpostorServer,
        ImpostorServerBuilder, ServerConfig,
    };
    pub use impostor_protocol::{
        Codec, Envelope, JsonCodec, Payload, ProtocolError, Request,
        Response, RevealPayload, RosterEntry, RosterLink, Token,
    };
    pub use impostor_roles::{GameConfig, GameRequest, RoleError, ValidationError};
    pub use impostor_session::{
        PlayerRecord, RevealError, Role, RoleMessages, SequentialTokens,
        TokenSource,
    };
    pub use impostor_transport::TransportError;
}
