//! `ImpostorServer` builder and server loop.
//!
//! This is the entry point for running the role server. It ties together
//! all the layers: transport → protocol → service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use impostor_protocol::{Codec, JsonCodec};
use impostor_roles::{GameConfig, RoleAssigner};
use impostor_session::{RoleMessages, TokenSource};
use impostor_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{GameService, ImpostorError, ServerConfig};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The game
/// itself lives in [`GameService`], which does its own locking.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) service: GameService,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
}

/// Builder for configuring and starting a server.
///
/// # Example
///
/// ```rust,ignore
/// use impostor::prelude::*;
///
/// let server = ImpostorServer::builder()
///     .bind("0.0.0.0:8080")
///     .game_config(GameConfig { max_players: Some(12), ..GameConfig::default() })
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct ImpostorServerBuilder {
    config: ServerConfig,
    seed: Option<u64>,
    tokens: Option<Box<dyn TokenSource>>,
}

impl ImpostorServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ServerConfig::default())
    }

    /// Starts from an existing configuration, e.g.
    /// [`ServerConfig::from_env`].
    pub fn from_config(config: ServerConfig) -> Self {
        Self {
            config,
            seed: None,
            tokens: None,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Makes new-game responses carry full links under `base`.
    pub fn link_base(mut self, base: &str) -> Self {
        self.config.link_base = Some(base.to_string());
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Sets player limits and the crew identity pool.
    pub fn game_config(mut self, game: GameConfig) -> Self {
        self.config.game = game;
        self
    }

    /// Sets the text shown to impostors and crew.
    pub fn role_messages(mut self, messages: RoleMessages) -> Self {
        self.config.messages = messages;
        self
    }

    /// Seeds the role RNG, making deals reproducible. For tests.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replaces the token source. For tests.
    pub fn token_source(mut self, tokens: impl TokenSource + 'static) -> Self {
        self.tokens = Some(Box::new(tokens));
        self
    }

    /// Binds the listener and assembles the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    ///
    /// # Errors
    /// [`ImpostorError::Transport`] if the address can't be bound.
    pub async fn build(self) -> Result<ImpostorServer<JsonCodec>, ImpostorError> {
        let ServerConfig {
            bind_addr,
            link_base,
            idle_timeout,
            game,
            messages,
        } = self.config;

        let mut assigner = match self.seed {
            Some(seed) => RoleAssigner::with_seed(game, seed),
            None => RoleAssigner::new(game),
        };
        if let Some(tokens) = self.tokens {
            assigner = assigner.with_tokens(tokens);
        }

        let transport = WebSocketTransport::bind(&bind_addr).await?;

        let state = Arc::new(ServerState {
            service: GameService::new(assigner, messages, link_base),
            codec: JsonCodec,
            idle_timeout,
        });

        Ok(ImpostorServer { transport, state })
    }
}

impl Default for ImpostorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound role server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ImpostorServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl ImpostorServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ImpostorServerBuilder {
        ImpostorServerBuilder::new()
    }
}

impl<C> ImpostorServer<C>
where
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The game handle this server dispatches into.
    pub fn service(&self) -> GameService {
        self.state.service.clone()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), ImpostorError> {
        self.run_until(std::future::pending()).await
    }

    /// Runs the accept loop until `shutdown` completes.
    ///
    /// Each accepted connection gets its own task. Connections that are
    /// already open keep running after shutdown until their peers leave
    /// or go idle.
    pub async fn run_until(
        mut self,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), ImpostorError> {
        tracing::info!("impostor server running");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => break,
                accepted = self.transport.accept() => match accepted {
                    Ok(conn) => {
                        let state = Arc::clone(&self.state);
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(conn, state).await {
                                tracing::debug!(
                                    error = %e,
                                    "connection ended with error"
                                );
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "accept failed");
                    }
                },
            }
        }

        self.transport.shutdown().await?;
        tracing::info!("impostor server stopped");
        Ok(())
    }
}
