//! Per-connection handler: request decoding and dispatch.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! There is no handshake: holding a token is the only credential, and it
//! travels inside each `Reveal` / `ConfirmViewed` request. The flow is a
//! plain loop:
//!
//!   1. Receive a frame (or give up after the idle timeout)
//!   2. Decode an `Envelope`; reply `Error { 400 }` if that fails
//!   3. Dispatch the request to the [`GameService`]
//!   4. Send the response with `reply_to` set to the request's `seq`

use std::sync::Arc;
use std::time::Instant;

use impostor_protocol::{
    Codec, Envelope, Payload, ProtocolError, Request, Response, Token,
};
use impostor_roles::{GameRequest, RoleError};
use impostor_session::RevealError;
use impostor_transport::{Connection, WebSocketConnection};

use crate::server::ServerState;
use crate::{GameService, ImpostorError};

/// Bad input: undecodable frame, invalid counts or names.
const BAD_REQUEST: u16 = 400;
/// Unknown or stale token.
const NOT_FOUND: u16 = 404;
/// The server failed to deal a game it considered valid.
const INTERNAL_ERROR: u16 = 500;

/// What to do after a request has been handled.
enum Outcome {
    Reply(Response),
    Close,
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ImpostorError> {
    let conn_id = conn.id();
    let peer = conn.peer_addr();
    tracing::debug!(%conn_id, %peer, "handling new connection");

    let mut seq: u64 = 1;
    let start = Instant::now();

    loop {
        let data = match tokio::time::timeout(state.idle_timeout, conn.recv()).await {
            Ok(Ok(Some(data))) => data,
            Ok(Ok(None)) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Ok(Err(e)) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
            Err(_) => {
                tracing::debug!(%conn_id, "connection idle, closing");
                let _ = conn.close().await;
                break;
            }
        };

        let envelope: Envelope = match state.codec.decode(&data) {
            Ok(env) => env,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode envelope");
                let response = Response::Error {
                    code: BAD_REQUEST,
                    message: format!("invalid request: {e}"),
                };
                send_response(&conn, &state.codec, response, None, &mut seq, &start)
                    .await?;
                continue;
            }
        };

        let request = match envelope.payload {
            Payload::Request(request) => request,
            Payload::Response(_) => {
                let e = ProtocolError::InvalidMessage("expected a request".into());
                let response = error_response(BAD_REQUEST, &e);
                send_response(
                    &conn,
                    &state.codec,
                    response,
                    Some(envelope.seq),
                    &mut seq,
                    &start,
                )
                .await?;
                continue;
            }
        };

        match dispatch(&state.service, request, &start).await {
            Outcome::Reply(response) => {
                send_response(
                    &conn,
                    &state.codec,
                    response,
                    Some(envelope.seq),
                    &mut seq,
                    &start,
                )
                .await?;
            }
            Outcome::Close => {
                let _ = conn.close().await;
                break;
            }
        }
    }

    Ok(())
}

/// Runs one request against the service.
///
/// Rejections become `Error` responses; nothing here ends the connection
/// except an explicit `Disconnect`.
async fn dispatch(service: &GameService, request: Request, start: &Instant) -> Outcome {
    let response = match request {
        Request::NewGame {
            players,
            impostors,
            names,
        } => {
            let game = GameRequest {
                players: players as usize,
                impostors: impostors as usize,
                names,
            };
            match service.new_game(&game).await {
                Ok(players) => Response::GameCreated { players },
                Err(RoleError::Invalid(e)) => error_response(BAD_REQUEST, &e),
                Err(e @ RoleError::Session(_)) => {
                    tracing::error!(error = %e, "failed to deal game");
                    error_response(INTERNAL_ERROR, &e)
                }
            }
        }

        Request::Roster => Response::Roster {
            players: service.roster().await,
        },

        Request::Reveal { token } => match service.reveal(&token).await {
            Ok(payload) => Response::Role(payload),
            Err(e) => not_found(&token, e),
        },

        Request::ConfirmViewed { token } => match service.confirm_viewed(&token).await {
            Ok(record) => Response::ViewConfirmed {
                display_name: record.display_name,
            },
            Err(e) => not_found(&token, e),
        },

        Request::Heartbeat { client_time } => Response::HeartbeatAck {
            client_time,
            server_time: elapsed_ms(start),
        },

        Request::Disconnect { reason } => {
            tracing::debug!(%reason, "client disconnected");
            return Outcome::Close;
        }
    };

    Outcome::Reply(response)
}

fn not_found(token: &Token, e: RevealError) -> Response {
    tracing::debug!(token = token.fingerprint(), "reveal for unknown token");
    error_response(NOT_FOUND, &e)
}

fn error_response(code: u16, e: &impl std::fmt::Display) -> Response {
    Response::Error {
        code,
        message: e.to_string(),
    }
}

/// Wraps a response in an envelope and sends it.
async fn send_response(
    conn: &WebSocketConnection,
    codec: &impl Codec,
    response: Response,
    reply_to: Option<u64>,
    seq: &mut u64,
    start: &Instant,
) -> Result<(), ImpostorError> {
    let envelope = Envelope::response(next_seq(seq), reply_to, elapsed_ms(start), response);
    let bytes = codec.encode(&envelope)?;
    conn.send(&bytes).await?;
    Ok(())
}

fn elapsed_ms(start: &Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Increments and returns the next sequence number.
fn next_seq(seq: &mut u64) -> u64 {
    let current = *seq;
    *seq += 1;
    current
}

#[cfg(test)]
mod tests {
    use impostor_roles::{GameConfig, RoleAssigner};
    use impostor_session::{RoleMessages, SequentialTokens};

    use super::*;

    fn service() -> GameService {
        let assigner = RoleAssigner::with_seed(GameConfig::default(), 3)
            .with_tokens(SequentialTokens);
        GameService::new(assigner, RoleMessages::default(), None)
    }

    async fn reply(service: &GameService, request: Request) -> Response {
        match dispatch(service, request, &Instant::now()).await {
            Outcome::Reply(response) => response,
            Outcome::Close => panic!("expected a reply"),
        }
    }

    #[test]
    fn test_next_seq_increments() {
        let mut seq = 1;
        assert_eq!(next_seq(&mut seq), 1);
        assert_eq!(next_seq(&mut seq), 2);
        assert_eq!(seq, 3);
    }

    #[tokio::test]
    async fn test_dispatch_new_game_too_few_players_is_bad_request() {
        let service = service();

        let response = reply(
            &service,
            Request::NewGame {
                players: 3,
                impostors: 1,
                names: None,
            },
        )
        .await;

        assert!(matches!(response, Response::Error { code: 400, ref message } if message.contains("too few players")));
        assert!(!service.is_active().await);
    }

    #[tokio::test]
    async fn test_dispatch_reveal_unknown_token_is_not_found() {
        let service = service();

        let response = reply(
            &service,
            Request::Reveal {
                token: "missing".into(),
            },
        )
        .await;

        assert_eq!(
            response,
            Response::Error {
                code: 404,
                message: "invalid or expired link".into()
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_confirm_viewed_returns_display_name() {
        let service = service();
        let Response::GameCreated { players } = reply(
            &service,
            Request::NewGame {
                players: 4,
                impostors: 1,
                names: Some(vec!["Ana".into(), "Bo".into(), "Cy".into(), "Di".into()]),
            },
        )
        .await
        else {
            panic!("expected GameCreated");
        };

        let response = reply(
            &service,
            Request::ConfirmViewed {
                token: players[1].token.clone(),
            },
        )
        .await;

        assert_eq!(
            response,
            Response::ViewConfirmed {
                display_name: "Bo".into()
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_heartbeat_echoes_client_time() {
        let response = reply(&service(), Request::Heartbeat { client_time: 99 }).await;
        assert!(matches!(response, Response::HeartbeatAck { client_time: 99, .. }));
    }

    #[tokio::test]
    async fn test_dispatch_disconnect_closes() {
        let outcome = dispatch(
            &service(),
            Request::Disconnect {
                reason: "bye".into(),
            },
            &Instant::now(),
        )
        .await;
        assert!(matches!(outcome, Outcome::Close));
    }
}
