//! Core protocol types for the wire format.
//!
//! Everything in this module travels "on the wire": the game creator's
//! screen and each player's phone exchange these structures as JSON.
//!
//! There are two conversations happening over the same protocol:
//!
//! - the **game creator** asks for a new game and watches the roster,
//! - each **player** opens their secret link and reveals their role.
//!
//! Neither side needs an account: possession of a [`Token`] is the
//! only credential a player ever presents.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// The secret capability key handed to one player.
///
/// A newtype around `String` so a token can't be confused with a display
/// name or a crew identity in function signatures. It is opaque: nothing
/// about the player or the order of creation can be read from it.
///
/// `#[serde(transparent)]` keeps the JSON form a plain string:
/// `Token("9f3a…")` becomes `"9f3a…"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Wraps an already-generated token string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A short, non-secret prefix for log lines.
    ///
    /// Logging full tokens would let anyone with log access open every
    /// player's role, so log fields use this instead.
    pub fn fingerprint(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(6)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

// ---------------------------------------------------------------------------
// Roster views
// ---------------------------------------------------------------------------

/// One row of the administrative roster.
///
/// Deliberately carries neither the token nor the role: the roster is
/// shown on a shared screen, so it may only say *who* has opened their
/// link, never *what* they saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub display_name: String,
    pub viewed: bool,
}

/// One secret link, returned once to the game creator right after a game
/// is created so they can hand each player their own link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterLink {
    pub display_name: String,
    pub token: Token,
    /// Full shareable URL, present when the server is configured with a
    /// link base (e.g. `http://192.168.1.20:8080`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// What a player sees when they open their link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealPayload {
    pub display_name: String,
    /// Role-dependent text: impostor phrasing or the crew identity.
    pub message: String,
    /// Always `true` after a successful reveal, since revealing marks it.
    pub viewed: bool,
}

// ---------------------------------------------------------------------------
// Request — client → server
// ---------------------------------------------------------------------------

/// Everything a client can ask the server to do.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
///   `{ "type": "NewGame", "players": 6, "impostors": 1 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Game creator: deal a fresh game, discarding the current one.
    ///
    /// `names` is optional; without it players are named
    /// `Player 1 … Player N`.
    NewGame {
        players: u32,
        impostors: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        names: Option<Vec<String>>,
    },

    /// Game creator: who has opened their link so far?
    Roster,

    /// Player: show me my role. Opening counts as viewing.
    Reveal { token: Token },

    /// Player: I have seen my role (explicit confirmation).
    ConfirmViewed { token: Token },

    /// Keep-alive. `client_time` is echoed back untouched.
    Heartbeat { client_time: u64 },

    /// "I'm done, close the connection."
    Disconnect { reason: String },
}

// ---------------------------------------------------------------------------
// Response — server → client
// ---------------------------------------------------------------------------

/// Everything the server can answer with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    /// A new game exists. Links are listed in roster order.
    GameCreated { players: Vec<RosterLink> },

    /// Current roster, in creation order. Empty before the first game.
    Roster { players: Vec<RosterEntry> },

    /// The caller's role.
    Role(RevealPayload),

    /// Confirmation that the role was marked as viewed.
    ViewConfirmed { display_name: String },

    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Something was rejected. `code` follows HTTP conventions:
    /// 400 for bad input, 404 for an invalid or expired link.
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Payload + Envelope
// ---------------------------------------------------------------------------

/// Either direction's content.
///
/// Adjacently tagged: `{ "type": "Request", "data": { "type": "Roster" } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    Request(Request),
    Response(Response),
}

/// The top-level wire frame. Every message is an `Envelope`.
///
/// ```text
/// ┌─────────────────────────────────┐
/// │ seq: 7                          │  ← sender's counter
/// │ reply_to: 3                     │  ← request seq being answered
/// │ timestamp: 1520                 │  ← ms since sender start
/// │ ┌─────────────────────────────┐ │
/// │ │ payload: Response(Roster)   │ │
/// │ └─────────────────────────────┘ │
/// └─────────────────────────────────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub seq: u64,

    /// On responses, the `seq` of the request being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<u64>,

    #[serde(default)]
    pub timestamp: u64,

    pub payload: Payload,
}

impl Envelope {
    /// Builds a request envelope. Clients usually only need this.
    pub fn request(seq: u64, request: Request) -> Self {
        Self {
            seq,
            reply_to: None,
            timestamp: 0,
            payload: Payload::Request(request),
        }
    }

    /// Builds a response envelope answering request `reply_to`.
    pub fn response(
        seq: u64,
        reply_to: Option<u64>,
        timestamp: u64,
        response: Response,
    ) -> Self {
        Self {
            seq,
            reply_to,
            timestamp,
            payload: Payload::Response(response),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
