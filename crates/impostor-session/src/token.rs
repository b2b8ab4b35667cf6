//! Token generation: the secret behind each player's link.
//!
//! A token is the only thing standing between a player and everyone
//! else's role, so it must be unguessable and must not be enumerable
//! from other tokens. [`RandomTokens`] draws 128 bits from the
//! thread-local CSPRNG for every call.

use std::sync::atomic::{AtomicU64, Ordering};

use impostor_protocol::Token;
use rand::Rng;

/// Something that can mint player tokens.
///
/// The role engine only ever sees this trait, so tests can plug in a
/// deterministic source while the server uses [`RandomTokens`].
pub trait TokenSource: Send + Sync {
    /// Returns a fresh token. Called once per player per game.
    fn generate(&self) -> Token;
}

impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    fn generate(&self) -> Token {
        (**self).generate()
    }
}

/// Cryptographically random 32-character hex tokens (128 bits).
///
/// `rand::rng()` is the thread-local generator, seeded from the OS and
/// periodically reseeded. At 128 bits, two tokens colliding (or someone
/// guessing a live one) is not a practical concern.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokens;

impl TokenSource for RandomTokens {
    fn generate(&self) -> Token {
        let bytes: [u8; 16] = rand::rng().random();
        Token::new(bytes.iter().map(|b| format!("{b:02x}")).collect::<String>())
    }
}

/// Predictable tokens (`tok-1`, `tok-2`, …) for tests and local demos.
///
/// The counter is process-wide, so two sources never hand out the same
/// token and tokens are never reused across games. Obviously guessable, so
/// never use this for a real game.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialTokens;

static NEXT_SEQUENTIAL_TOKEN: AtomicU64 = AtomicU64::new(1);

impl TokenSource for SequentialTokens {
    fn generate(&self) -> Token {
        let n = NEXT_SEQUENTIAL_TOKEN.fetch_add(1, Ordering::Relaxed);
        Token::new(format!("tok-{n}"))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_random_tokens_are_32_lowercase_hex_chars() {
        let token = RandomTokens.generate();

        assert_eq!(token.as_str().len(), 32);
        assert!(
            token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
            "unexpected characters in {token}"
        );
    }

    #[test]
    fn test_boxed_source_delegates() {
        let boxed: Box<dyn TokenSource> = Box::new(SequentialTokens);
        assert!(boxed.generate().as_str().starts_with("tok-"));
    }

    #[test]
    fn test_random_tokens_do_not_repeat() {
        let tokens: HashSet<Token> =
            (0..1_000).map(|_| RandomTokens.generate()).collect();
        assert_eq!(tokens.len(), 1_000);
    }

    #[test]
    fn test_sequential_tokens_never_repeat_across_sources() {
        let a = SequentialTokens;
        let b = SequentialTokens;

        let first = a.generate();
        let second = b.generate();

        assert_ne!(first, second);
        assert!(first.as_str().starts_with("tok-"));
    }
}
