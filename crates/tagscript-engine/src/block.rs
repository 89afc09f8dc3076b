//! Block plugin protocol.
//!
//! Every block implements two operations: `accepts`, a cheap side-effect-free
//! predicate over the current verb's declaration, and `process`, which
//! produces the replacement text. Blocks are registered by passing instances
//! to the [`Interpreter`](crate::Interpreter) constructor; registration order
//! is the `accepts` probe order and the first acceptor wins.

use crate::clock::Clock;
use crate::response::Response;
use crate::verb::Verb;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

pub trait Block: Send + Sync {
    /// Whether this block claims the current verb. Must not mutate anything.
    fn accepts(&self, ctx: &Context<'_>) -> bool;

    /// Produce the replacement text. `None` declines after inspection (the
    /// verb is rewritten literally); `Some(String::new())` consumes the verb
    /// without contributing output — how action-only blocks work.
    fn process(&self, ctx: &mut Context<'_>) -> Option<String>;
}

/// Short-lived state threaded through blocks for one verb dispatch. Holds
/// the current verb (re-parsed with inner replacements already substituted),
/// the mutable response, and the injected randomness/time sources.
pub struct Context<'a> {
    pub(crate) verb: &'a Verb,
    pub(crate) dec: &'a str,
    pub(crate) response: &'a mut Response,
    pub(crate) source: &'a str,
    pub(crate) rng: &'a mut StdRng,
    pub(crate) invocation_seed: u64,
    pub(crate) clock: &'a dyn Clock,
}

impl<'a> Context<'a> {
    pub fn verb(&self) -> &Verb {
        self.verb
    }

    /// The declaration, lowercased once per dispatch.
    pub fn declaration(&self) -> &str {
        self.dec
    }

    pub fn parameter(&self) -> Option<&str> {
        self.verb.parameter.as_deref()
    }

    pub fn payload(&self) -> Option<&str> {
        self.verb.payload.as_deref()
    }

    /// The original, unexpanded source string of the whole invocation.
    pub fn source(&self) -> &str {
        self.source
    }

    pub fn response(&self) -> &Response {
        self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        self.response
    }

    /// The per-invocation RNG. Draws advance shared state, so unseeded
    /// random blocks are deterministic in lex order under a pinned seed.
    pub fn rng_mut(&mut self) -> &mut StdRng {
        self.rng
    }

    /// A derived RNG for seeded choices: the same `extra` seed yields the
    /// same stream within one invocation without disturbing the shared RNG.
    pub fn seeded_rng(&self, extra: &str) -> StdRng {
        let mut hasher = DefaultHasher::new();
        self.invocation_seed.hash(&mut hasher);
        extra.hash(&mut hasher);
        StdRng::seed_from_u64(hasher.finish())
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock
    }
}
