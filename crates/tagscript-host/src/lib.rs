//! tagscript-host: the host side of the TagScript engine.
//!
//! The engine renders a [`Response`](tagscript_engine::Response); this crate
//! applies it to an incoming chat invocation:
//! - [`ChatPort`] — the async seam effects go through (pluggable backends,
//!   [`MemoryChat`] in tests)
//! - [`ActionExecutor`] — applies the action record in a fixed order
//! - [`TagStore`] — scoped, alias-aware tag records with per-scope limits
//! - [`CooldownTable`] — keyed rate limits under an injectable clock
//! - [`TagCommands`] — the add/edit/alias/… management surface
//! - [`TagRunner`] — resolve → seed → render → execute glue

pub mod commands;
pub mod cooldown;
pub mod error;
pub mod executor;
pub mod invocation;
pub mod ports;
pub mod runner;
pub mod store;

pub use commands::{validate_script, AuthorCtx, CommandReply, TagCommands};
pub use cooldown::CooldownTable;
pub use error::{HostError, TagError};
pub use executor::{
    ActionExecutor, CancelReason, ExecutionOutcome, DEFAULT_COOLDOWN_RESPONSE,
    DEFAULT_DENIED_RESPONSE,
};
pub use invocation::Invocation;
pub use ports::{ChatEffect, ChatPort, MemoryChat, MessageId, SendTarget};
pub use runner::{seed_variables, RunOutcome, TagRunner};
pub use store::{Scope, Tag, TagStore, MAX_SCRIPT_LEN, MAX_TAGS_PER_SCOPE};
