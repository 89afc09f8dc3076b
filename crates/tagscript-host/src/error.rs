//! Error types for the host side.

use thiserror::Error;

/// Failures of the tag-management surface. These become user-visible chat
/// replies, never panics or silent drops.
#[derive(Debug, Error)]
pub enum TagError {
    #[error("A tag named `{0}` already exists in this scope.")]
    AlreadyExists(String),

    #[error("No tag named `{0}` exists in this scope.")]
    NotFound(String),

    #[error("`{0}` is already taken by another tag or alias.")]
    AliasTaken(String),

    #[error("This scope already holds the maximum of {0} tags.")]
    ScopeFull(usize),

    #[error("That tagscript is {len} characters; the limit is {max}.")]
    ScriptTooLong { len: usize, max: usize },

    #[error("The `{0}` block requires elevated permissions to author.")]
    PrivilegedBlock(String),

    #[error("Invalid tag export: {0}")]
    Import(#[from] serde_json::Error),
}

/// Failures while applying effects through the chat port. Individual effect
/// failures are logged and skipped; they never cancel sibling effects.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("missing permission: {0}")]
    MissingPermission(&'static str),

    #[error("unknown channel `{0}`")]
    UnknownChannel(String),

    #[error("send failed: {0}")]
    Send(String),

    #[error("command dispatch failed: {0}")]
    Dispatch(String),
}
