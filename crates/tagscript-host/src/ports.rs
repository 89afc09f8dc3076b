//! The chat port: the only place effects reach the outside world.
//!
//! The executor operates exclusively through this trait, so backends are
//! pluggable — a real chat gateway in production, [`MemoryChat`] in tests.

use crate::error::HostError;
use crate::invocation::Invocation;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tagscript_engine::{Embed, Overrides};

pub type MessageId = u64;

/// Where a message goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendTarget {
    Channel(u64),
    Dm(u64),
    Reply {
        channel_id: u64,
        message_id: MessageId,
    },
}

impl SendTarget {
    /// The channel reactions to this message land in. A DM conversation is
    /// keyed by the recipient.
    pub fn channel_id(&self) -> u64 {
        match self {
            SendTarget::Channel(id) => *id,
            SendTarget::Dm(user) => *user,
            SendTarget::Reply { channel_id, .. } => *channel_id,
        }
    }
}

#[async_trait]
pub trait ChatPort: Send + Sync {
    /// Send `body` and/or `embed` to `target`, returning the new message id.
    async fn send(
        &self,
        target: &SendTarget,
        body: Option<&str>,
        embed: Option<&Embed>,
    ) -> Result<MessageId, HostError>;

    async fn delete_message(&self, channel_id: u64, message_id: MessageId)
        -> Result<(), HostError>;

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<(), HostError>;

    /// Whether a require/blacklist item matches the invoker's roles or the
    /// invoking channel.
    async fn matches_item(&self, invocation: &Invocation, item: &str) -> bool;

    /// Resolve a redirect channel identifier (`#name`, a bare name, or a
    /// numeric id) to a channel.
    async fn resolve_channel(&self, invocation: &Invocation, identifier: &str) -> Option<u64>;

    /// Re-enter the host's command dispatch with privilege `overrides`
    /// applied; `silent` suppresses the sub-command's own output.
    async fn dispatch_command(
        &self,
        invocation: &Invocation,
        line: &str,
        overrides: Overrides,
        silent: bool,
    ) -> Result<(), HostError>;
}

/// Every effect a [`MemoryChat`] performed, in application order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEffect {
    Sent {
        target: SendTarget,
        body: Option<String>,
        embed: Option<Embed>,
        id: MessageId,
    },
    Deleted {
        channel_id: u64,
        message_id: MessageId,
    },
    Reacted {
        channel_id: u64,
        message_id: MessageId,
        emoji: String,
    },
    Dispatched {
        line: String,
        overrides: Overrides,
        silent: bool,
    },
}

/// In-memory chat backend recording every effect, for tests.
#[derive(Default)]
pub struct MemoryChat {
    next_id: AtomicU64,
    effects: Mutex<Vec<ChatEffect>>,
    channels: Mutex<HashMap<String, u64>>,
    deny_delete: AtomicBool,
    failing_commands: Mutex<Vec<String>>,
}

impl MemoryChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named channel for redirect resolution.
    pub fn add_channel(&self, name: &str, id: u64) {
        self.channels.lock().unwrap().insert(name.to_string(), id);
    }

    /// Make delete_message fail with a missing-permission error.
    pub fn deny_delete(&self) {
        self.deny_delete.store(true, Ordering::SeqCst);
    }

    /// Make dispatching this exact command line fail.
    pub fn fail_command(&self, line: &str) {
        self.failing_commands.lock().unwrap().push(line.to_string());
    }

    pub fn effects(&self) -> Vec<ChatEffect> {
        self.effects.lock().unwrap().clone()
    }

    pub fn sent_bodies(&self) -> Vec<String> {
        self.effects()
            .into_iter()
            .filter_map(|effect| match effect {
                ChatEffect::Sent { body, .. } => body,
                _ => None,
            })
            .collect()
    }

    fn record(&self, effect: ChatEffect) {
        self.effects.lock().unwrap().push(effect);
    }
}

#[async_trait]
impl ChatPort for MemoryChat {
    async fn send(
        &self,
        target: &SendTarget,
        body: Option<&str>,
        embed: Option<&Embed>,
    ) -> Result<MessageId, HostError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.record(ChatEffect::Sent {
            target: target.clone(),
            body: body.map(String::from),
            embed: embed.cloned(),
            id,
        });
        Ok(id)
    }

    async fn delete_message(
        &self,
        channel_id: u64,
        message_id: MessageId,
    ) -> Result<(), HostError> {
        if self.deny_delete.load(Ordering::SeqCst) {
            return Err(HostError::MissingPermission("manage messages"));
        }
        self.record(ChatEffect::Deleted {
            channel_id,
            message_id,
        });
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: MessageId,
        emoji: &str,
    ) -> Result<(), HostError> {
        self.record(ChatEffect::Reacted {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn matches_item(&self, invocation: &Invocation, item: &str) -> bool {
        let item = item.trim();
        if invocation.invoker_roles.iter().any(|role| role == item) {
            return true;
        }
        let channel = item.strip_prefix('#').unwrap_or(item);
        channel == invocation.channel_name
            || item.parse::<u64>().map_or(false, |id| id == invocation.channel_id)
    }

    async fn resolve_channel(&self, invocation: &Invocation, identifier: &str) -> Option<u64> {
        let identifier = identifier.trim();
        if let Ok(id) = identifier.parse::<u64>() {
            return Some(id);
        }
        let name = identifier.strip_prefix('#').unwrap_or(identifier);
        if name == invocation.channel_name {
            return Some(invocation.channel_id);
        }
        self.channels.lock().unwrap().get(name).copied()
    }

    async fn dispatch_command(
        &self,
        _invocation: &Invocation,
        line: &str,
        overrides: Overrides,
        silent: bool,
    ) -> Result<(), HostError> {
        if self.failing_commands.lock().unwrap().iter().any(|l| l == line) {
            return Err(HostError::Dispatch(format!("command `{line}` failed")));
        }
        self.record(ChatEffect::Dispatched {
            line: line.to_string(),
            overrides,
            silent,
        });
        Ok(())
    }
}
