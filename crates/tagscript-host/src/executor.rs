//! Host-side action executor.
//!
//! Consumes the action record of a rendered [`Response`] and applies effects
//! in a fixed order, so observable behavior never depends on map iteration:
//! requires → blacklist → cooldown → delete → reactu → send → react →
//! commands. Predicate and cooldown failures cancel everything after them;
//! a missing host permission skips that one effect and continues.

use crate::cooldown::CooldownTable;
use crate::invocation::Invocation;
use crate::ports::{ChatPort, MessageId, SendTarget};
use futures::future::join_all;
use std::sync::Arc;
use tagscript_engine::{Response, Target, COMMAND_LIMIT};
use tracing::warn;

pub const DEFAULT_DENIED_RESPONSE: &str = "You are not allowed to use this tag.";
pub const DEFAULT_COOLDOWN_RESPONSE: &str = "This tag is on cooldown.";

/// Why an invocation was cancelled before its body was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Requires,
    Blacklist,
    Cooldown,
}

#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    pub cancelled: Option<CancelReason>,
    pub sent: Option<MessageId>,
    pub commands_dispatched: usize,
}

pub struct ActionExecutor {
    chat: Arc<dyn ChatPort>,
    cooldowns: Arc<CooldownTable>,
    char_limit: usize,
}

impl ActionExecutor {
    pub fn new(chat: Arc<dyn ChatPort>, cooldowns: Arc<CooldownTable>) -> Self {
        ActionExecutor {
            chat,
            cooldowns,
            char_limit: tagscript_engine::DEFAULT_CHAR_LIMIT,
        }
    }

    pub async fn execute(&self, invocation: &Invocation, response: &Response) -> ExecutionOutcome {
        let actions = &response.actions;
        let mut outcome = ExecutionOutcome::default();

        // 1. requires — the invoker must match at least one item.
        if let Some(requires) = &actions.requires {
            let mut allowed = false;
            for item in &requires.items {
                if self.chat.matches_item(invocation, item).await {
                    allowed = true;
                    break;
                }
            }
            if !allowed {
                let message = requires.response.as_deref().unwrap_or(DEFAULT_DENIED_RESPONSE);
                self.reply(invocation, message).await;
                outcome.cancelled = Some(CancelReason::Requires);
                return outcome;
            }
        }

        // 2. blacklist — matching any item cancels.
        if let Some(blacklist) = &actions.blacklist {
            for item in &blacklist.items {
                if self.chat.matches_item(invocation, item).await {
                    let message = blacklist.response.as_deref().unwrap_or(DEFAULT_DENIED_RESPONSE);
                    self.reply(invocation, message).await;
                    outcome.cancelled = Some(CancelReason::Blacklist);
                    return outcome;
                }
            }
        }

        // 3. cooldown, keyed per channel.
        if let Some(cooldown) = &actions.cooldown {
            let key = format!("{}:{}", invocation.channel_id, cooldown.key);
            if let Some(remaining) = self.cooldowns.check_and_set(&key, cooldown.seconds) {
                let message = match &cooldown.response {
                    Some(response) => response.clone(),
                    None => format!("{DEFAULT_COOLDOWN_RESPONSE} Try again in {remaining}s."),
                };
                self.reply(invocation, &message).await;
                outcome.cancelled = Some(CancelReason::Cooldown);
                return outcome;
            }
        }

        // 4. delete the invoking message.
        if actions.delete == Some(true) {
            if let Err(err) = self
                .chat
                .delete_message(invocation.channel_id, invocation.message_id)
                .await
            {
                warn!(%err, "could not delete the invoking message");
            }
        }

        // 5. reactions on the invoking message.
        for emoji in &actions.reactu {
            if let Err(err) = self
                .chat
                .add_reaction(invocation.channel_id, invocation.message_id, emoji)
                .await
            {
                warn!(%err, emoji = %emoji, "could not react to the invoking message");
            }
        }

        // 6. send the rendered body and/or embed.
        let body = trim_codepoints(&response.body, self.char_limit);
        let embed = actions.embed.as_ref().filter(|embed| !embed.is_empty());
        let target = self.resolve_target(invocation, actions.target.as_ref()).await;
        let body = (!body.is_empty()).then_some(body);
        if body.is_some() || embed.is_some() {
            match self.chat.send(&target, body.as_deref(), embed).await {
                Ok(id) => outcome.sent = Some(id),
                Err(err) => warn!(%err, "could not send the rendered tag"),
            }
        }

        // 7. reactions on the reply we just sent.
        if let Some(sent) = outcome.sent {
            for emoji in &actions.reactions {
                if let Err(err) = self
                    .chat
                    .add_reaction(target.channel_id(), sent, emoji)
                    .await
                {
                    warn!(%err, emoji = %emoji, "could not react to the sent message");
                }
            }
        }

        // 8. queued sub-commands, spawned concurrently. Relative order is
        // unspecified; one failure never cancels its siblings.
        let overrides = actions.overrides.unwrap_or_default();
        let silent = actions.silent.unwrap_or(false);
        let mut handles = Vec::new();
        for line in actions.commands.iter().take(COMMAND_LIMIT) {
            let head = line.split_whitespace().next().unwrap_or("");
            if head.eq_ignore_ascii_case(&invocation.command) {
                warn!(command = %line, "refusing re-entrant tag command");
                continue;
            }
            let chat = Arc::clone(&self.chat);
            let invocation = invocation.clone();
            let line = line.clone();
            handles.push(tokio::spawn(async move {
                if let Err(err) = chat
                    .dispatch_command(&invocation, &line, overrides, silent)
                    .await
                {
                    warn!(%err, command = %line, "sub-command failed");
                }
            }));
        }
        outcome.commands_dispatched = handles.len();
        for joined in join_all(handles).await {
            if let Err(err) = joined {
                warn!(%err, "sub-command task panicked");
            }
        }

        outcome
    }

    async fn resolve_target(&self, invocation: &Invocation, target: Option<&Target>) -> SendTarget {
        match target {
            None => SendTarget::Channel(invocation.channel_id),
            Some(Target::Dm) => SendTarget::Dm(invocation.invoker_id),
            Some(Target::Reply) => SendTarget::Reply {
                channel_id: invocation.channel_id,
                message_id: invocation.message_id,
            },
            Some(Target::Channel(identifier)) => {
                match self.chat.resolve_channel(invocation, identifier).await {
                    Some(id) => SendTarget::Channel(id),
                    None => {
                        warn!(identifier = %identifier, "redirect channel not found; using the invoking channel");
                        SendTarget::Channel(invocation.channel_id)
                    }
                }
            }
        }
    }

    /// Predicate and cooldown responses always land as a reply in the
    /// invoking channel, regardless of any redirect.
    async fn reply(&self, invocation: &Invocation, message: &str) {
        let target = SendTarget::Reply {
            channel_id: invocation.channel_id,
            message_id: invocation.message_id,
        };
        if let Err(err) = self.chat.send(&target, Some(message), None).await {
            warn!(%err, "could not send the cancellation response");
        }
    }
}

fn trim_codepoints(body: &str, limit: usize) -> String {
    if body.chars().count() > limit {
        body.chars().take(limit).collect()
    } else {
        body.to_string()
    }
}
