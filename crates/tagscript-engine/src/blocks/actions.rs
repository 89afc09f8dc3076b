//! Side-effect blocks. None of these touch the outside world: each records
//! a request on the typed action record and the host executor applies them
//! after rendering, in its fixed order.

use crate::action::{Cooldown, Embed, Overrides, Restriction, Target, COMMAND_LIMIT};
use crate::block::{Block, Context};
use crate::blocks::parse_flag;

/// `{command:payload}` — queues a sub-command for the host dispatcher, up to
/// three per invocation.
pub struct CommandBlock;

impl Block for CommandBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "command" | "c" | "com")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let command = ctx.payload()?.trim().to_string();
        if command.is_empty() {
            return None;
        }
        let actions = &mut ctx.response_mut().actions;
        if actions.commands.len() >= COMMAND_LIMIT {
            return Some(format!("`COMMAND LIMIT REACHED ({COMMAND_LIMIT})`"));
        }
        actions.commands.push(command);
        Some(String::new())
    }
}

/// `{override}` relaxes admin, mod, and user-permission checks for the
/// queued sub-commands; `{override(admin)}` relaxes one level. Owner checks
/// are never relaxed. Authoring this block requires an elevated author —
/// enforced by the host at tag-creation time.
pub struct OverrideBlock;

impl Block for OverrideBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "override"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let mut overrides = ctx
            .response()
            .actions
            .overrides
            .unwrap_or_default();
        match ctx.parameter().map(str::trim) {
            None | Some("") => {
                overrides.admin = true;
                overrides.moderator = true;
                overrides.permissions = true;
            }
            Some("admin") => overrides.admin = true,
            Some("mod") => overrides.moderator = true,
            Some("permissions") | Some("perms") => overrides.permissions = true,
            Some(_) => return None,
        }
        ctx.response_mut().actions.overrides = Some(overrides);
        Some(String::new())
    }
}

fn parse_items(parameter: &str) -> Option<Vec<String>> {
    let items: Vec<String> = parameter
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// `{require(Admin,#staff):sorry}` — the invoker must match at least one
/// item or the executor cancels with the payload response.
pub struct RequireBlock;

impl Block for RequireBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "require" | "whitelist")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let items = parse_items(ctx.parameter()?)?;
        let response = ctx.payload().map(str::to_string);
        ctx.response_mut().actions.requires = Some(Restriction { items, response });
        Some(String::new())
    }
}

/// `{blacklist(Muted):no}` — matching any item cancels the invocation.
pub struct BlacklistBlock;

impl Block for BlacklistBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "blacklist"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let items = parse_items(ctx.parameter()?)?;
        let response = ctx.payload().map(str::to_string);
        ctx.response_mut().actions.blacklist = Some(Restriction { items, response });
        Some(String::new())
    }
}

/// `{cooldown(60):key|try later}` — keyed rate limit; the executor scopes
/// the key per channel.
pub struct CooldownBlock;

impl Block for CooldownBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "cooldown"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let seconds = ctx.parameter()?.trim().parse::<u64>().ok()?;
        let payload = ctx.payload().unwrap_or("");
        let (key, response) = match payload.split_once('|') {
            Some((key, response)) => (key.trim().to_string(), Some(response.to_string())),
            None => (payload.trim().to_string(), None),
        };
        ctx.response_mut().actions.cooldown = Some(Cooldown {
            seconds,
            key,
            response,
        });
        Some(String::new())
    }
}

/// `{delete}` — remove the invoking message before replying.
pub struct DeleteBlock;

impl Block for DeleteBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "delete" | "del")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let flag = parse_flag(ctx.parameter());
        ctx.response_mut().actions.delete = Some(flag);
        Some(String::new())
    }
}

/// `{silent}` — queued sub-commands produce no host output.
pub struct SilentBlock;

impl Block for SilentBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        matches!(ctx.declaration(), "silent" | "silence")
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let flag = parse_flag(ctx.parameter());
        ctx.response_mut().actions.silent = Some(flag);
        Some(String::new())
    }
}

fn parse_emoji_list(ctx: &Context<'_>) -> Option<Vec<String>> {
    let list = ctx.parameter().or_else(|| ctx.payload())?;
    let emoji: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(String::from)
        .collect();
    // Over the cap the verb stays visible to the author instead of being
    // silently truncated.
    if emoji.is_empty() || emoji.len() > 5 {
        None
    } else {
        Some(emoji)
    }
}

/// `{react(👍,🎉)}` — reactions added to the bot's reply.
pub struct ReactBlock;

impl Block for ReactBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "react"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let emoji = parse_emoji_list(ctx)?;
        ctx.response_mut().actions.reactions = emoji;
        Some(String::new())
    }
}

/// `{reactu(👍)}` — reactions added to the invoking message.
pub struct ReactUBlock;

impl Block for ReactUBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "reactu"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let emoji = parse_emoji_list(ctx)?;
        ctx.response_mut().actions.reactu = emoji;
        Some(String::new())
    }
}

/// `{redirect(dm)}`, `{redirect(reply)}`, or `{redirect(#general)}`.
pub struct RedirectBlock;

impl Block for RedirectBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "redirect"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let target = ctx.parameter()?.trim();
        if target.is_empty() {
            return None;
        }
        let target = match target.to_lowercase().as_str() {
            "dm" => Target::Dm,
            "reply" => Target::Reply,
            _ => Target::Channel(target.to_string()),
        };
        ctx.response_mut().actions.target = Some(target);
        Some(String::new())
    }
}

/// `{embed:{"title": "..."}}` — the payload is a JSON embed document,
/// validated before it is recorded. Malformed JSON leaves the verb literal.
pub struct EmbedBlock;

impl Block for EmbedBlock {
    fn accepts(&self, ctx: &Context<'_>) -> bool {
        ctx.declaration() == "embed"
    }

    fn process(&self, ctx: &mut Context<'_>) -> Option<String> {
        let payload = ctx.payload()?.trim();
        let embed: Embed = serde_json::from_str(payload).ok()?;
        if !embed.is_valid() {
            return None;
        }
        ctx.response_mut().actions.embed = Some(embed);
        Some(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocks::default_blocks;
    use crate::interpreter::Interpreter;
    use std::collections::HashMap;

    fn process(source: &str) -> crate::response::Response {
        Interpreter::new(default_blocks()).process(source, HashMap::new())
    }

    #[test]
    fn delete_and_silent_flags() {
        let response = process("{delete}hi");
        assert_eq!(response.body, "hi");
        assert_eq!(response.actions.delete, Some(true));

        let response = process("{delete(no)}{silent}");
        assert_eq!(response.actions.delete, Some(false));
        assert_eq!(response.actions.silent, Some(true));
    }

    #[test]
    fn command_queue_caps_at_three() {
        let response = process("{c:one}{c:two}{c:three}{c:four}");
        assert_eq!(response.actions.commands, ["one", "two", "three"]);
        assert_eq!(response.body, "`COMMAND LIMIT REACHED (3)`");
    }

    #[test]
    fn override_levels() {
        let response = process("{override}");
        let overrides = response.actions.overrides.unwrap();
        assert!(overrides.admin && overrides.moderator && overrides.permissions);

        let response = process("{override(admin)}");
        let overrides = response.actions.overrides.unwrap();
        assert!(overrides.admin && !overrides.moderator && !overrides.permissions);

        let response = process("{override(owner)}");
        assert!(response.actions.overrides.is_none());
        assert_eq!(response.body, "{override(owner)}");
    }

    #[test]
    fn require_and_blacklist_record_items() {
        let response = process("{require(Admin, Staff):admins only}");
        let requires = response.actions.requires.unwrap();
        assert_eq!(requires.items, ["Admin", "Staff"]);
        assert_eq!(requires.response.as_deref(), Some("admins only"));

        let response = process("{blacklist(Muted)}");
        let blacklist = response.actions.blacklist.unwrap();
        assert_eq!(blacklist.items, ["Muted"]);
        assert_eq!(blacklist.response, None);
    }

    #[test]
    fn cooldown_key_and_response() {
        let response = process("{cooldown(30):greet|slow down}");
        let cooldown = response.actions.cooldown.unwrap();
        assert_eq!(cooldown.seconds, 30);
        assert_eq!(cooldown.key, "greet");
        assert_eq!(cooldown.response.as_deref(), Some("slow down"));

        let response = process("{cooldown(abc):x}");
        assert_eq!(response.actions.cooldown, None);
    }

    #[test]
    fn react_list_caps_at_five() {
        let response = process("{react(a,b,c)}");
        assert_eq!(response.actions.reactions, ["a", "b", "c"]);

        let response = process("{react(a,b,c,d,e,f)}");
        assert!(response.actions.reactions.is_empty());
        assert_eq!(response.body, "{react(a,b,c,d,e,f)}");
    }

    #[test]
    fn redirect_targets() {
        assert_eq!(process("{redirect(dm)}").actions.target, Some(Target::Dm));
        assert_eq!(
            process("{redirect(reply)}").actions.target,
            Some(Target::Reply)
        );
        assert_eq!(
            process("{redirect(#general)}").actions.target,
            Some(Target::Channel("#general".into()))
        );
    }

    #[test]
    fn embed_schema_validation() {
        let response = process(r#"{embed:{"title": "Hello", "color": 7506394}}"#);
        let embed = response.actions.embed.unwrap();
        assert_eq!(embed.title.as_deref(), Some("Hello"));

        let response = process("{embed:not json}");
        assert!(response.actions.embed.is_none());
        assert_eq!(response.body, "{embed:not json}");
    }
}
