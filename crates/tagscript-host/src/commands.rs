//! Management command surface.
//!
//! The host exposes `add`, `edit`, `append`, `alias`, `unalias`, `remove`,
//! `info`, `raw`, `list`, `usage`, and their `global` counterparts. All
//! feedback is chat-message text; there are no shell exit codes. Creating a
//! tag over an existing name asks for confirmation first, and a script using
//! privileged blocks is rejected at authoring time for non-elevated authors.

use crate::error::TagError;
use crate::store::{Scope, TagStore};
use std::sync::Arc;
use tagscript_engine::lex;

/// Who is issuing a management command.
#[derive(Debug, Clone, Copy)]
pub struct AuthorCtx {
    pub user_id: u64,
    /// Holds the elevated permission required to author sensitive blocks.
    pub elevated: bool,
}

/// A reply the chat layer renders back to the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandReply {
    Message(String),
    /// The name exists; re-issue with confirmation to overwrite.
    ConfirmOverwrite { name: String },
}

impl CommandReply {
    fn msg(text: impl Into<String>) -> Self {
        CommandReply::Message(text.into())
    }
}

/// Declarations only an elevated author may store. Enforced at tag-authoring
/// time, not at invocation.
const PRIVILEGED_DECLARATIONS: &[&str] = &["override"];

pub struct TagCommands {
    store: Arc<TagStore>,
}

impl TagCommands {
    pub fn new(store: Arc<TagStore>) -> Self {
        TagCommands { store }
    }

    /// Parse and run one management line against the given server. A
    /// leading `global` switches the scope.
    pub fn handle(&self, server_id: u64, author: &AuthorCtx, line: &str) -> CommandReply {
        let (mut word, mut rest) = split_word(line);
        let scope = if word.eq_ignore_ascii_case("global") {
            let next = split_word(rest);
            word = next.0;
            rest = next.1;
            Scope::Global
        } else {
            Scope::Server(server_id)
        };

        match word.to_lowercase().as_str() {
            "add" => {
                let (name, script) = split_word(rest);
                self.add(scope, author, name, script, false)
            }
            "edit" => {
                let (name, script) = split_word(rest);
                self.edit(scope, author, name, script)
            }
            "append" => {
                let (name, extra) = split_word(rest);
                self.append(scope, author, name, extra)
            }
            "alias" => {
                let (name, alias) = split_word(rest);
                self.alias(scope, name, alias.trim())
            }
            "unalias" => {
                let (name, alias) = split_word(rest);
                self.unalias(scope, name, alias.trim())
            }
            "remove" => self.remove(scope, rest.trim()),
            "info" => self.info(scope, rest.trim()),
            "raw" => self.raw(scope, rest.trim()),
            "list" => self.list(scope),
            "usage" => self.usage(scope),
            _ => CommandReply::msg(
                "Unknown tag command. Try: add, edit, append, alias, unalias, remove, info, raw, list, usage (prefix with `global` for global tags).",
            ),
        }
    }

    /// Create a tag. With `force` false an existing name yields
    /// [`CommandReply::ConfirmOverwrite`]; only a confirmed retry replaces.
    pub fn add(
        &self,
        scope: Scope,
        author: &AuthorCtx,
        name: &str,
        script: &str,
        force: bool,
    ) -> CommandReply {
        if name.is_empty() || script.trim().is_empty() {
            return CommandReply::msg("Usage: add <name> <tagscript>");
        }
        if let Err(err) = validate_script(script, author) {
            return CommandReply::msg(err.to_string());
        }
        if force {
            return match self.store.replace(scope, name, author.user_id, script) {
                Ok(()) => CommandReply::msg(format!("Tag `{name}` overwritten.")),
                Err(err) => CommandReply::msg(err.to_string()),
            };
        }
        match self.store.create(scope, name, author.user_id, script) {
            Ok(()) => CommandReply::msg(format!("Tag `{name}` added.")),
            Err(TagError::AlreadyExists(name)) => CommandReply::ConfirmOverwrite { name },
            Err(err) => CommandReply::msg(err.to_string()),
        }
    }

    pub fn edit(
        &self,
        scope: Scope,
        author: &AuthorCtx,
        name: &str,
        script: &str,
    ) -> CommandReply {
        if name.is_empty() || script.trim().is_empty() {
            return CommandReply::msg("Usage: edit <name> <tagscript>");
        }
        if let Err(err) = validate_script(script, author) {
            return CommandReply::msg(err.to_string());
        }
        match self.store.edit(scope, name, script) {
            Ok(()) => CommandReply::msg(format!("Tag `{name}` edited.")),
            Err(err) => CommandReply::msg(err.to_string()),
        }
    }

    pub fn append(
        &self,
        scope: Scope,
        author: &AuthorCtx,
        name: &str,
        extra: &str,
    ) -> CommandReply {
        if name.is_empty() || extra.trim().is_empty() {
            return CommandReply::msg("Usage: append <name> <text>");
        }
        if let Err(err) = validate_script(extra, author) {
            return CommandReply::msg(err.to_string());
        }
        match self.store.append(scope, name, extra) {
            Ok(()) => CommandReply::msg(format!("Tag `{name}` appended to.")),
            Err(err) => CommandReply::msg(err.to_string()),
        }
    }

    pub fn alias(&self, scope: Scope, name: &str, alias: &str) -> CommandReply {
        if name.is_empty() || alias.is_empty() {
            return CommandReply::msg("Usage: alias <name> <alias>");
        }
        match self.store.alias(scope, name, alias) {
            Ok(()) => CommandReply::msg(format!("`{alias}` now points at `{name}`.")),
            Err(err) => CommandReply::msg(err.to_string()),
        }
    }

    pub fn unalias(&self, scope: Scope, name: &str, alias: &str) -> CommandReply {
        if name.is_empty() || alias.is_empty() {
            return CommandReply::msg("Usage: unalias <name> <alias>");
        }
        match self.store.unalias(scope, name, alias) {
            Ok(()) => CommandReply::msg(format!("`{alias}` no longer points at `{name}`.")),
            Err(err) => CommandReply::msg(err.to_string()),
        }
    }

    pub fn remove(&self, scope: Scope, name: &str) -> CommandReply {
        if name.is_empty() {
            return CommandReply::msg("Usage: remove <name>");
        }
        match self.store.remove(scope, name) {
            Ok(tag) => CommandReply::msg(format!("Tag `{}` removed.", tag.name)),
            Err(err) => CommandReply::msg(err.to_string()),
        }
    }

    pub fn info(&self, scope: Scope, name: &str) -> CommandReply {
        match self.store.get(scope, name) {
            Some(tag) => {
                let mut lines = vec![
                    format!("Tag: {}", tag.name),
                    format!("Author: <@{}>", tag.author_id),
                    format!("Uses: {}", tag.uses),
                    format!("Created: {}", tag.created_at.format("%Y-%m-%d %H:%M UTC")),
                ];
                if !tag.aliases.is_empty() {
                    lines.push(format!("Aliases: {}", tag.aliases.join(", ")));
                }
                CommandReply::msg(lines.join("\n"))
            }
            None => CommandReply::msg(TagError::NotFound(name.to_string()).to_string()),
        }
    }

    /// The stored source with markdown-sensitive characters escaped, so the
    /// script is readable instead of rendering.
    pub fn raw(&self, scope: Scope, name: &str) -> CommandReply {
        match self.store.get(scope, name) {
            Some(tag) => CommandReply::msg(escape_markdown(&tag.tagscript)),
            None => CommandReply::msg(TagError::NotFound(name.to_string()).to_string()),
        }
    }

    pub fn list(&self, scope: Scope) -> CommandReply {
        let tags = self.store.list(scope);
        if tags.is_empty() {
            return CommandReply::msg("No tags stored in this scope.");
        }
        let names: Vec<&str> = tags.iter().map(|tag| tag.name.as_str()).collect();
        CommandReply::msg(format!("Tags ({}): {}", names.len(), names.join(", ")))
    }

    pub fn usage(&self, scope: Scope) -> CommandReply {
        let tags = self.store.usage(scope);
        if tags.is_empty() {
            return CommandReply::msg("No tags stored in this scope.");
        }
        let lines: Vec<String> = tags
            .iter()
            .take(10)
            .map(|tag| format!("{} — {} uses", tag.name, tag.uses))
            .collect();
        CommandReply::msg(lines.join("\n"))
    }
}

/// Reject scripts that store privileged blocks unless the author holds the
/// elevated permission.
pub fn validate_script(script: &str, author: &AuthorCtx) -> Result<(), TagError> {
    if author.elevated {
        return Ok(());
    }
    for verb in lex(script, false) {
        let dec = verb.declaration.to_lowercase();
        if PRIVILEGED_DECLARATIONS.contains(&dec.as_str()) {
            return Err(TagError::PrivilegedBlock(dec));
        }
    }
    Ok(())
}

fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '`' | '*' | '_' | '~' | '|' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// First whitespace-delimited word plus the untrimmed-on-the-inside rest.
fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim_start();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (input, ""),
    }
}
