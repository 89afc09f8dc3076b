//! Typed side-effect record.
//!
//! Blocks do not perform effects; they record requests here and the host
//! executor applies them after rendering, in a fixed order. One optional
//! field per action kind, merged in lex order with last-writer-wins
//! semantics per field — except `commands`, which appends.

use serde::{Deserialize, Serialize};

/// Per-invocation cap on queued sub-commands.
pub const COMMAND_LIMIT: usize = 3;

/// Privilege levels a tag may ask the host dispatcher to relax for its
/// sub-commands. Owner and guild-owner checks are never relaxed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overrides {
    pub admin: bool,
    #[serde(rename = "mod")]
    pub moderator: bool,
    pub permissions: bool,
}

/// Role/channel predicate recorded by the require and blacklist blocks.
/// `items` are identifiers the host resolves against the invoker's roles and
/// the current channel; `response` is sent when the predicate cancels the
/// invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub items: Vec<String>,
    pub response: Option<String>,
}

/// Keyed rate limit. `key` is the author-chosen suffix; the executor scopes
/// it per channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub seconds: u64,
    pub key: String,
    pub response: Option<String>,
}

/// Where the rendered body goes instead of the invoking channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Dm,
    Reply,
    Channel(String),
}

/// Rich-embed document, validated from the embed block's JSON payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<EmbedMedia>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<EmbedAuthor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedFooter {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedMedia {
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbedAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

impl Embed {
    /// Upstream chat-platform limits; a document over any of them is treated
    /// as malformed and the verb is rewritten literally.
    pub fn is_valid(&self) -> bool {
        let within = |s: &Option<String>, cap: usize| {
            s.as_ref().map_or(true, |v| v.chars().count() <= cap)
        };
        within(&self.title, 256)
            && within(&self.description, 4096)
            && self.fields.len() <= 25
            && self.fields.iter().all(|f| {
                !f.name.is_empty()
                    && !f.value.is_empty()
                    && f.name.chars().count() <= 256
                    && f.value.chars().count() <= 1024
            })
            && self
                .footer
                .as_ref()
                .map_or(true, |f| f.text.chars().count() <= 2048)
            && self
                .author
                .as_ref()
                .map_or(true, |a| a.name.chars().count() <= 256)
    }

    /// An embed with no visible content is not worth sending.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.fields.is_empty()
            && self.footer.is_none()
            && self.image.is_none()
            && self.thumbnail.is_none()
            && self.author.is_none()
    }
}

/// The full action record carried on a [`Response`](crate::Response).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Actions {
    pub delete: Option<bool>,
    pub silent: Option<bool>,
    pub overrides: Option<Overrides>,
    pub requires: Option<Restriction>,
    pub blacklist: Option<Restriction>,
    pub cooldown: Option<Cooldown>,
    pub target: Option<Target>,
    pub embed: Option<Embed>,
    pub reactions: Vec<String>,
    pub reactu: Vec<String>,
    pub commands: Vec<String>,
    /// Set when the work or depth budget aborted rendering; the host may log
    /// it but typically still sends the partial body.
    pub aborted_by_limit: bool,
}

impl Actions {
    pub fn is_empty(&self) -> bool {
        self == &Actions::default()
    }
}
