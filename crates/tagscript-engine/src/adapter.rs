//! Polymorphic values bound to variable names.
//!
//! An adapter answers one query: given an optional parameter, produce a
//! string. Attribute access is resolved by the adapter itself — the
//! interpreter never reflects on the underlying object. Domain adapters
//! precompute a fixed attribute table at construction so lookup is O(1) and
//! the exposed surface is a closed set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub trait Adapter: Send + Sync {
    /// Render this value. `None` means "unknown attribute": the verb is
    /// rewritten literally so the author can see the mistake.
    fn get_value(&self, parameter: Option<&str>) -> Option<String>;
}

// =============================================================================
// PRIMITIVE ADAPTERS
// =============================================================================

/// A plain string. A numeric parameter selects the 1-based whitespace token;
/// `N+` selects the tail from token N joined by single spaces. Out-of-range
/// indices render empty; a non-numeric parameter renders the whole string.
/// This is what makes `{args(1)}` and `{2+}` work.
#[derive(Debug, Clone)]
pub struct StringAdapter {
    value: String,
}

impl StringAdapter {
    pub fn new(value: impl Into<String>) -> Self {
        StringAdapter {
            value: value.into(),
        }
    }
}

impl Adapter for StringAdapter {
    fn get_value(&self, parameter: Option<&str>) -> Option<String> {
        let param = match parameter.map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => p,
            None => return Some(self.value.clone()),
        };

        let tokens: Vec<&str> = self.value.split_whitespace().collect();
        if let Some(head) = param.strip_suffix('+') {
            match head.parse::<usize>() {
                Ok(n) if n >= 1 => Some(
                    tokens
                        .get(n - 1..)
                        .map(|tail| tail.join(" "))
                        .unwrap_or_default(),
                ),
                _ => Some(self.value.clone()),
            }
        } else {
            match param.parse::<usize>() {
                Ok(n) if n >= 1 => {
                    Some(tokens.get(n - 1).map(|t| t.to_string()).unwrap_or_default())
                }
                Ok(_) => Some(String::new()),
                Err(_) => Some(self.value.clone()),
            }
        }
    }
}

/// An integer value; the parameter is ignored.
#[derive(Debug, Clone, Copy)]
pub struct IntAdapter {
    value: i64,
}

impl IntAdapter {
    pub fn new(value: i64) -> Self {
        IntAdapter { value }
    }
}

impl Adapter for IntAdapter {
    fn get_value(&self, _parameter: Option<&str>) -> Option<String> {
        Some(self.value.to_string())
    }
}

/// Attribute-whitelisted wrapper around an arbitrary JSON object. Names not
/// on the whitelist, names starting with `_`, and names containing `.` are
/// refused.
#[derive(Debug, Clone)]
pub struct SafeObjectAdapter {
    value: serde_json::Value,
    allowed: HashSet<String>,
}

impl SafeObjectAdapter {
    pub fn new(value: serde_json::Value, allowed: &[&str]) -> Self {
        SafeObjectAdapter {
            value,
            allowed: allowed.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl Adapter for SafeObjectAdapter {
    fn get_value(&self, parameter: Option<&str>) -> Option<String> {
        let attr = match parameter.map(str::trim).filter(|p| !p.is_empty()) {
            Some(a) => a,
            None => return Some(render_json(&self.value)),
        };
        if attr.starts_with('_') || attr.contains('.') || !self.allowed.contains(attr) {
            return None;
        }
        self.value.get(attr).map(render_json)
    }
}

fn render_json(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// DOMAIN ADAPTERS
// =============================================================================

/// Host-supplied view of a server member.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    pub nick: Option<String>,
    pub avatar_url: Option<String>,
    pub color: Option<u32>,
    pub created_at: Option<DateTime<Utc>>,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Host-supplied view of a channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    pub topic: Option<String>,
    pub nsfw: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Host-supplied view of a server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Guild {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub member_count: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Shared shape of the three domain adapters: a default rendering plus a
/// closed, lowercase attribute table built once at construction.
#[derive(Debug, Clone)]
struct AttributeTable {
    default: String,
    attributes: HashMap<String, String>,
}

impl AttributeTable {
    fn get(&self, parameter: Option<&str>) -> Option<String> {
        match parameter.map(str::trim).filter(|p| !p.is_empty()) {
            None => Some(self.default.clone()),
            Some(attr) => self.attributes.get(&attr.to_lowercase()).cloned(),
        }
    }
}

fn unix(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.timestamp().to_string()).unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct MemberAdapter {
    table: AttributeTable,
}

impl MemberAdapter {
    pub fn new(member: &Member) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert("id".into(), member.id.to_string());
        attributes.insert("name".into(), member.name.clone());
        attributes.insert(
            "nick".into(),
            member.nick.clone().unwrap_or_else(|| member.name.clone()),
        );
        attributes.insert("mention".into(), format!("<@{}>", member.id));
        attributes.insert(
            "avatar".into(),
            member.avatar_url.clone().unwrap_or_default(),
        );
        attributes.insert(
            "color".into(),
            member
                .color
                .map(|c| format!("#{c:06x}"))
                .unwrap_or_default(),
        );
        attributes.insert("created_at".into(), unix(member.created_at));
        attributes.insert("joined_at".into(), unix(member.joined_at));
        MemberAdapter {
            table: AttributeTable {
                default: member.name.clone(),
                attributes,
            },
        }
    }
}

impl Adapter for MemberAdapter {
    fn get_value(&self, parameter: Option<&str>) -> Option<String> {
        self.table.get(parameter)
    }
}

#[derive(Debug, Clone)]
pub struct ChannelAdapter {
    table: AttributeTable,
}

impl ChannelAdapter {
    pub fn new(channel: &Channel) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert("id".into(), channel.id.to_string());
        attributes.insert("name".into(), channel.name.clone());
        attributes.insert("mention".into(), format!("<#{}>", channel.id));
        attributes.insert("topic".into(), channel.topic.clone().unwrap_or_default());
        attributes.insert("nsfw".into(), channel.nsfw.to_string());
        attributes.insert("created_at".into(), unix(channel.created_at));
        ChannelAdapter {
            table: AttributeTable {
                default: channel.name.clone(),
                attributes,
            },
        }
    }
}

impl Adapter for ChannelAdapter {
    fn get_value(&self, parameter: Option<&str>) -> Option<String> {
        self.table.get(parameter)
    }
}

#[derive(Debug, Clone)]
pub struct GuildAdapter {
    table: AttributeTable,
}

impl GuildAdapter {
    pub fn new(guild: &Guild) -> Self {
        let mut attributes = HashMap::new();
        attributes.insert("id".into(), guild.id.to_string());
        attributes.insert("name".into(), guild.name.clone());
        attributes.insert(
            "description".into(),
            guild.description.clone().unwrap_or_default(),
        );
        attributes.insert("icon".into(), guild.icon_url.clone().unwrap_or_default());
        attributes.insert(
            "member_count".into(),
            guild
                .member_count
                .map(|c| c.to_string())
                .unwrap_or_default(),
        );
        attributes.insert("created_at".into(), unix(guild.created_at));
        GuildAdapter {
            table: AttributeTable {
                default: guild.name.clone(),
                attributes,
            },
        }
    }
}

impl Adapter for GuildAdapter {
    fn get_value(&self, parameter: Option<&str>) -> Option<String> {
        self.table.get(parameter)
    }
}
