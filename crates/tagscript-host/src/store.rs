//! Durable tag records and the process-wide tag cache.
//!
//! Tags are grouped by scope: per-server or global, with per-scope name
//! uniqueness. A server tag shadows a global tag of the same name at lookup.
//! The cache is read by every invocation and mutated only by management
//! commands; mutations swap whole `Arc<Tag>` entries, so readers tolerate a
//! stale snapshot for one invocation.

use crate::error::TagError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tagscript_engine::Clock;

pub const MAX_TAGS_PER_SCOPE: usize = 250;
pub const MAX_SCRIPT_LEN: usize = 2_000;

/// Where a tag lives and where its name must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Global,
    Server(u64),
}

/// One stored tag. `uses` is monotonically non-decreasing; deletion is
/// permanent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub tagscript: String,
    pub author_id: u64,
    pub uses: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

pub struct TagStore {
    clock: Arc<dyn Clock>,
    scopes: RwLock<HashMap<Scope, HashMap<String, Arc<Tag>>>>,
}

impl TagStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        TagStore {
            clock,
            scopes: RwLock::new(HashMap::new()),
        }
    }

    fn check_script(tagscript: &str) -> Result<(), TagError> {
        let len = tagscript.chars().count();
        if len > MAX_SCRIPT_LEN {
            return Err(TagError::ScriptTooLong {
                len,
                max: MAX_SCRIPT_LEN,
            });
        }
        Ok(())
    }

    /// Create a tag. Fails if the name (or an alias holding it) exists —
    /// the command surface turns that into an overwrite confirmation.
    pub fn create(
        &self,
        scope: Scope,
        name: &str,
        author_id: u64,
        tagscript: &str,
    ) -> Result<(), TagError> {
        Self::check_script(tagscript)?;
        let mut scopes = self.scopes.write().unwrap();
        let tags = scopes.entry(scope).or_default();
        if Self::find_in(tags, name).is_some() {
            return Err(TagError::AlreadyExists(name.to_string()));
        }
        if tags.len() >= MAX_TAGS_PER_SCOPE {
            return Err(TagError::ScopeFull(MAX_TAGS_PER_SCOPE));
        }
        tags.insert(
            name.to_string(),
            Arc::new(Tag {
                name: name.to_string(),
                tagscript: tagscript.to_string(),
                author_id,
                uses: 0,
                created_at: self.clock.now(),
                aliases: Vec::new(),
            }),
        );
        Ok(())
    }

    /// Overwrite a tag after explicit confirmation. The replacement starts
    /// fresh: zero uses, no aliases, new author.
    pub fn replace(
        &self,
        scope: Scope,
        name: &str,
        author_id: u64,
        tagscript: &str,
    ) -> Result<(), TagError> {
        Self::check_script(tagscript)?;
        let mut scopes = self.scopes.write().unwrap();
        let tags = scopes.entry(scope).or_default();
        tags.insert(
            name.to_string(),
            Arc::new(Tag {
                name: name.to_string(),
                tagscript: tagscript.to_string(),
                author_id,
                uses: 0,
                created_at: self.clock.now(),
                aliases: Vec::new(),
            }),
        );
        Ok(())
    }

    /// Replace a tag's script, keeping its uses, aliases, and creation time.
    pub fn edit(&self, scope: Scope, name: &str, tagscript: &str) -> Result<(), TagError> {
        Self::check_script(tagscript)?;
        self.update(scope, name, |tag| tag.tagscript = tagscript.to_string())
    }

    /// Append text to a tag's script, joined with a single space.
    pub fn append(&self, scope: Scope, name: &str, extra: &str) -> Result<(), TagError> {
        let current = self
            .get(scope, name)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        let combined = format!("{} {}", current.tagscript, extra);
        Self::check_script(&combined)?;
        self.update(scope, name, |tag| tag.tagscript = combined)
    }

    pub fn remove(&self, scope: Scope, name: &str) -> Result<Arc<Tag>, TagError> {
        let mut scopes = self.scopes.write().unwrap();
        let tags = scopes
            .get_mut(&scope)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        let canonical = Self::find_in(tags, name)
            .map(|tag| tag.name.clone())
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        tags.remove(&canonical)
            .ok_or_else(|| TagError::NotFound(name.to_string()))
    }

    pub fn alias(&self, scope: Scope, name: &str, alias: &str) -> Result<(), TagError> {
        let mut scopes = self.scopes.write().unwrap();
        let tags = scopes
            .get_mut(&scope)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        if Self::find_in(tags, alias).is_some() {
            return Err(TagError::AliasTaken(alias.to_string()));
        }
        let canonical = Self::find_in(tags, name)
            .map(|tag| tag.name.clone())
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        let entry = tags
            .get_mut(&canonical)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        let mut tag = Tag::clone(entry);
        tag.aliases.push(alias.to_string());
        *entry = Arc::new(tag);
        Ok(())
    }

    pub fn unalias(&self, scope: Scope, name: &str, alias: &str) -> Result<(), TagError> {
        self.update(scope, name, |tag| tag.aliases.retain(|a| a != alias))
    }

    /// Look a tag up by name or alias within one scope.
    pub fn get(&self, scope: Scope, name: &str) -> Option<Arc<Tag>> {
        let scopes = self.scopes.read().unwrap();
        Self::find_in(scopes.get(&scope)?, name).cloned()
    }

    /// Invocation lookup: the server tag shadows a global tag of the same
    /// name.
    pub fn resolve(&self, guild_id: Option<u64>, name: &str) -> Option<(Scope, Arc<Tag>)> {
        if let Some(guild) = guild_id {
            let scope = Scope::Server(guild);
            if let Some(tag) = self.get(scope, name) {
                return Some((scope, tag));
            }
        }
        self.get(Scope::Global, name)
            .map(|tag| (Scope::Global, tag))
    }

    /// Bump the use counter; the whole entry is swapped so concurrent
    /// readers keep their snapshot.
    pub fn bump_uses(&self, scope: Scope, name: &str) {
        let _ = self.update(scope, name, |tag| tag.uses += 1);
    }

    pub fn count(&self, scope: Scope) -> usize {
        self.scopes
            .read()
            .unwrap()
            .get(&scope)
            .map_or(0, HashMap::len)
    }

    /// All tags in a scope, sorted by name.
    pub fn list(&self, scope: Scope) -> Vec<Arc<Tag>> {
        let mut tags: Vec<Arc<Tag>> = self
            .scopes
            .read()
            .unwrap()
            .get(&scope)
            .map(|tags| tags.values().cloned().collect())
            .unwrap_or_default();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        tags
    }

    /// All tags in a scope, most used first.
    pub fn usage(&self, scope: Scope) -> Vec<Arc<Tag>> {
        let mut tags = self.list(scope);
        tags.sort_by(|a, b| b.uses.cmp(&a.uses).then_with(|| a.name.cmp(&b.name)));
        tags
    }

    /// Serialize a whole scope as a JSON array, sorted by name.
    pub fn export_json(&self, scope: Scope) -> Result<String, TagError> {
        let tags: Vec<Tag> = self.list(scope).iter().map(|tag| Tag::clone(tag)).collect();
        Ok(serde_json::to_string_pretty(&tags)?)
    }

    /// Replace a whole scope from a JSON array in one swap.
    pub fn import_json(&self, scope: Scope, json: &str) -> Result<usize, TagError> {
        let tags: Vec<Tag> = serde_json::from_str(json)?;
        if tags.len() > MAX_TAGS_PER_SCOPE {
            return Err(TagError::ScopeFull(MAX_TAGS_PER_SCOPE));
        }
        let count = tags.len();
        let map: HashMap<String, Arc<Tag>> = tags
            .into_iter()
            .map(|tag| (tag.name.clone(), Arc::new(tag)))
            .collect();
        self.scopes.write().unwrap().insert(scope, map);
        Ok(count)
    }

    fn update(
        &self,
        scope: Scope,
        name: &str,
        mutate: impl FnOnce(&mut Tag),
    ) -> Result<(), TagError> {
        let mut scopes = self.scopes.write().unwrap();
        let tags = scopes
            .get_mut(&scope)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        let canonical = Self::find_in(tags, name)
            .map(|tag| tag.name.clone())
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        let entry = tags
            .get_mut(&canonical)
            .ok_or_else(|| TagError::NotFound(name.to_string()))?;
        let mut tag = Tag::clone(entry);
        mutate(&mut tag);
        *entry = Arc::new(tag);
        Ok(())
    }

    fn find_in<'a>(tags: &'a HashMap<String, Arc<Tag>>, name: &str) -> Option<&'a Arc<Tag>> {
        if let Some(tag) = tags.get(name) {
            return Some(tag);
        }
        tags.values().find(|tag| tag.aliases.iter().any(|a| a == name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tagscript_engine::FixedClock;

    fn store() -> TagStore {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        TagStore::new(Arc::new(clock))
    }

    #[test]
    fn create_get_and_shadowing() {
        let store = store();
        store.create(Scope::Global, "greet", 1, "hello").unwrap();
        store
            .create(Scope::Server(7), "greet", 2, "howdy")
            .unwrap();

        let (scope, tag) = store.resolve(Some(7), "greet").unwrap();
        assert_eq!(scope, Scope::Server(7));
        assert_eq!(tag.tagscript, "howdy");

        let (scope, tag) = store.resolve(None, "greet").unwrap();
        assert_eq!(scope, Scope::Global);
        assert_eq!(tag.tagscript, "hello");

        let (scope, _) = store.resolve(Some(8), "greet").unwrap();
        assert_eq!(scope, Scope::Global);
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let store = store();
        store.create(Scope::Global, "x", 1, "a").unwrap();
        assert!(matches!(
            store.create(Scope::Global, "x", 1, "b"),
            Err(TagError::AlreadyExists(_))
        ));
        store.replace(Scope::Global, "x", 2, "b").unwrap();
        assert_eq!(store.get(Scope::Global, "x").unwrap().tagscript, "b");
    }

    #[test]
    fn uses_are_monotonic() {
        let store = store();
        store.create(Scope::Global, "x", 1, "a").unwrap();
        store.bump_uses(Scope::Global, "x");
        store.bump_uses(Scope::Global, "x");
        assert_eq!(store.get(Scope::Global, "x").unwrap().uses, 2);
    }

    #[test]
    fn alias_lookup_and_removal() {
        let store = store();
        store.create(Scope::Global, "longname", 1, "body").unwrap();
        store.alias(Scope::Global, "longname", "ln").unwrap();
        assert_eq!(store.get(Scope::Global, "ln").unwrap().name, "longname");

        assert!(matches!(
            store.alias(Scope::Global, "longname", "ln"),
            Err(TagError::AliasTaken(_))
        ));

        store.unalias(Scope::Global, "longname", "ln").unwrap();
        assert!(store.get(Scope::Global, "ln").is_none());
    }

    #[test]
    fn edit_keeps_uses_and_append_joins() {
        let store = store();
        store.create(Scope::Global, "x", 1, "one").unwrap();
        store.bump_uses(Scope::Global, "x");
        store.edit(Scope::Global, "x", "two").unwrap();
        let tag = store.get(Scope::Global, "x").unwrap();
        assert_eq!(tag.tagscript, "two");
        assert_eq!(tag.uses, 1);

        store.append(Scope::Global, "x", "three").unwrap();
        assert_eq!(store.get(Scope::Global, "x").unwrap().tagscript, "two three");
    }

    #[test]
    fn scope_capacity_is_enforced() {
        let store = store();
        for i in 0..MAX_TAGS_PER_SCOPE {
            store
                .create(Scope::Global, &format!("t{i}"), 1, "x")
                .unwrap();
        }
        assert!(matches!(
            store.create(Scope::Global, "one-more", 1, "x"),
            Err(TagError::ScopeFull(_))
        ));
    }

    #[test]
    fn script_length_is_enforced() {
        let store = store();
        let long = "x".repeat(MAX_SCRIPT_LEN + 1);
        assert!(matches!(
            store.create(Scope::Global, "x", 1, &long),
            Err(TagError::ScriptTooLong { .. })
        ));
    }

    #[test]
    fn export_import_round_trip() {
        let store = store();
        store.create(Scope::Global, "a", 1, "one").unwrap();
        store.create(Scope::Global, "b", 2, "two").unwrap();
        store.alias(Scope::Global, "b", "bee").unwrap();
        let json = store.export_json(Scope::Global).unwrap();

        let restored = self::store();
        assert_eq!(restored.import_json(Scope::Global, &json).unwrap(), 2);
        assert_eq!(restored.get(Scope::Global, "bee").unwrap().name, "b");
        assert_eq!(restored.get(Scope::Global, "a").unwrap().tagscript, "one");
    }

    #[test]
    fn remove_is_permanent() {
        let store = store();
        store.create(Scope::Global, "x", 1, "a").unwrap();
        store.remove(Scope::Global, "x").unwrap();
        assert!(store.get(Scope::Global, "x").is_none());
        assert!(matches!(
            store.remove(Scope::Global, "x"),
            Err(TagError::NotFound(_))
        ));
    }
}
