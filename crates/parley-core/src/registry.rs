//! Connection registry.
//!
//! Bidirectional map between connection ids and nicknames. The registry only
//! guarantees the two directions agree; nickname validity and uniqueness
//! checks on rename are the model's responsibility.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parley_proto::ConnectionId;

/// Prefix of generated nicknames (`User0`, `User1`, ...).
pub const NICKNAME_PREFIX: &str = "User";

/// Connection id to nickname directory.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    by_id: BTreeMap<ConnectionId, String>,
    by_nickname: HashMap<String, ConnectionId>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `conn_id` to a freshly generated nickname and return it.
    ///
    /// The nickname is `User` followed by the smallest non-negative integer
    /// not currently in use. If `conn_id` is already bound, the binding is
    /// left as is and its nickname returned.
    pub fn register(&mut self, conn_id: ConnectionId) -> String {
        if let Some(existing) = self.by_id.get(&conn_id) {
            tracing::warn!(conn_id, nickname = %existing, "connection id already registered");
            return existing.clone();
        }

        let nickname = self.generate_nickname();
        self.by_id.insert(conn_id, nickname.clone());
        self.by_nickname.insert(nickname.clone(), conn_id);
        nickname
    }

    fn generate_nickname(&self) -> String {
        let mut suffix: u64 = 0;
        loop {
            let candidate = format!("{NICKNAME_PREFIX}{suffix}");
            if !self.by_nickname.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }

    /// Remove the binding for `conn_id`, returning the nickname it held.
    pub fn deregister(&mut self, conn_id: ConnectionId) -> Option<String> {
        let nickname = self.by_id.remove(&conn_id)?;
        self.by_nickname.remove(&nickname);
        Some(nickname)
    }

    /// Replace `old` with `new` for `conn_id`.
    ///
    /// Does nothing and returns `false` unless `conn_id` is currently bound
    /// to `old`.
    pub fn rename(&mut self, conn_id: ConnectionId, old: &str, new: &str) -> bool {
        match self.by_id.get_mut(&conn_id) {
            Some(current) if current == old => {
                new.clone_into(current);
                self.by_nickname.remove(old);
                self.by_nickname.insert(new.to_owned(), conn_id);
                true
            },
            _ => false,
        }
    }

    /// Connection bound to `nickname`.
    pub fn lookup_id(&self, nickname: &str) -> Option<ConnectionId> {
        self.by_nickname.get(nickname).copied()
    }

    /// Nickname bound to `conn_id`.
    pub fn lookup_nickname(&self, conn_id: ConnectionId) -> Option<&str> {
        self.by_id.get(&conn_id).map(String::as_str)
    }

    /// Whether any connection holds `nickname`.
    pub fn contains_nickname(&self, nickname: &str) -> bool {
        self.by_nickname.contains_key(nickname)
    }

    /// Snapshot of every registered nickname.
    pub fn all_nicknames(&self) -> BTreeSet<String> {
        self.by_id.values().cloned().collect()
    }

    /// All bindings, ordered by connection id.
    pub fn iter(&self) -> impl Iterator<Item = (ConnectionId, &str)> + '_ {
        self.by_id.iter().map(|(id, nick)| (*id, nick.as_str()))
    }

    /// Number of registered connections.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Whether the reverse index agrees with the forward one.
    pub(crate) fn is_consistent(&self) -> bool {
        self.by_id.len() == self.by_nickname.len()
            && self.by_id.iter().all(|(id, nick)| self.by_nickname.get(nick) == Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_generates_sequential_nicknames() {
        let mut registry = Registry::new();
        assert_eq!(registry.register(10), "User0");
        assert_eq!(registry.register(11), "User1");
        assert_eq!(registry.register(12), "User2");
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn register_fills_smallest_gap() {
        let mut registry = Registry::new();
        registry.register(0);
        registry.register(1);
        registry.register(2);

        registry.deregister(1);
        assert_eq!(registry.register(3), "User1");
    }

    #[test]
    fn register_skips_renamed_into_generated_form() {
        let mut registry = Registry::new();
        registry.register(0);
        assert!(registry.rename(0, "User0", "User1"));

        assert_eq!(registry.register(1), "User0");
        assert_eq!(registry.register(2), "User2");
    }

    #[test]
    fn lookups_are_bidirectional() {
        let mut registry = Registry::new();
        registry.register(7);

        assert_eq!(registry.lookup_id("User0"), Some(7));
        assert_eq!(registry.lookup_nickname(7), Some("User0"));
        assert_eq!(registry.lookup_id("User1"), None);
        assert_eq!(registry.lookup_nickname(8), None);
    }

    #[test]
    fn deregister_frees_nickname() {
        let mut registry = Registry::new();
        registry.register(0);

        assert_eq!(registry.deregister(0), Some("User0".to_string()));
        assert_eq!(registry.deregister(0), None);
        assert!(!registry.contains_nickname("User0"));
        assert!(registry.is_empty());
    }

    #[test]
    fn rename_requires_matching_old_nickname() {
        let mut registry = Registry::new();
        registry.register(0);

        assert!(!registry.rename(0, "User9", "alice"));
        assert!(!registry.rename(1, "User0", "alice"));
        assert_eq!(registry.lookup_nickname(0), Some("User0"));

        assert!(registry.rename(0, "User0", "alice"));
        assert_eq!(registry.lookup_id("alice"), Some(0));
        assert_eq!(registry.lookup_id("User0"), None);
        assert!(registry.is_consistent());
    }

    #[test]
    fn reregistering_same_id_keeps_binding() {
        let mut registry = Registry::new();
        registry.register(0);
        registry.register(1);
        assert!(registry.rename(0, "User0", "alice"));

        assert_eq!(registry.register(0), "alice");
        assert_eq!(registry.lookup_id("alice"), Some(0));
        assert!(!registry.contains_nickname("User0"));
        assert_eq!(registry.len(), 2);
        assert!(registry.is_consistent());
    }

    #[test]
    fn snapshot_is_detached() {
        let mut registry = Registry::new();
        registry.register(0);

        let mut snapshot = registry.all_nicknames();
        snapshot.insert("intruder".to_string());

        assert!(!registry.contains_nickname("intruder"));
        assert_eq!(registry.all_nicknames().len(), 1);
    }
}
