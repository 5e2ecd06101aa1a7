//! The entity cache.
//!
//! Maps `(kind, id)` to an immutable `Arc` snapshot. Backed by a sharded
//! `DashMap`, so readers on different keys never contend and a reader always
//! sees a whole entity (last write wins). Entries are never evicted; the cache
//! grows with the number of installations and issues the deployment knows
//! about.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::types::{
    Comment, Installation, InstallationId, Issue, IssueId, Repository, User, UserId,
};

/// The kinds of entity the cache can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Installation,
    Repository,
    Issue,
    Comment,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Installation => "installation",
            EntityKind::Repository => "repository",
            EntityKind::Issue => "issue",
            EntityKind::Comment => "comment",
        };
        f.write_str(name)
    }
}

/// Cache key. Ids are only unique within a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: u64,
}

/// A cached entity snapshot.
#[derive(Debug, Clone)]
pub enum Entity {
    User(Arc<User>),
    Installation(Arc<Installation>),
    Repository(Arc<Repository>),
    Issue(Arc<Issue>),
    Comment(Arc<Comment>),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::User(_) => EntityKind::User,
            Entity::Installation(_) => EntityKind::Installation,
            Entity::Repository(_) => EntityKind::Repository,
            Entity::Issue(_) => EntityKind::Issue,
            Entity::Comment(_) => EntityKind::Comment,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Entity::User(u) => u.id.get(),
            Entity::Installation(i) => i.id.get(),
            Entity::Repository(r) => r.id.get(),
            Entity::Issue(i) => i.id.get(),
            Entity::Comment(c) => c.id.get(),
        }
    }

    pub fn key(&self) -> EntityKey {
        EntityKey {
            kind: self.kind(),
            id: self.id(),
        }
    }
}

impl From<Arc<User>> for Entity {
    fn from(u: Arc<User>) -> Self {
        Entity::User(u)
    }
}

impl From<Arc<Installation>> for Entity {
    fn from(i: Arc<Installation>) -> Self {
        Entity::Installation(i)
    }
}

impl From<Arc<Repository>> for Entity {
    fn from(r: Arc<Repository>) -> Self {
        Entity::Repository(r)
    }
}

impl From<Arc<Issue>> for Entity {
    fn from(i: Arc<Issue>) -> Self {
        Entity::Issue(i)
    }
}

impl From<Arc<Comment>> for Entity {
    fn from(c: Arc<Comment>) -> Self {
        Entity::Comment(c)
    }
}

/// Concurrent `(kind, id) -> entity` map.
#[derive(Debug, Default)]
pub struct EntityCache {
    entries: DashMap<EntityKey, Entity>,
}

impl EntityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an entity. Absence means "unknown", not an error.
    pub fn get(&self, kind: EntityKind, id: u64) -> Option<Entity> {
        self.entries
            .get(&EntityKey { kind, id })
            .map(|e| e.value().clone())
    }

    /// Stores `entity` under its own kind and id, returning the snapshot it
    /// replaced.
    pub fn put(&self, entity: impl Into<Entity>) -> Option<Entity> {
        let entity = entity.into();
        self.entries.insert(entity.key(), entity)
    }

    pub fn user(&self, id: UserId) -> Option<Arc<User>> {
        match self.get(EntityKind::User, id.get())? {
            Entity::User(u) => Some(u),
            _ => None,
        }
    }

    pub fn installation(&self, id: InstallationId) -> Option<Arc<Installation>> {
        match self.get(EntityKind::Installation, id.get())? {
            Entity::Installation(i) => Some(i),
            _ => None,
        }
    }

    pub fn issue(&self, id: IssueId) -> Option<Arc<Issue>> {
        match self.get(EntityKind::Issue, id.get())? {
            Entity::Issue(i) => Some(i),
            _ => None,
        }
    }

    /// Number of cached entities of `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries.iter().filter(|e| e.key().kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{installation_json, user_json};
    use proptest::prelude::*;

    fn user(id: u64, login: &str) -> Arc<User> {
        Arc::new(serde_json::from_value(user_json(id, login)).unwrap())
    }

    fn installation(id: u64) -> Arc<Installation> {
        Arc::new(serde_json::from_value(installation_json(id, 500 + id, "acct")).unwrap())
    }

    #[test]
    fn unseen_ids_are_absent() {
        let cache = EntityCache::new();
        assert!(cache.user(UserId(1)).is_none());
        assert!(cache.installation(InstallationId(1)).is_none());
        assert!(cache.issue(IssueId(1)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn returns_the_exact_cached_arc() {
        let cache = EntityCache::new();
        let octocat = user(1, "octocat");
        cache.put(Arc::clone(&octocat));

        let got = cache.user(UserId(1)).unwrap();
        assert!(Arc::ptr_eq(&got, &octocat));
    }

    #[test]
    fn ids_are_scoped_by_kind() {
        let cache = EntityCache::new();
        cache.put(user(7, "seven"));
        cache.put(installation(7));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.user(UserId(7)).unwrap().login, "seven");
        assert_eq!(cache.installation(InstallationId(7)).unwrap().id, InstallationId(7));
        assert_eq!(cache.count(EntityKind::User), 1);
    }

    #[test]
    fn put_replaces_and_returns_previous() {
        let cache = EntityCache::new();
        assert!(cache.put(user(1, "old")).is_none());

        let previous = cache.put(user(1, "new")).unwrap();
        assert_eq!(previous.kind(), EntityKind::User);
        assert_eq!(cache.user(UserId(1)).unwrap().login, "new");
    }

    #[test]
    fn concurrent_writers_never_tear() {
        let cache = Arc::new(EntityCache::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..200u64 {
                        cache.put(user(i % 16, &format!("writer-{t}")));
                        if let Some(u) = cache.user(UserId(i % 16)) {
                            assert!(u.login.starts_with("writer-"));
                            assert_eq!(u.id, UserId(i % 16));
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(cache.count(EntityKind::User), 16);
    }

    proptest! {
        #[test]
        fn last_write_wins(logins in prop::collection::vec("[a-z]{1,8}", 1..10)) {
            let cache = EntityCache::new();
            for login in &logins {
                cache.put(user(3, login));
            }
            prop_assert_eq!(&cache.user(UserId(3)).unwrap().login, logins.last().unwrap());
            prop_assert_eq!(cache.len(), 1);
        }
    }
}
