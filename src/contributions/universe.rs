//! The set of repositories scanned when commit search is unusable.

use std::collections::HashSet;
use std::fmt;

/// Repository identifier in `owner/name` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepositoryId(String);

impl RepositoryId {
    /// Parses an `owner/name` string. Anything else is rejected.
    pub fn parse(full_name: &str) -> Option<Self> {
        let (owner, name) = full_name.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self(full_name.to_string()))
    }

    /// Gets the full name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Insertion-ordered set of repositories.
#[derive(Debug, Clone, Default)]
pub struct RepositoryUniverse {
    order: Vec<RepositoryId>,
    seen: HashSet<RepositoryId>,
}

impl RepositoryUniverse {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a repository unless already present; returns true if added.
    pub fn insert(&mut self, id: RepositoryId) -> bool {
        if self.seen.insert(id.clone()) {
            self.order.push(id);
            true
        } else {
            false
        }
    }

    /// Parses and adds a full name; malformed names are ignored.
    pub fn insert_name(&mut self, full_name: &str) -> bool {
        RepositoryId::parse(full_name).is_some_and(|id| self.insert(id))
    }

    /// Number of repositories.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Consumes the set, returning repositories in first-seen order.
    pub fn into_vec(self) -> Vec<RepositoryId> {
        self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(RepositoryId::parse("octocat/hello").unwrap().as_str(), "octocat/hello");
        assert!(RepositoryId::parse("octocat").is_none());
        assert!(RepositoryId::parse("/hello").is_none());
        assert!(RepositoryId::parse("a/b/c").is_none());
    }

    #[test]
    fn test_first_seen_order_without_duplicates() {
        let mut universe = RepositoryUniverse::new();
        assert!(universe.insert_name("octocat/b"));
        assert!(universe.insert_name("octocat/a"));
        assert!(!universe.insert_name("octocat/b"));
        assert!(universe.insert_name("other/c"));
        assert!(!universe.insert_name("garbage"));

        let names: Vec<String> = universe.into_vec().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["octocat/b", "octocat/a", "other/c"]);
    }
}
