//! Access policy configuration.
//!
//! The policy is deliberately default-permissive: an empty or absent
//! allow-list means "everything allowed", never "nothing allowed". Only a
//! non-empty list restricts. Operators narrow access by listing what they
//! want, not by enumerating what they fear.

use serde::{Deserialize, Serialize};

/// An allow-list where the empty list permits everything.
///
/// Membership is exact and case-sensitive; project refs, schema names and
/// table names are opaque identifiers here, never case-folded or
/// pattern-matched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct AllowList(Vec<String>);

impl AllowList {
    /// Build an allow-list from explicit entries.
    pub fn new(entries: Vec<String>) -> Self {
        Self(entries)
    }

    /// True when the list is empty and therefore permits everything.
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// True when `candidate` may pass: always for an unrestricted list,
    /// otherwise only for exact members.
    pub fn permits(&self, candidate: &str) -> bool {
        self.is_unrestricted() || self.0.iter().any(|entry| entry == candidate)
    }

    /// Every name in `names` that the list does not permit, in input order.
    /// Empty when the list is unrestricted.
    pub fn violations(&self, names: &[String]) -> Vec<String> {
        if self.is_unrestricted() {
            return Vec::new();
        }
        names
            .iter()
            .filter(|name| !self.0.iter().any(|entry| entry == *name))
            .cloned()
            .collect()
    }

    /// The configured entries.
    pub fn entries(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for AllowList {
    fn from(entries: Vec<String>) -> Self {
        Self(entries)
    }
}

impl From<Vec<&str>> for AllowList {
    fn from(entries: Vec<&str>) -> Self {
        Self(entries.into_iter().map(String::from).collect())
    }
}

/// Access restrictions applied to every tool invocation.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AccessPolicyConfig {
    /// Deny every operation in the write set.
    #[serde(default)]
    pub read_only: bool,

    /// Project refs that may be targeted. Empty means all.
    #[serde(default)]
    pub allowed_projects: AllowList,

    /// Schemas SQL operations may touch. Empty means all.
    #[serde(default)]
    pub allowed_schemas: AllowList,

    /// Tables SQL operations may touch. Empty means all.
    #[serde(default)]
    pub allowed_tables: AllowList,

    /// Tool names that are never allowed, regardless of mode.
    #[serde(default)]
    pub blocked_operations: Vec<String>,
}

impl AccessPolicyConfig {
    /// True when `operation` is in the blocked set.
    pub fn blocks_operation(&self, operation: &str) -> bool {
        self.blocked_operations.iter().any(|name| name == operation)
    }
}
