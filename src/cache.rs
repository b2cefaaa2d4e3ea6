//! Content-addressed result cache
//!
//! Keys are SHA256 digests of a node's canonical JSON form. Eviction is by
//! insertion order: once the cache holds more than `capacity` entries the
//! oldest inserted entry goes, regardless of how recently it was read.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use sha2::{Digest, Sha256};

use crate::result::ValidationResult;
use crate::schema::ComponentNode;

/// Default number of cached results
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// SHA256 of a node's canonical serialization
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a subtree: type, properties (sorted by key), children, id and
    /// slot name. Nothing about the node's ancestors goes into the key.
    pub fn for_node(node: &ComponentNode) -> Self {
        let canonical = node.canonical_json().to_string();
        Self(format!("{:x}", Sha256::digest(canonical.as_bytes())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log lines
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bounded map of validation results with insertion-order eviction
#[derive(Debug)]
pub struct ResultCache {
    entries: HashMap<CacheKey, ValidationResult>,
    order: VecDeque<CacheKey>,
    capacity: usize,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<&ValidationResult> {
        self.entries.get(key)
    }

    /// Insert a result, returning the key evicted to stay within capacity.
    ///
    /// Re-inserting an existing key replaces its value without moving it in
    /// the eviction order.
    pub fn insert(&mut self, key: CacheKey, result: ValidationResult) -> Option<CacheKey> {
        if self.entries.insert(key.clone(), result).is_none() {
            self.order.push_back(key);
        }

        if self.entries.len() > self.capacity {
            let oldest = self.order.pop_front()?;
            self.entries.remove(&oldest);
            return Some(oldest);
        }
        None
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::PerformanceInfo;

    fn result(nodes: usize) -> ValidationResult {
        ValidationResult {
            valid: true,
            errors: vec![],
            performance: PerformanceInfo {
                duration_micros: 1.0,
                nodes_checked: nodes,
            },
            debug: None,
        }
    }

    fn key(title: &str) -> CacheKey {
        CacheKey::for_node(&ComponentNode::new("Card").with_prop("title", title))
    }

    #[test]
    fn test_key_consistency() {
        assert_eq!(key("a"), key("a"));
        assert_ne!(key("a"), key("b"));
        assert_eq!(key("a").as_str().len(), 64);
    }

    #[test]
    fn test_key_ignores_property_insertion_order() {
        let a = ComponentNode::new("Card").with_prop("title", "x").with_prop("bordered", true);
        let b = ComponentNode::new("Card").with_prop("bordered", true).with_prop("title", "x");
        assert_eq!(CacheKey::for_node(&a), CacheKey::for_node(&b));
    }

    #[test]
    fn test_key_hashes_canonical_json() {
        use sha2::{Digest, Sha256};

        let node = ComponentNode::new("Card").with_prop("title", "a");
        let expected = Sha256::digest(br#"{"properties":{"title":"a"},"type":"Card"}"#);
        assert_eq!(CacheKey::for_node(&node).as_str(), format!("{:x}", expected));

        // Distinct empty-bodied nodes never collapse onto one key
        assert_ne!(
            CacheKey::for_node(&ComponentNode::new("Card")),
            CacheKey::for_node(&ComponentNode::new("Layout"))
        );
    }

    #[test]
    fn test_key_covers_children_id_and_slot_name() {
        let base = ComponentNode::new("Layout");
        let with_child = base.clone().with_child(ComponentNode::new("Card"));
        let with_id = base.clone().with_id("root");
        assert_ne!(CacheKey::for_node(&base), CacheKey::for_node(&with_child));
        assert_ne!(CacheKey::for_node(&base), CacheKey::for_node(&with_id));

        let named = ComponentNode::slot("header", vec![]);
        let other = ComponentNode::slot("footer", vec![]);
        assert_ne!(CacheKey::for_node(&named), CacheKey::for_node(&other));
    }

    #[test]
    fn test_evicts_oldest_inserted() {
        let mut cache = ResultCache::new(2);
        assert_eq!(cache.insert(key("a"), result(1)), None);
        assert_eq!(cache.insert(key("b"), result(2)), None);

        // Reading "a" does not protect it
        assert!(cache.get(&key("a")).is_some());

        assert_eq!(cache.insert(key("c"), result(3)), Some(key("a")));
        assert_eq!(cache.len(), 2);
        assert!(!cache.contains(&key("a")));
        assert!(cache.contains(&key("b")));
        assert!(cache.contains(&key("c")));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut cache = ResultCache::new(2);
        cache.insert(key("a"), result(1));
        cache.insert(key("b"), result(2));
        cache.insert(key("a"), result(10));
        assert_eq!(cache.get(&key("a")).unwrap().performance.nodes_checked, 10);

        assert_eq!(cache.insert(key("c"), result(3)), Some(key("a")));
    }

    #[test]
    fn test_clear() {
        let mut cache = ResultCache::default();
        cache.insert(key("a"), result(1));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
    }
}
