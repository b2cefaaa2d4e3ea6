//! Validation Engine
//!
//! The single entry point callers hold on to. Owns the result cache and the
//! hit/miss/time counters; construct one at the composition root and share it
//! (it is `Send + Sync`).

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use serde_json::Value;

use crate::cache::{CacheKey, ResultCache};
use crate::config::ValidatorConfig;
use crate::error::Result;
use crate::registry::ComponentRegistry;
use crate::result::{CacheStats, DebugInfo, PerformanceInfo, PerformanceStats, ValidationResult};
use crate::schema::ComponentNode;
use crate::similarity::SimilarityMatcher;
use crate::slots::{validate_schema_slots, SlotRegistry, SlotValidationError, SlotValidator};
use crate::validator::StructuralValidator;

/// Mutable state shared by all calls
#[derive(Debug, Default)]
struct EngineState {
    cache: ResultCache,
    hits: u64,
    misses: u64,
    total_micros: f64,
}

impl EngineState {
    fn cache_stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.len(),
        }
    }
}

/// Caching validation facade over the structural and slot validators
#[derive(Debug)]
pub struct ValidationEngine {
    validator: StructuralValidator,
    slots: SlotValidator,
    state: Mutex<EngineState>,
}

impl ValidationEngine {
    pub fn new(
        components: Arc<ComponentRegistry>,
        slots: Arc<SlotRegistry>,
        matcher: SimilarityMatcher,
        cache_capacity: usize,
    ) -> Self {
        Self {
            validator: StructuralValidator::new(components, matcher),
            slots: SlotValidator::new(slots, matcher),
            state: Mutex::new(EngineState {
                cache: ResultCache::new(cache_capacity),
                ..Default::default()
            }),
        }
    }

    /// Engine over the built-in registries with default settings
    pub fn builtin() -> Result<Self> {
        Self::from_config(&ValidatorConfig::default())
    }

    /// Engine whose registries and limits come from configuration
    pub fn from_config(config: &ValidatorConfig) -> Result<Self> {
        let components = match &config.registry.components {
            Some(path) => ComponentRegistry::load(path)?,
            None => ComponentRegistry::builtin()?,
        };
        let slots = match &config.registry.slots {
            Some(path) => SlotRegistry::load(path)?,
            None => SlotRegistry::builtin()?,
        };

        tracing::info!(
            target: crate::LOG_RUNTIME,
            components = components.len(),
            slot_tables = slots.len(),
            cache_capacity = config.cache.capacity,
            "Validation engine initialized"
        );

        Ok(Self::new(
            Arc::new(components),
            Arc::new(slots),
            config.suggestions,
            config.cache.capacity,
        ))
    }

    pub fn registry(&self) -> &ComponentRegistry {
        self.validator.registry()
    }

    pub fn slot_registry(&self) -> &SlotRegistry {
        self.slots.registry()
    }

    /// Validate a component tree.
    ///
    /// A tree seen before (same canonical content) returns the stored result
    /// as-is, including its first-run timings and debug block.
    pub fn validate(&self, tree: &ComponentNode, debug: bool) -> ValidationResult {
        let key = CacheKey::for_node(tree);

        // Lookup, compute and insert form one critical section
        let mut state = self.state.lock();
        let started = Instant::now();

        if let Some(cached) = state.cache.get(&key) {
            let cached = cached.clone();
            state.hits += 1;
            tracing::debug!(target: crate::LOG_CACHE, "Cache hit for {}", key.short());
            return cached;
        }
        state.misses += 1;
        tracing::debug!(target: crate::LOG_CACHE, "Cache miss for {}", key.short());

        tracing::debug!(
            target: crate::LOG_RUNTIME,
            "Starting validation for schema type: {}",
            tree.component_type
        );
        let outcome = self.validator.walk(tree, debug);
        let duration_micros = started.elapsed().as_secs_f64() * 1_000_000.0;

        let result = ValidationResult {
            valid: outcome.errors.is_empty(),
            errors: outcome.errors,
            performance: PerformanceInfo {
                duration_micros,
                nodes_checked: outcome.nodes_checked,
            },
            debug: debug.then(|| DebugInfo {
                trace: outcome.trace,
                cache_stats: state.cache_stats(),
            }),
        };

        tracing::debug!(
            target: crate::LOG_PERFORMANCE,
            "Validation completed in {:.1}us, checked {} components",
            duration_micros,
            outcome.nodes_checked
        );

        state.total_micros += duration_micros;
        if let Some(evicted) = state.cache.insert(key, result.clone()) {
            tracing::debug!(
                target: crate::LOG_CACHE,
                "Cache size limit reached, removed oldest entry {}",
                evicted.short()
            );
        }

        result
    }

    /// Validate every slot node in a raw page document
    pub fn validate_slots(&self, document: &Value) -> Vec<SlotValidationError> {
        let errors = validate_schema_slots(document, &self.slots, &[]);
        if !errors.is_empty() {
            tracing::debug!(
                target: crate::LOG_RUNTIME,
                "Slot surface found {} errors",
                errors.len()
            );
        }
        errors
    }

    /// Drop all cached results; counters are kept
    pub fn clear_cache(&self) {
        self.state.lock().cache.clear();
        tracing::debug!(target: crate::LOG_CACHE, "Cache cleared");
    }

    pub fn cache_capacity(&self) -> usize {
        self.state.lock().cache.capacity()
    }

    pub fn performance_stats(&self) -> PerformanceStats {
        let state = self.state.lock();
        let average_validation_micros = if state.misses == 0 {
            0.0
        } else {
            state.total_micros / state.misses as f64
        };
        PerformanceStats {
            cache_size: state.cache.len(),
            cache_hits: state.hits,
            cache_misses: state.misses,
            average_validation_micros,
        }
    }

    /// Zero the hit, miss and time counters; the cache is kept
    pub fn reset_performance_stats(&self) {
        let mut state = self.state.lock();
        state.hits = 0;
        state.misses = 0;
        state.total_micros = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(capacity: usize) -> ValidationEngine {
        ValidationEngine::new(
            Arc::new(ComponentRegistry::builtin().unwrap()),
            Arc::new(SlotRegistry::builtin().unwrap()),
            SimilarityMatcher::default(),
            capacity,
        )
    }

    fn card(title: &str) -> ComponentNode {
        ComponentNode::new("Card").with_prop("title", title)
    }

    #[test]
    fn test_cache_hit_returns_stored_result() {
        let engine = engine(10);
        let first = engine.validate(&card("a"), false);
        let second = engine.validate(&card("a"), false);
        assert_eq!(first, second);

        let stats = engine.performance_stats();
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_size, 1);
    }

    #[test]
    fn test_debug_snapshot_taken_before_insert() {
        let engine = engine(10);
        engine.validate(&card("a"), false);
        let result = engine.validate(&card("b"), true);
        let stats = result.debug.unwrap().cache_stats;
        assert_eq!(stats, CacheStats { hits: 0, misses: 2, size: 1 });
    }

    #[test]
    fn test_capacity_bound() {
        let engine = engine(3);
        for i in 0..5 {
            engine.validate(&card(&i.to_string()), false);
        }
        assert_eq!(engine.performance_stats().cache_size, 3);

        // "0" and "1" were evicted, "4" is still cached
        engine.reset_performance_stats();
        engine.validate(&card("4"), false);
        engine.validate(&card("0"), false);
        let stats = engine.performance_stats();
        assert_eq!((stats.cache_hits, stats.cache_misses), (1, 1));
    }

    #[test]
    fn test_clear_cache_keeps_counters() {
        let engine = engine(10);
        engine.validate(&card("a"), false);
        engine.clear_cache();
        let stats = engine.performance_stats();
        assert_eq!(stats.cache_size, 0);
        assert_eq!(stats.cache_misses, 1);

        engine.validate(&card("a"), false);
        assert_eq!(engine.performance_stats().cache_misses, 2);
    }

    #[test]
    fn test_average_duration() {
        let engine = engine(10);
        assert_eq!(engine.performance_stats().average_validation_micros, 0.0);

        engine.validate(&card("a"), false);
        engine.validate(&card("a"), false);
        let stats = engine.performance_stats();
        assert!(stats.average_validation_micros >= 0.0);

        engine.reset_performance_stats();
        let stats = engine.performance_stats();
        assert_eq!((stats.cache_hits, stats.cache_misses), (0, 0));
        assert_eq!(stats.average_validation_micros, 0.0);
        assert_eq!(stats.cache_size, 1);
    }

    #[test]
    fn test_duration_excludes_lock_wait() {
        let engine = engine(10);

        let result = std::thread::scope(|scope| {
            let held = engine.state.lock();
            let worker = scope.spawn(|| engine.validate(&card("a"), false));
            std::thread::sleep(std::time::Duration::from_millis(50));
            drop(held);
            worker.join().unwrap()
        });

        assert!(result.performance.duration_micros < 40_000.0);
        assert!(engine.performance_stats().average_validation_micros < 40_000.0);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ValidationEngine>();
    }
}
