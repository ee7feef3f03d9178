//! Model Variant Cache
//!
//! Shared cache of model-invoker variants keyed by model name and
//! temperature. The cache is shared mutable state across concurrent runs,
//! so lookup-or-construct must be atomic: two runs requesting the same
//! uncached variant must not race to construct duplicates. `DashMap`'s
//! entry API provides the required compute-if-absent semantics.

use std::sync::Arc;

use dashmap::DashMap;

use super::invoker::{ModelInvoker, ModelOverrides};

/// Cache key for a variant. Temperature is keyed by bit pattern so the
/// key stays `Eq + Hash` without rounding surprises.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VariantKey {
    model: Option<String>,
    temperature_bits: Option<u32>,
}

impl VariantKey {
    fn new(overrides: &ModelOverrides) -> Self {
        Self {
            model: overrides.model.clone(),
            temperature_bits: overrides.temperature.map(f32::to_bits),
        }
    }
}

/// Shared cache of invoker variants derived from a base invoker.
pub struct ModelVariantCache {
    base: Arc<dyn ModelInvoker>,
    variants: DashMap<VariantKey, Arc<dyn ModelInvoker>>,
}

impl ModelVariantCache {
    /// Create a cache around the base invoker.
    pub fn new(base: Arc<dyn ModelInvoker>) -> Self {
        Self {
            base,
            variants: DashMap::new(),
        }
    }

    /// The base invoker without overrides.
    pub fn base(&self) -> Arc<dyn ModelInvoker> {
        self.base.clone()
    }

    /// Resolve the invoker for the given overrides, constructing and
    /// caching a variant on first use. Empty overrides resolve to the
    /// base invoker without touching the cache.
    pub fn resolve(&self, overrides: &ModelOverrides) -> Arc<dyn ModelInvoker> {
        if overrides.is_empty() {
            return self.base.clone();
        }

        self.variants
            .entry(VariantKey::new(overrides))
            .or_insert_with(|| self.base.with_overrides(overrides))
            .clone()
    }

    /// Number of cached variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether no variants have been constructed yet.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
