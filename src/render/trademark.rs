//! Pluggable trademark glyph strategies.
//!
//! A [`TrademarkRegistry`] holds strategies sorted by ascending priority and
//! picks the first one that applies to a watermark. The default strategy
//! appends a registered-trademark sign at half the main font size.

use std::sync::Arc;

use crate::attributes::WatermarkAttributes;

/// The registered trademark sign.
pub const TRADEMARK_GLYPH: &str = "\u{00AE}";

/// Priority assigned to strategies that do not override it. Lower values
/// are evaluated first.
pub const DEFAULT_PRIORITY: u32 = 100;

/// A rule deciding whether and how a trademark glyph accompanies a
/// watermark.
pub trait TrademarkStrategy: Send + Sync + std::fmt::Debug {
    /// Evaluation order; lower runs first.
    fn priority(&self) -> u32 {
        DEFAULT_PRIORITY
    }

    /// Whether this strategy handles the given watermark.
    fn applies(&self, attrs: &WatermarkAttributes) -> bool;

    /// The glyph to render.
    fn glyph(&self) -> &str;

    /// Glyph font size as a fraction of the main font size.
    fn scale(&self) -> f64 {
        0.5
    }
}

/// The built-in strategy: `®` at half size for any watermark with the
/// trademark flag set.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTrademarkStrategy;

impl TrademarkStrategy for DefaultTrademarkStrategy {
    fn applies(&self, attrs: &WatermarkAttributes) -> bool {
        attrs.trademark
    }

    fn glyph(&self) -> &str {
        TRADEMARK_GLYPH
    }
}

/// Priority-ordered collection of trademark strategies.
#[derive(Debug, Clone, Default)]
pub struct TrademarkRegistry {
    strategies: Vec<Arc<dyn TrademarkStrategy>>,
}

impl TrademarkRegistry {
    /// An empty registry. No glyph is ever rendered.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry containing the built-in strategy.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(DefaultTrademarkStrategy));
        registry
    }

    /// Add a strategy, keeping the collection sorted by ascending priority.
    ///
    /// Strategies with equal priority keep their registration order.
    pub fn register(&mut self, strategy: Arc<dyn TrademarkStrategy>) {
        self.strategies.push(strategy);
        self.strategies.sort_by_key(|s| s.priority());
    }

    /// The first strategy (in priority order) that applies, if any.
    pub fn select(&self, attrs: &WatermarkAttributes) -> Option<&dyn TrademarkStrategy> {
        self.strategies
            .iter()
            .find(|s| s.applies(attrs))
            .map(Arc::as_ref)
    }

    /// Number of registered strategies.
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}
