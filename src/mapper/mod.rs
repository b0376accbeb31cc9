//! Per-operator lowering
//!
//! One `OpMapper` implementation per source operator kind, dispatched
//! through an explicit `MapperRegistry` that the pipeline constructs once.
//! Adding an operator means adding a mapper and one registration line;
//! the dispatch core never changes.

use rustc_hash::FxHashMap;

use crate::emitter::GraphEmitter;
use crate::error::ExportResult;
use crate::ir::SourceOp;

pub mod activation;
pub mod clip;
pub mod quantize;

pub use activation::{LeakyReluMapper, ReluMapper};
pub use clip::ClipMapper;
pub use quantize::{DequantizeLinearMapper, QuantizeLinearMapper};

/// Lowering strategy for one source operator kind
pub trait OpMapper {
    /// Minimum target opset this instance can be lowered to
    ///
    /// Depends on the instance, not just the kind: optional operands
    /// supplied as tensors raise the floor to the version that supports
    /// tensor operands for that role.
    fn min_opset(&self, op: &SourceOp) -> i64;

    /// Emit the target node(s) for this instance into the emitter
    fn lower(&self, op: &SourceOp, emitter: &mut GraphEmitter) -> ExportResult<()>;
}

/// Source operator kind → mapper, constructed once per pipeline
#[derive(Default)]
pub struct MapperRegistry {
    mappers: FxHashMap<&'static str, Box<dyn OpMapper + Send + Sync>>,
}

impl MapperRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with all built-in mappers, registered in a fixed order
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("clip", Box::new(ClipMapper));
        registry.register("relu", Box::new(ReluMapper));
        registry.register("leaky_relu", Box::new(LeakyReluMapper));
        registry.register("quantize_linear", Box::new(QuantizeLinearMapper));
        registry.register("dequantize_linear", Box::new(DequantizeLinearMapper));
        registry
    }

    /// Register a mapper for a source operator kind
    ///
    /// A later registration for the same kind replaces the earlier one.
    pub fn register(&mut self, kind: &'static str, mapper: Box<dyn OpMapper + Send + Sync>) {
        self.mappers.insert(kind, mapper);
    }

    /// Look up the mapper for an operator kind
    pub fn get(&self, kind: &str) -> Option<&(dyn OpMapper + Send + Sync)> {
        self.mappers.get(kind).map(|b| b.as_ref())
    }

    /// True if the kind has a registered mapper
    pub fn contains(&self, kind: &str) -> bool {
        self.mappers.contains_key(kind)
    }

    /// Number of registered mappers
    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    /// True if no mappers are registered
    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_registered() {
        let registry = MapperRegistry::with_builtins();
        assert!(registry.contains("clip"));
        assert!(registry.contains("relu"));
        assert!(registry.contains("quantize_linear"));
        assert!(registry.contains("dequantize_linear"));
        assert!(!registry.contains("conv2d"));
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_registration_replaces() {
        let mut registry = MapperRegistry::new();
        assert!(registry.is_empty());
        registry.register("relu", Box::new(ReluMapper));
        registry.register("relu", Box::new(ReluMapper));
        assert_eq!(registry.len(), 1);
    }
}
