use std::collections::HashMap;

use crate::exporter::ExportError;
use crate::graph::OnnxGraph;
use crate::program::{OperatorDescriptor, ProgramError};

pub mod activation;
pub mod matmul;
pub mod scale;

// One operator occurrence; block and op ids namespace every node and tensor
// the mapper emits.
pub struct OpContext<'a> {
    pub op: &'a OperatorDescriptor,
    pub block_id: usize,
    pub op_id: usize,
}

impl<'a> OpContext<'a> {
    pub fn node_name(&self, suffix: &str) -> String {
        format!("{}.{}.{}.{}", self.op.ty, self.block_id, self.op_id, suffix)
    }

    pub fn input(&self, parameter: &str) -> Result<&'a str, ProgramError> {
        self.op.input_argument(parameter)
    }

    pub fn output(&self, parameter: &str) -> Result<&'a str, ProgramError> {
        self.op.output_argument(parameter)
    }
}

// Greatest declared version not above the requested target.
pub fn resolve_opset(entries: &[i64], requested: i64) -> Option<i64> {
    entries.iter().copied().filter(|&v| v <= requested).max()
}

pub trait Mapper {
    // Opset versions at which this operator's lowering changes, ascending;
    // the first entry is the minimum supported version.
    fn opsets(&self) -> &'static [i64];

    fn emit(
        &self,
        ctx: &OpContext<'_>,
        graph: &mut OnnxGraph,
        opset: i64,
    ) -> Result<Vec<String>, ExportError>;

    fn translate(
        &self,
        ctx: &OpContext<'_>,
        graph: &mut OnnxGraph,
        requested: i64,
    ) -> Result<Vec<String>, ExportError> {
        match resolve_opset(self.opsets(), requested) {
            Some(version) => self.emit(ctx, graph, version),
            None => Err(ExportError::UnsupportedOpset {
                op: ctx.op.ty.clone(),
                requested,
            }),
        }
    }
}

pub type BindFn = fn(&OpContext<'_>) -> Result<Box<dyn Mapper>, ExportError>;

pub struct MapperRegistry {
    builders: HashMap<&'static str, BindFn>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        matmul::register(&mut registry);
        activation::register(&mut registry);
        scale::register(&mut registry);
        registry
    }

    pub fn register(&mut self, ty: &'static str, bind: BindFn) {
        self.builders.insert(ty, bind);
    }

    pub fn contains(&self, ty: &str) -> bool {
        self.builders.contains_key(ty)
    }

    pub fn bind(&self, ctx: &OpContext<'_>) -> Result<Box<dyn Mapper>, ExportError> {
        match self.builders.get(ctx.op.ty.as_str()) {
            Some(bind) => bind(ctx),
            None => Err(ExportError::UnsupportedOperator {
                op: ctx.op.ty.clone(),
                block_id: ctx.block_id,
                op_id: ctx.op_id,
            }),
        }
    }
}

impl Default for MapperRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedMapper;

    impl Mapper for FixedMapper {
        fn opsets(&self) -> &'static [i64] {
            &[7, 9, 13]
        }

        fn emit(
            &self,
            ctx: &OpContext<'_>,
            graph: &mut OnnxGraph,
            opset: i64,
        ) -> Result<Vec<String>, ExportError> {
            let name = ctx.node_name(&format!("v{opset}"));
            graph.add_node("Identity", &name, &["x"], &["y"]);
            Ok(vec!["y".to_string()])
        }
    }

    fn fixed_op() -> OperatorDescriptor {
        OperatorDescriptor {
            ty: "fixed".to_string(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            attrs: Vec::new(),
        }
    }

    #[test]
    fn test_resolve_opset_picks_greatest_not_above_target() {
        assert_eq!(resolve_opset(&[7, 9, 13], 7), Some(7));
        assert_eq!(resolve_opset(&[7, 9, 13], 8), Some(7));
        assert_eq!(resolve_opset(&[7, 9, 13], 13), Some(13));
        assert_eq!(resolve_opset(&[7, 9, 13], 15), Some(13));
        assert_eq!(resolve_opset(&[7, 9, 13], 6), None);
    }

    #[test]
    fn test_translate_dispatches_resolved_version() {
        let op = fixed_op();
        let ctx = OpContext {
            op: &op,
            block_id: 0,
            op_id: 2,
        };
        let mut graph = OnnxGraph::new();

        FixedMapper.translate(&ctx, &mut graph, 11).unwrap();
        assert_eq!(graph.nodes()[0].name.as_deref(), Some("fixed.0.2.v9"));
    }

    #[test]
    fn test_unsupported_opset_emits_nothing() {
        let op = fixed_op();
        let ctx = OpContext {
            op: &op,
            block_id: 0,
            op_id: 0,
        };
        let mut graph = OnnxGraph::new();

        let result = FixedMapper.translate(&ctx, &mut graph, 6);
        assert!(matches!(
            result,
            Err(ExportError::UnsupportedOpset { requested: 6, .. })
        ));
        assert!(graph.nodes().is_empty());
    }

    #[test]
    fn test_registry_rejects_unknown_op() {
        let registry = MapperRegistry::with_builtin();
        let op = fixed_op();
        let ctx = OpContext {
            op: &op,
            block_id: 0,
            op_id: 4,
        };

        assert!(matches!(
            registry.bind(&ctx),
            Err(ExportError::UnsupportedOperator { op_id: 4, .. })
        ));
    }
}
