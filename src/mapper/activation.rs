use super::{Mapper, MapperRegistry, OpContext};
use crate::exporter::ExportError;
use crate::graph::OnnxGraph;

const DIRECT: &[(&str, &str)] = &[
    ("relu", "Relu"),
    ("sigmoid", "Sigmoid"),
    ("tanh", "Tanh"),
    ("sqrt", "Sqrt"),
    ("exp", "Exp"),
];

pub fn register(registry: &mut MapperRegistry) {
    for &(ty, _) in DIRECT {
        registry.register(ty, ActivationMapper::bind);
    }
}

pub struct ActivationMapper {
    onnx_type: &'static str,
}

impl ActivationMapper {
    pub fn bind(ctx: &OpContext<'_>) -> Result<Box<dyn Mapper>, ExportError> {
        match DIRECT.iter().copied().find(|&(ty, _)| ty == ctx.op.ty) {
            Some((_, onnx_type)) => Ok(Box::new(Self { onnx_type })),
            None => Err(ExportError::UnsupportedOperator {
                op: ctx.op.ty.clone(),
                block_id: ctx.block_id,
                op_id: ctx.op_id,
            }),
        }
    }
}

impl Mapper for ActivationMapper {
    fn opsets(&self) -> &'static [i64] {
        &[7]
    }

    fn emit(
        &self,
        ctx: &OpContext<'_>,
        graph: &mut OnnxGraph,
        _opset: i64,
    ) -> Result<Vec<String>, ExportError> {
        let x = ctx.input("X")?;
        let out = ctx.output("Out")?;
        graph.add_node(
            self.onnx_type,
            &ctx.node_name(self.onnx_type),
            &[x],
            &[out],
        );
        Ok(vec![out.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{OperatorDescriptor, TensorRef};

    fn unary_op(ty: &str) -> OperatorDescriptor {
        OperatorDescriptor {
            ty: ty.to_string(),
            inputs: vec![TensorRef {
                parameter: "X".to_string(),
                arguments: vec!["x".to_string()],
            }],
            outputs: vec![TensorRef {
                parameter: "Out".to_string(),
                arguments: vec!["y".to_string()],
            }],
            attrs: Vec::new(),
        }
    }

    #[test]
    fn test_direct_lowering() {
        let op = unary_op("relu");
        let ctx = OpContext {
            op: &op,
            block_id: 0,
            op_id: 3,
        };
        let mut graph = OnnxGraph::new();

        let mapper = ActivationMapper::bind(&ctx).unwrap();
        let outputs = mapper.translate(&ctx, &mut graph, 11).unwrap();

        assert_eq!(outputs, vec!["y"]);
        assert_eq!(graph.nodes().len(), 1);
        let node = &graph.nodes()[0];
        assert_eq!(node.op_type.as_deref(), Some("Relu"));
        assert_eq!(node.name.as_deref(), Some("relu.0.3.Relu"));
        assert_eq!(node.input, vec!["x"]);
        assert_eq!(node.output, vec!["y"]);
    }

    #[test]
    fn test_registry_covers_all_direct_types() {
        let registry = MapperRegistry::with_builtin();
        for &(ty, _) in DIRECT {
            assert!(registry.contains(ty));
        }
    }
}
