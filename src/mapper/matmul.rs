use super::{Mapper, MapperRegistry, OpContext};
use crate::exporter::ExportError;
use crate::graph::{int_attr, OnnxGraph};
use crate::program::DType;

// Operand types the MatMul of opset 7 accepts natively; everything else is
// cast to f32 first.
const NO_CAST_OPSET7: [DType; 4] = [DType::F16, DType::F32, DType::I32, DType::I64];

pub fn register(registry: &mut MapperRegistry) {
    registry.register("matmul_v2", MatmulMapper::bind);
}

pub struct MatmulMapper {
    trans_x: bool,
    trans_y: bool,
}

impl MatmulMapper {
    pub fn bind(ctx: &OpContext<'_>) -> Result<Box<dyn Mapper>, ExportError> {
        Ok(Box::new(Self {
            trans_x: ctx.op.attr("trans_x")?,
            trans_y: ctx.op.attr("trans_y")?,
        }))
    }
}

impl Mapper for MatmulMapper {
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
        let y = ctx.input("Y")?;
        let out = ctx.output("Out")?;

        // Both operand types are resolved before any node is emitted.
        let x_info = graph.tensor_info(x)?.clone();
        let y_info = graph.tensor_info(y)?.clone();

        let x_name = if NO_CAST_OPSET7.contains(&x_info.dtype) {
            x.to_string()
        } else {
            graph.auto_cast(x, DType::F32, &ctx.node_name("cast_x"))?
        };
        let y_name = if NO_CAST_OPSET7.contains(&y_info.dtype) {
            y.to_string()
        } else {
            graph.auto_cast(y, DType::F32, &ctx.node_name("cast_y"))?
        };

        let x_dtype = graph.tensor_info(&x_name)?.dtype;
        let y_dtype = graph.tensor_info(&y_name)?.dtype;

        // A transposed X against a plain Y over two rank-2 operands is a
        // single Gemm with a zero bias. Gemm of opset 7 only takes the wide
        // float types, and its bias slot is mandatory.
        if self.trans_x
            && !self.trans_y
            && x_info.rank() == 2
            && y_info.rank() == 2
            && x_dtype == y_dtype
            && matches!(x_dtype, DType::F32 | DType::F64)
        {
            let zero = graph.scalar_initializer(&ctx.node_name("zero"), x_dtype, 0.0)?;
            let node = graph.add_node(
                "Gemm",
                &ctx.node_name("gemm"),
                &[&x_name, &y_name, &zero],
                &[out],
            );
            node.attribute.push(int_attr("transA", 1));
            return Ok(vec![out.to_string()]);
        }

        let x_name = if self.trans_x && x_info.rank() > 1 {
            graph.transpose_last_two(&x_name, &ctx.node_name("trans_x"))?
        } else {
            x_name
        };
        let y_name = if self.trans_y && y_info.rank() > 1 {
            graph.transpose_last_two(&y_name, &ctx.node_name("trans_y"))?
        } else {
            y_name
        };

        graph.add_node(
            "MatMul",
            &ctx.node_name("matmul"),
            &[&x_name, &y_name],
            &[out],
        );
        Ok(vec![out.to_string()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::{AttributeValue, OperatorAttribute, OperatorDescriptor, TensorRef};

    fn matmul_op(trans_x: bool, trans_y: bool) -> OperatorDescriptor {
        OperatorDescriptor {
            ty: "matmul_v2".to_string(),
            inputs: vec![
                TensorRef {
                    parameter: "X".to_string(),
                    arguments: vec!["x".to_string()],
                },
                TensorRef {
                    parameter: "Y".to_string(),
                    arguments: vec!["y".to_string()],
                },
            ],
            outputs: vec![TensorRef {
                parameter: "Out".to_string(),
                arguments: vec!["out".to_string()],
            }],
            attrs: vec![
                OperatorAttribute {
                    name: "trans_x".to_string(),
                    value: AttributeValue::Bool(trans_x),
                },
                OperatorAttribute {
                    name: "trans_y".to_string(),
                    value: AttributeValue::Bool(trans_y),
                },
            ],
        }
    }

    fn translate(
        op: &OperatorDescriptor,
        graph: &mut OnnxGraph,
        opset: i64,
    ) -> Result<Vec<String>, ExportError> {
        let ctx = OpContext {
            op,
            block_id: 0,
            op_id: 1,
        };
        let mapper = MatmulMapper::bind(&ctx)?;
        mapper.translate(&ctx, graph, opset)
    }

    fn op_types(graph: &OnnxGraph) -> Vec<&str> {
        graph
            .nodes()
            .iter()
            .filter_map(|n| n.op_type.as_deref())
            .collect()
    }

    #[test]
    fn test_plain_multiply_emits_single_node() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::F32, vec![2, 3]);
        graph.register_tensor("y", DType::F32, vec![3, 4]);

        translate(&matmul_op(false, false), &mut graph, 7).unwrap();

        assert_eq!(op_types(&graph), vec!["MatMul"]);
        assert_eq!(graph.nodes()[0].input, vec!["x", "y"]);
        assert_eq!(graph.nodes()[0].output, vec!["out"]);
    }

    #[test]
    fn test_trans_y_rank2_emits_transpose() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::F32, vec![2, 3]);
        graph.register_tensor("y", DType::F32, vec![4, 3]);

        translate(&matmul_op(false, true), &mut graph, 7).unwrap();

        assert_eq!(op_types(&graph), vec!["Transpose", "MatMul"]);
        let transpose_out = graph.nodes()[0].output[0].clone();
        assert_eq!(graph.nodes()[1].input, vec!["x".to_string(), transpose_out]);
    }

    #[test]
    fn test_trans_flag_on_vector_is_ignored() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::F32, vec![3]);
        graph.register_tensor("y", DType::F32, vec![3, 4]);

        translate(&matmul_op(true, false), &mut graph, 7).unwrap();

        assert_eq!(op_types(&graph), vec!["MatMul"]);
        assert_eq!(graph.nodes()[0].input, vec!["x", "y"]);
    }

    #[test]
    fn test_trans_x_rank3_emits_transpose() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::F32, vec![8, 3, 2]);
        graph.register_tensor("y", DType::F32, vec![3, 4]);

        translate(&matmul_op(true, false), &mut graph, 7).unwrap();

        assert_eq!(op_types(&graph), vec!["Transpose", "MatMul"]);
    }

    #[test]
    fn test_unsupported_operand_type_is_cast() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::I8, vec![2, 3]);
        graph.register_tensor("y", DType::F32, vec![3, 4]);

        translate(&matmul_op(false, false), &mut graph, 7).unwrap();

        assert_eq!(op_types(&graph), vec!["Cast", "MatMul"]);
        let cast_out = graph.nodes()[0].output[0].clone();
        assert_eq!(graph.nodes()[1].input, vec![cast_out, "y".to_string()]);
    }

    #[test]
    fn test_trans_x_rank2_fuses_into_gemm() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::F32, vec![3, 2]);
        graph.register_tensor("y", DType::F32, vec![3, 4]);

        translate(&matmul_op(true, false), &mut graph, 7).unwrap();

        assert_eq!(op_types(&graph), vec!["Gemm"]);
        let node = &graph.nodes()[0];
        assert_eq!(node.input.len(), 3);
        assert_eq!(node.attribute[0].name.as_deref(), Some("transA"));
        assert_eq!(node.attribute[0].i, Some(1));
        assert_eq!(graph.initializers().len(), 1);
    }

    #[test]
    fn test_unsupported_opset_emits_nothing() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::F32, vec![2, 3]);
        graph.register_tensor("y", DType::F32, vec![3, 4]);

        let result = translate(&matmul_op(false, false), &mut graph, 6);
        assert!(matches!(
            result,
            Err(ExportError::UnsupportedOpset { requested: 6, .. })
        ));
        assert!(graph.nodes().is_empty());
    }

    #[test]
    fn test_missing_operand_type_is_fatal() {
        let mut graph = OnnxGraph::new();
        graph.register_tensor("x", DType::F32, vec![2, 3]);

        let result = translate(&matmul_op(false, false), &mut graph, 7);
        assert!(result.is_err());
        assert!(graph.nodes().is_empty());
    }

    #[test]
    fn test_missing_trans_attr_fails_at_bind() {
        let mut op = matmul_op(false, false);
        op.attrs.remove(0);
        let ctx = OpContext {
            op: &op,
            block_id: 0,
            op_id: 0,
        };
        assert!(MatmulMapper::bind(&ctx).is_err());
    }
}
