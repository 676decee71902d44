use super::{Mapper, MapperRegistry, OpContext};
use crate::exporter::ExportError;
use crate::graph::OnnxGraph;
use crate::program::DType;

// Types a scalar constant can be materialized in; anything else is cast to
// f32 before the arithmetic.
const SCALAR_TYPES: [DType; 4] = [DType::F32, DType::F64, DType::I32, DType::I64];

pub fn register(registry: &mut MapperRegistry) {
    registry.register("scale", ScaleMapper::bind);
}

pub struct ScaleMapper {
    scale: f32,
    bias: f32,
    bias_after_scale: bool,
}

impl ScaleMapper {
    pub fn bind(ctx: &OpContext<'_>) -> Result<Box<dyn Mapper>, ExportError> {
        Ok(Box::new(Self {
            scale: ctx.op.attr("scale")?,
            bias: ctx.op.attr("bias")?,
            bias_after_scale: ctx.op.attr("bias_after_scale")?,
        }))
    }

    fn is_identity(&self) -> bool {
        (self.scale - 1.0).abs() < 1e-6 && self.bias.abs() < 1e-6
    }
}

impl Mapper for ScaleMapper {
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
        let info = graph.tensor_info(x)?.clone();

        if self.is_identity() {
            graph.add_node("Identity", &ctx.node_name("identity"), &[x], &[out]);
            return Ok(vec![out.to_string()]);
        }

        let x_name = if SCALAR_TYPES.contains(&info.dtype) {
            x.to_string()
        } else {
            graph.auto_cast(x, DType::F32, &ctx.node_name("cast"))?
        };
        let dtype = graph.tensor_info(&x_name)?.dtype;

        let scale_c =
            graph.scalar_initializer(&ctx.node_name("scale"), dtype, f64::from(self.scale))?;
        let bias_c =
            graph.scalar_initializer(&ctx.node_name("bias"), dtype, f64::from(self.bias))?;

        let tmp = ctx.node_name("tmp");
        graph.register_tensor(&tmp, dtype, info.shape.clone());
        if self.bias_after_scale {
            graph.add_node("Mul", &ctx.node_name("mul"), &[&x_name, &scale_c], &[&tmp]);
            graph.add_node("Add", &ctx.node_name("add"), &[&tmp, &bias_c], &[out]);
        } else {
            graph.add_node("Add", &ctx.node_name("add"), &[&x_name, &bias_c], &[&tmp]);
            graph.add_node("Mul", &ctx.node_name("mul"), &[&tmp, &scale_c], &[out]);
        }
        Ok(vec![out.to_string()])
    }
}
