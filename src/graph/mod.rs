use std::collections::HashMap;

use thiserror::Error;

use crate::program::reader::IoBinding;
use crate::program::DType;
use crate::proto::onnx;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unknown tensor type for: {0}")]
    UnknownTensorType(String),
    #[error("cannot materialize a scalar initializer of type {dtype:?}")]
    UnsupportedInitializer { dtype: DType },
}

#[derive(Debug, Clone)]
pub struct TensorInfo {
    pub name: String,
    pub dtype: DType,
    pub shape: Vec<i64>,
}

impl TensorInfo {
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
}

pub fn onnx_dtype(dtype: DType) -> onnx::tensor_proto::DataType {
    use onnx::tensor_proto::DataType;
    match dtype {
        DType::Bool => DataType::Bool,
        DType::U8 => DataType::Uint8,
        DType::I8 => DataType::Int8,
        DType::I16 => DataType::Int16,
        DType::I32 => DataType::Int32,
        DType::I64 => DataType::Int64,
        DType::F16 => DataType::Float16,
        DType::F32 => DataType::Float,
        DType::F64 => DataType::Double,
    }
}

pub fn int_attr(name: &str, value: i64) -> onnx::AttributeProto {
    onnx::AttributeProto {
        name: Some(name.to_string()),
        i: Some(value),
        r#type: Some(onnx::attribute_proto::AttributeType::Int as i32),
        ..Default::default()
    }
}

pub fn ints_attr(name: &str, values: &[i64]) -> onnx::AttributeProto {
    onnx::AttributeProto {
        name: Some(name.to_string()),
        ints: values.to_vec(),
        r#type: Some(onnx::attribute_proto::AttributeType::Ints as i32),
        ..Default::default()
    }
}

pub fn float_attr(name: &str, value: f32) -> onnx::AttributeProto {
    onnx::AttributeProto {
        name: Some(name.to_string()),
        f: Some(value),
        r#type: Some(onnx::attribute_proto::AttributeType::Float as i32),
        ..Default::default()
    }
}

#[derive(Debug, Default)]
pub struct OnnxGraph {
    nodes: Vec<onnx::NodeProto>,
    initializers: Vec<onnx::TensorProto>,
    tensors: HashMap<String, TensorInfo>,
}

impl OnnxGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tensor(&mut self, name: &str, dtype: DType, shape: Vec<i64>) {
        self.tensors.insert(
            name.to_string(),
            TensorInfo {
                name: name.to_string(),
                dtype,
                shape,
            },
        );
    }

    pub fn tensor_info(&self, name: &str) -> Result<&TensorInfo, GraphError> {
        self.tensors
            .get(name)
            .ok_or_else(|| GraphError::UnknownTensorType(name.to_string()))
    }

    pub fn nodes(&self) -> &[onnx::NodeProto] {
        &self.nodes
    }

    pub fn initializers(&self) -> &[onnx::TensorProto] {
        &self.initializers
    }

    pub fn add_node(
        &mut self,
        op_type: &str,
        name: &str,
        inputs: &[&str],
        outputs: &[&str],
    ) -> &mut onnx::NodeProto {
        self.nodes.push(onnx::NodeProto {
            input: inputs.iter().map(|s| s.to_string()).collect(),
            output: outputs.iter().map(|s| s.to_string()).collect(),
            name: Some(name.to_string()),
            op_type: Some(op_type.to_string()),
            ..Default::default()
        });
        let idx = self.nodes.len() - 1;
        &mut self.nodes[idx]
    }

    // Emits a Cast node unless the tensor already has the target type; the
    // returned name is what downstream nodes consume.
    pub fn auto_cast(
        &mut self,
        tensor: &str,
        to: DType,
        node_name: &str,
    ) -> Result<String, GraphError> {
        let info = self.tensor_info(tensor)?.clone();
        if info.dtype == to {
            return Ok(tensor.to_string());
        }
        let out = format!("{node_name}.out");
        let node = self.add_node("Cast", node_name, &[tensor], &[&out]);
        node.attribute.push(int_attr("to", onnx_dtype(to) as i64));
        self.register_tensor(&out, to, info.shape);
        Ok(out)
    }

    // Swaps the last two axes. Tensors of rank < 2 pass through unchanged.
    pub fn transpose_last_two(
        &mut self,
        tensor: &str,
        node_name: &str,
    ) -> Result<String, GraphError> {
        let info = self.tensor_info(tensor)?.clone();
        let rank = info.rank();
        if rank < 2 {
            return Ok(tensor.to_string());
        }
        let mut perm: Vec<i64> = (0..rank as i64).collect();
        perm.swap(rank - 2, rank - 1);
        let mut shape = info.shape.clone();
        shape.swap(rank - 2, rank - 1);

        let out = format!("{node_name}.out");
        let node = self.add_node("Transpose", node_name, &[tensor], &[&out]);
        node.attribute.push(ints_attr("perm", &perm));
        self.register_tensor(&out, info.dtype, shape);
        Ok(out)
    }

    pub fn scalar_initializer(
        &mut self,
        name: &str,
        dtype: DType,
        value: f64,
    ) -> Result<String, GraphError> {
        let raw_data = match dtype {
            DType::F32 => (value as f32).to_le_bytes().to_vec(),
            DType::F64 => value.to_le_bytes().to_vec(),
            DType::I32 => (value as i32).to_le_bytes().to_vec(),
            DType::I64 => (value as i64).to_le_bytes().to_vec(),
            _ => return Err(GraphError::UnsupportedInitializer { dtype }),
        };
        self.initializers.push(onnx::TensorProto {
            dims: Vec::new(),
            data_type: Some(onnx_dtype(dtype) as i32),
            name: Some(name.to_string()),
            raw_data: Some(raw_data),
            ..Default::default()
        });
        self.register_tensor(name, dtype, Vec::new());
        Ok(name.to_string())
    }

    fn value_info(&self, name: &str) -> Result<onnx::ValueInfoProto, GraphError> {
        let info = self.tensor_info(name)?;
        let dim = info
            .shape
            .iter()
            .enumerate()
            .map(|(i, &d)| onnx::tensor_shape_proto::Dimension {
                value: Some(if d < 0 {
                    onnx::tensor_shape_proto::dimension::Value::DimParam(format!("{name}_{i}"))
                } else {
                    onnx::tensor_shape_proto::dimension::Value::DimValue(d)
                }),
            })
            .collect();
        Ok(onnx::ValueInfoProto {
            name: Some(name.to_string()),
            r#type: Some(onnx::TypeProto {
                value: Some(onnx::type_proto::Value::TensorType(
                    onnx::type_proto::Tensor {
                        elem_type: Some(onnx_dtype(info.dtype) as i32),
                        shape: Some(onnx::TensorShapeProto { dim }),
                    },
                )),
            }),
            doc_string: None,
        })
    }

    pub fn into_graph(
        self,
        name: &str,
        inputs: &IoBinding,
        outputs: &IoBinding,
    ) -> Result<onnx::GraphProto, GraphError> {
        let input = inputs
            .names()
            .map(|n| self.value_info(n))
            .collect::<Result<Vec<_>, _>>()?;
        let output = outputs
            .names()
            .map(|n| self.value_info(n))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(onnx::GraphProto {
            node: self.nodes,
            name: Some(name.to_string()),
            initializer: self.initializers,
            input,
            output,
            ..Default::default()
        })
    }
}
