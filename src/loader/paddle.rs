use std::collections::HashMap;

use prost::Message;

use super::{LoaderError, ProgramLoader};
use crate::program::{
    AttributeValue, Block, DType, OperatorAttribute, OperatorDescriptor, ProgramModel, TensorRef,
    VarInfo,
};
use crate::proto::paddle as pb;

pub struct PaddleLoader;

impl ProgramLoader for PaddleLoader {
    fn load_bytes(buf: &[u8]) -> Result<ProgramModel, LoaderError> {
        let desc = pb::ProgramDesc::decode(buf)?;
        if desc.blocks.is_empty() {
            return Err(LoaderError::MalformedProgram(
                "program has no blocks".to_string(),
            ));
        }
        let blocks = desc
            .blocks
            .iter()
            .map(convert_block)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProgramModel { blocks })
    }
}

fn convert_block(block: &pb::BlockDesc) -> Result<Block, LoaderError> {
    let ops = block
        .ops
        .iter()
        .map(convert_op)
        .collect::<Result<Vec<_>, _>>()?;
    let mut vars = HashMap::new();
    for var in &block.vars {
        if let Some(info) = convert_var(var) {
            vars.insert(info.name.clone(), info);
        }
    }
    Ok(Block {
        idx: block.idx as usize,
        ops,
        vars,
    })
}

// Non-tensor vars (feed/fetch lists, scopes, readers) carry no element type
// and are dropped from the var table.
fn convert_var(var: &pb::VarDesc) -> Option<VarInfo> {
    let tensor = var
        .r#type
        .lod_tensor
        .as_ref()
        .map(|t| &t.tensor)
        .or(var.r#type.selected_rows.as_ref())?;
    let dtype = pb::var_type::Type::try_from(tensor.data_type)
        .ok()
        .and_then(dtype_from_proto)?;
    Some(VarInfo {
        name: var.name.clone(),
        dtype,
        shape: tensor.dims.clone(),
        persistable: var.persistable.unwrap_or(false),
    })
}

fn dtype_from_proto(t: pb::var_type::Type) -> Option<DType> {
    use pb::var_type::Type;
    match t {
        Type::Bool => Some(DType::Bool),
        Type::Uint8 => Some(DType::U8),
        Type::Int8 => Some(DType::I8),
        Type::Int16 => Some(DType::I16),
        Type::Int32 => Some(DType::I32),
        Type::Int64 => Some(DType::I64),
        Type::Fp16 => Some(DType::F16),
        Type::Fp32 => Some(DType::F32),
        Type::Fp64 => Some(DType::F64),
        _ => None,
    }
}

fn convert_op(op: &pb::OpDesc) -> Result<OperatorDescriptor, LoaderError> {
    let mut attrs = Vec::new();
    for a in &op.attrs {
        if let Some(value) = convert_attr(&op.r#type, a)? {
            attrs.push(OperatorAttribute {
                name: a.name.clone(),
                value,
            });
        }
    }
    Ok(OperatorDescriptor {
        ty: op.r#type.clone(),
        inputs: op.inputs.iter().map(convert_ref).collect(),
        outputs: op.outputs.iter().map(convert_ref).collect(),
        attrs,
    })
}

fn convert_ref(var: &pb::op_desc::Var) -> TensorRef {
    TensorRef {
        parameter: var.parameter.clone(),
        arguments: var.arguments.clone(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WireTag {
    I,
    F,
    S,
    Ints,
    Floats,
    Strings,
    B,
    Bools,
    L,
    Longs,
}

fn populated_tags(a: &pb::op_desc::Attr) -> Vec<WireTag> {
    let mut tags = Vec::new();
    if a.i.is_some() {
        tags.push(WireTag::I);
    }
    if a.f.is_some() {
        tags.push(WireTag::F);
    }
    if a.s.is_some() {
        tags.push(WireTag::S);
    }
    if !a.ints.is_empty() {
        tags.push(WireTag::Ints);
    }
    if !a.floats.is_empty() {
        tags.push(WireTag::Floats);
    }
    if !a.strings.is_empty() {
        tags.push(WireTag::Strings);
    }
    if a.b.is_some() {
        tags.push(WireTag::B);
    }
    if !a.bools.is_empty() {
        tags.push(WireTag::Bools);
    }
    if a.l.is_some() {
        tags.push(WireTag::L);
    }
    if !a.longs.is_empty() {
        tags.push(WireTag::Longs);
    }
    tags
}

// Projects a wire attribute into the closed value union. At most one value
// tag may be populated, and it has to agree with the declared type; zero
// populated tags yields the declared type's default. Int attributes accept
// either the int32 or the int64 wire field, matching permissive legacy
// readers.
fn convert_attr(
    op: &str,
    a: &pb::op_desc::Attr,
) -> Result<Option<AttributeValue>, LoaderError> {
    let malformed = || LoaderError::MalformedAttribute {
        op: op.to_string(),
        name: a.name.clone(),
    };

    let tags = populated_tags(a);
    if tags.len() > 1 {
        return Err(malformed());
    }
    let tag = tags.first().copied();

    let declared = pb::AttrType::try_from(a.r#type).map_err(|_| {
        LoaderError::MalformedProgram(format!(
            "unknown type {} of attr: {} in op: {}",
            a.r#type, a.name, op
        ))
    })?;

    use pb::AttrType as T;
    let value = match declared {
        T::Int | T::Long => match tag {
            Some(WireTag::I) => AttributeValue::Int(i64::from(a.i.unwrap_or(0))),
            Some(WireTag::L) => AttributeValue::Int(a.l.unwrap_or(0)),
            None => AttributeValue::Int(0),
            Some(_) => return Err(malformed()),
        },
        T::Float => match tag {
            Some(WireTag::F) | None => AttributeValue::Float(a.f.unwrap_or(0.0)),
            Some(_) => return Err(malformed()),
        },
        T::String => match tag {
            Some(WireTag::S) | None => AttributeValue::Str(a.s.clone().unwrap_or_default()),
            Some(_) => return Err(malformed()),
        },
        T::Boolean => match tag {
            Some(WireTag::B) | None => AttributeValue::Bool(a.b.unwrap_or(false)),
            Some(_) => return Err(malformed()),
        },
        T::Ints | T::Longs => match tag {
            Some(WireTag::Ints) => {
                AttributeValue::IntList(a.ints.iter().map(|&v| i64::from(v)).collect())
            }
            Some(WireTag::Longs) => AttributeValue::IntList(a.longs.clone()),
            None => AttributeValue::IntList(Vec::new()),
            Some(_) => return Err(malformed()),
        },
        T::Floats => match tag {
            Some(WireTag::Floats) | None => AttributeValue::FloatList(a.floats.clone()),
            Some(_) => return Err(malformed()),
        },
        T::Strings => match tag {
            Some(WireTag::Strings) | None => AttributeValue::StrList(a.strings.clone()),
            Some(_) => return Err(malformed()),
        },
        T::Booleans => match tag {
            Some(WireTag::Bools) | None => AttributeValue::BoolList(a.bools.clone()),
            Some(_) => return Err(malformed()),
        },
        // Control-flow and extended attr types sit outside the closed value
        // union and are not consumed by any mapper.
        T::Block | T::Blocks | T::Var | T::Vars | T::Float64 | T::Float64s | T::Scalar
        | T::Scalars => return Ok(None),
    };
    Ok(Some(value))
}
