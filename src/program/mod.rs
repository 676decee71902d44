use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

pub mod attr;
pub mod reader;

pub use attr::AttrValue;

#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("cannot find attribute {name} in op: {op}")]
    AttributeNotFound { op: String, name: String },
    #[error("cannot find {expected} data from attr: {name} in op: {op}")]
    AttributeTypeMismatch {
        op: String,
        name: String,
        expected: AttrKind,
    },
    #[error("invalid slot ordinal {ordinal} in op: {op}, expected 0 <= ordinal < {max}")]
    MalformedSlotOrdinal { op: String, ordinal: i64, max: i64 },
    #[error("missing {param} argument in op: {op}")]
    MissingArgument { op: String, param: String },
    #[error("program has no entry block")]
    MissingEntryBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Bool,
    U8,
    I8,
    I16,
    I32,
    I64,
    F16,
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    Int,
    Float,
    Bool,
    Str,
    IntList,
    FloatList,
    BoolList,
    StrList,
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AttrKind::Int => "int",
            AttrKind::Float => "float",
            AttrKind::Bool => "bool",
            AttrKind::Str => "string",
            AttrKind::IntList => "ints",
            AttrKind::FloatList => "floats",
            AttrKind::BoolList => "bools",
            AttrKind::StrList => "strings",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Int(i64),
    Float(f32),
    Bool(bool),
    Str(String),
    IntList(Vec<i64>),
    FloatList(Vec<f32>),
    BoolList(Vec<bool>),
    StrList(Vec<String>),
}

impl AttributeValue {
    pub fn kind(&self) -> AttrKind {
        match self {
            AttributeValue::Int(_) => AttrKind::Int,
            AttributeValue::Float(_) => AttrKind::Float,
            AttributeValue::Bool(_) => AttrKind::Bool,
            AttributeValue::Str(_) => AttrKind::Str,
            AttributeValue::IntList(_) => AttrKind::IntList,
            AttributeValue::FloatList(_) => AttrKind::FloatList,
            AttributeValue::BoolList(_) => AttrKind::BoolList,
            AttributeValue::StrList(_) => AttrKind::StrList,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OperatorAttribute {
    pub name: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone)]
pub struct TensorRef {
    pub parameter: String,
    pub arguments: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct OperatorDescriptor {
    pub ty: String,
    pub inputs: Vec<TensorRef>,
    pub outputs: Vec<TensorRef>,
    pub attrs: Vec<OperatorAttribute>,
}

impl OperatorDescriptor {
    pub fn input(&self, parameter: &str) -> Option<&TensorRef> {
        self.inputs.iter().find(|t| t.parameter == parameter)
    }

    pub fn output(&self, parameter: &str) -> Option<&TensorRef> {
        self.outputs.iter().find(|t| t.parameter == parameter)
    }

    pub fn input_argument(&self, parameter: &str) -> Result<&str, ProgramError> {
        self.input(parameter)
            .and_then(|t| t.arguments.first())
            .map(String::as_str)
            .ok_or_else(|| ProgramError::MissingArgument {
                op: self.ty.clone(),
                param: parameter.to_string(),
            })
    }

    pub fn output_argument(&self, parameter: &str) -> Result<&str, ProgramError> {
        self.output(parameter)
            .and_then(|t| t.arguments.first())
            .map(String::as_str)
            .ok_or_else(|| ProgramError::MissingArgument {
                op: self.ty.clone(),
                param: parameter.to_string(),
            })
    }

    pub fn first_input_argument(&self) -> Option<&str> {
        self.inputs
            .first()
            .and_then(|t| t.arguments.first())
            .map(String::as_str)
    }

    pub fn first_output_argument(&self) -> Option<&str> {
        self.outputs
            .first()
            .and_then(|t| t.arguments.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct VarInfo {
    pub name: String,
    pub dtype: DType,
    pub shape: Vec<i64>,
    pub persistable: bool,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub idx: usize,
    pub ops: Vec<OperatorDescriptor>,
    pub vars: HashMap<String, VarInfo>,
}

#[derive(Debug, Clone)]
pub struct ProgramModel {
    pub blocks: Vec<Block>,
}

impl ProgramModel {
    pub fn entry_block(&self) -> Option<&Block> {
        self.blocks.first()
    }
}
