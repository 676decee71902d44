// Prost mirror of the subset of Paddle's proto2 framework schema that the
// converter consumes. Field numbers match the upstream schema.

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProgramDesc {
    #[prost(message, repeated, tag = "1")]
    pub blocks: Vec<BlockDesc>,
    #[prost(message, optional, tag = "4")]
    pub version: Option<Version>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Version {
    #[prost(int64, optional, tag = "1")]
    pub version: Option<i64>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockDesc {
    #[prost(int32, required, tag = "1")]
    pub idx: i32,
    #[prost(int32, required, tag = "2")]
    pub parent_idx: i32,
    #[prost(message, repeated, tag = "3")]
    pub vars: Vec<VarDesc>,
    #[prost(message, repeated, tag = "4")]
    pub ops: Vec<OpDesc>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct OpDesc {
    #[prost(message, repeated, tag = "1")]
    pub inputs: Vec<op_desc::Var>,
    #[prost(message, repeated, tag = "2")]
    pub outputs: Vec<op_desc::Var>,
    #[prost(string, required, tag = "3")]
    pub r#type: String,
    #[prost(message, repeated, tag = "4")]
    pub attrs: Vec<op_desc::Attr>,
    #[prost(bool, optional, tag = "5")]
    pub is_target: Option<bool>,
}

pub mod op_desc {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Var {
        #[prost(string, required, tag = "1")]
        pub parameter: String,
        #[prost(string, repeated, tag = "2")]
        pub arguments: Vec<String>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Attr {
        #[prost(string, required, tag = "1")]
        pub name: String,
        #[prost(enumeration = "super::AttrType", required, tag = "2")]
        pub r#type: i32,
        #[prost(int32, optional, tag = "3")]
        pub i: Option<i32>,
        #[prost(float, optional, tag = "4")]
        pub f: Option<f32>,
        #[prost(string, optional, tag = "5")]
        pub s: Option<String>,
        #[prost(int32, repeated, packed = "false", tag = "6")]
        pub ints: Vec<i32>,
        #[prost(float, repeated, packed = "false", tag = "7")]
        pub floats: Vec<f32>,
        #[prost(string, repeated, tag = "8")]
        pub strings: Vec<String>,
        #[prost(bool, optional, tag = "10")]
        pub b: Option<bool>,
        #[prost(bool, repeated, packed = "false", tag = "11")]
        pub bools: Vec<bool>,
        #[prost(int32, optional, tag = "12")]
        pub block_idx: Option<i32>,
        #[prost(int64, optional, tag = "13")]
        pub l: Option<i64>,
        #[prost(int32, repeated, packed = "false", tag = "14")]
        pub blocks_idx: Vec<i32>,
        #[prost(int64, repeated, packed = "false", tag = "15")]
        pub longs: Vec<i64>,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum AttrType {
    Int = 0,
    Float = 1,
    String = 2,
    Ints = 3,
    Floats = 4,
    Strings = 5,
    Boolean = 6,
    Booleans = 7,
    Block = 8,
    Long = 9,
    Blocks = 10,
    Longs = 11,
    Float64s = 12,
    Var = 13,
    Vars = 14,
    Float64 = 15,
    Scalar = 16,
    Scalars = 17,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VarDesc {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(message, required, tag = "2")]
    pub r#type: VarType,
    #[prost(bool, optional, tag = "3")]
    pub persistable: Option<bool>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct VarType {
    #[prost(enumeration = "var_type::Type", required, tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub selected_rows: Option<var_type::TensorDesc>,
    #[prost(message, optional, tag = "3")]
    pub lod_tensor: Option<var_type::LodTensorDesc>,
}

pub mod var_type {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Bool = 0,
        Int16 = 1,
        Int32 = 2,
        Int64 = 3,
        Fp16 = 4,
        Fp32 = 5,
        Fp64 = 6,
        LodTensor = 7,
        SelectedRows = 8,
        FeedMinibatch = 9,
        FetchList = 10,
        StepScopes = 11,
        LodRankTable = 12,
        LodTensorArray = 13,
        PlaceList = 14,
        Reader = 15,
        Raw = 17,
        Tuple = 18,
        SizeT = 19,
        Uint8 = 20,
        Int8 = 21,
        Bf16 = 22,
        Complex64 = 23,
        Complex128 = 24,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct TensorDesc {
        #[prost(enumeration = "Type", required, tag = "1")]
        pub data_type: i32,
        #[prost(int64, repeated, packed = "false", tag = "2")]
        pub dims: Vec<i64>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct LodTensorDesc {
        #[prost(message, required, tag = "1")]
        pub tensor: TensorDesc,
        #[prost(int32, optional, tag = "2")]
        pub lod_level: Option<i32>,
    }
}
