use std::fs::File;
use std::io::Write;
use std::path::Path;

use prost::Message;
use thiserror::Error;
use tracing::{debug, info};

use crate::graph::{GraphError, OnnxGraph};
use crate::mapper::{Mapper, MapperRegistry, OpContext};
use crate::program::reader::{IoBinding, NmsParams, ProgramReader, FEED_OP, FETCH_OP};
use crate::program::{ProgramError, ProgramModel};
use crate::proto::onnx;

pub const PRODUCER_NAME: &str = "paddleonnx";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("cannot find mapper for op: {op} (block {block_id}, op {op_id})")]
    UnsupportedOperator {
        op: String,
        block_id: usize,
        op_id: usize,
    },
    #[error("op {op} has no lowering for opset {requested}")]
    UnsupportedOpset { op: String, requested: i64 },
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct Exporter {
    registry: MapperRegistry,
    opset: i64,
}

impl Exporter {
    pub fn new(opset: i64) -> Self {
        Self {
            registry: MapperRegistry::with_builtin(),
            opset,
        }
    }

    pub fn with_registry(registry: MapperRegistry, opset: i64) -> Self {
        Self { registry, opset }
    }

    // Whole-program unit of failure: any error aborts the run and no partial
    // model is returned.
    pub fn export(&self, program: &ProgramModel) -> Result<ExportedModel, ExportError> {
        let io = ProgramReader::read(program)?;
        let block = program.entry_block().ok_or(ProgramError::MissingEntryBlock)?;

        let mut graph = OnnxGraph::new();
        for var in block.vars.values() {
            graph.register_tensor(&var.name, var.dtype, var.shape.clone());
        }

        info!(
            ops = block.ops.len(),
            inputs = io.num_inputs(),
            outputs = io.num_outputs(),
            opset = self.opset,
            "translating entry block"
        );

        for (op_id, op) in block.ops.iter().enumerate() {
            if op.ty == FEED_OP || op.ty == FETCH_OP {
                continue;
            }
            let ctx = OpContext {
                op,
                block_id: block.idx,
                op_id,
            };
            let mapper = self.registry.bind(&ctx)?;
            let outputs = mapper.translate(&ctx, &mut graph, self.opset)?;
            debug!(op = %op.ty, op_id, ?outputs, "lowered op");
        }

        let graph_proto = graph.into_graph("main", &io.inputs, &io.outputs)?;
        let model = onnx::ModelProto {
            ir_version: Some(onnx::Version::IrVersion as i64),
            producer_name: Some(PRODUCER_NAME.to_string()),
            graph: Some(graph_proto),
            opset_import: vec![onnx::OperatorSetIdProto {
                domain: Some(String::new()),
                version: Some(self.opset),
            }],
            ..Default::default()
        };

        Ok(ExportedModel {
            model,
            inputs: io.inputs,
            outputs: io.outputs,
            nms: io.nms,
        })
    }
}

pub struct ExportedModel {
    pub model: onnx::ModelProto,
    pub inputs: IoBinding,
    pub outputs: IoBinding,
    pub nms: Option<NmsParams>,
}

impl ExportedModel {
    pub fn encode(&self) -> Vec<u8> {
        self.model.encode_to_vec()
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let mut file = File::create(path)?;
        file.write_all(&self.encode())?;
        Ok(())
    }
}
