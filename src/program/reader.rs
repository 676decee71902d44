use std::collections::BTreeMap;

use tracing::debug;

use super::{OperatorDescriptor, ProgramError, ProgramModel};

pub const FEED_OP: &str = "feed";
pub const FETCH_OP: &str = "fetch";

// Slot budget of the surrounding deployment format; ordinals outside it are
// rejected before anything is stored.
pub const MAX_IO_SLOTS: i64 = 100;

// Matches the whole suppression family: multiclass_nms, multiclass_nms2,
// matrix_nms.
pub fn is_suppression_op(ty: &str) -> bool {
    ty.contains("nms")
}

fn validate_ordinal(op: &OperatorDescriptor, ordinal: i64) -> Result<(), ProgramError> {
    if !(0..MAX_IO_SLOTS).contains(&ordinal) {
        return Err(ProgramError::MalformedSlotOrdinal {
            op: op.ty.clone(),
            ordinal,
            max: MAX_IO_SLOTS,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IoBinding {
    slots: BTreeMap<i64, String>,
}

impl IoBinding {
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn name_at(&self, ordinal: i64) -> Option<&str> {
        self.slots.get(&ordinal).map(String::as_str)
    }

    // Linear over populated slots in ordinal order, first match wins.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.slots.values().position(|n| n == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.values().map(String::as_str)
    }

    fn record(&mut self, op: &OperatorDescriptor, ordinal: i64, name: String) -> Result<(), ProgramError> {
        validate_ordinal(op, ordinal)?;
        self.slots.insert(ordinal, name);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NmsParams {
    pub background_label: i64,
    pub keep_top_k: i64,
    pub nms_eta: f32,
    pub nms_threshold: f32,
    pub score_threshold: f32,
    pub nms_top_k: i64,
    pub normalized: bool,
}

impl NmsParams {
    fn from_op(op: &OperatorDescriptor) -> Result<Self, ProgramError> {
        Ok(Self {
            background_label: op.attr("background_label")?,
            keep_top_k: op.attr("keep_top_k")?,
            nms_eta: op.attr("nms_eta")?,
            nms_threshold: op.attr("nms_threshold")?,
            score_threshold: op.attr("score_threshold")?,
            nms_top_k: op.attr("nms_top_k")?,
            normalized: op.attr("normalized")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramIo {
    pub inputs: IoBinding,
    pub outputs: IoBinding,
    pub nms: Option<NmsParams>,
}

impl ProgramIo {
    pub fn num_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }
}

pub struct ProgramReader;

impl ProgramReader {
    pub fn read(program: &ProgramModel) -> Result<ProgramIo, ProgramError> {
        let block = program.entry_block().ok_or(ProgramError::MissingEntryBlock)?;

        let mut inputs = IoBinding::default();
        let mut outputs = IoBinding::default();
        let mut nms = None;

        for op in &block.ops {
            if op.ty == FETCH_OP {
                let name = op.first_input_argument().map(str::to_string).ok_or_else(|| {
                    ProgramError::MissingArgument {
                        op: op.ty.clone(),
                        param: "X".to_string(),
                    }
                })?;
                let ordinal = op.attr::<i64>("col")?;
                outputs.record(op, ordinal, name)?;
            } else if op.ty == FEED_OP {
                let name = op.first_output_argument().map(str::to_string).ok_or_else(|| {
                    ProgramError::MissingArgument {
                        op: op.ty.clone(),
                        param: "Out".to_string(),
                    }
                })?;
                let ordinal = op.attr::<i64>("col")?;
                inputs.record(op, ordinal, name)?;
            }

            // The first suppression op freezes the parameters; later ones are
            // never re-read.
            if nms.is_none() && is_suppression_op(&op.ty) {
                nms = Some(NmsParams::from_op(op)?);
                debug!(op = %op.ty, "captured suppression parameters");
            }
        }

        Ok(ProgramIo {
            inputs,
            outputs,
            nms,
        })
    }
}
