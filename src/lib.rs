//! Converts PaddlePaddle inference programs into ONNX models.

pub mod exporter;
pub mod graph;
pub mod loader;
pub mod mapper;
pub mod program;
pub mod proto;

pub use exporter::{ExportError, ExportedModel, Exporter};
pub use loader::{LoaderError, PaddleLoader, ProgramLoader};
pub use program::reader::{IoBinding, NmsParams, ProgramIo, ProgramReader};
pub use program::{ProgramError, ProgramModel};
