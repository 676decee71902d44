use std::path::Path;

use thiserror::Error;

use crate::program::ProgramModel;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse program: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("malformed program: {0}")]
    MalformedProgram(String),
    #[error("malformed attribute {name} in op: {op}")]
    MalformedAttribute { op: String, name: String },
}

pub trait ProgramLoader {
    fn load_bytes(buf: &[u8]) -> Result<ProgramModel, LoaderError>;

    fn load<P: AsRef<Path>>(path: P) -> Result<ProgramModel, LoaderError> {
        let buf = std::fs::read(path)?;
        Self::load_bytes(&buf)
    }
}

pub mod paddle;

pub use paddle::PaddleLoader;
