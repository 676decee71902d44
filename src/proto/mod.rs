pub mod onnx;
pub mod paddle;
