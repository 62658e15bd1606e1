//! Answer extraction: a transformer reader over ONNX Runtime behind the [`Reader`] seam,
//! and the two-stage retrieve-then-read pipeline.

mod pipeline;
mod reader;
pub mod span;

#[cfg(feature = "onnx")]
mod onnx;
#[cfg(feature = "onnx")]
pub use onnx::OnnxReader;

pub use pipeline::{ExtractiveQaPipeline, QaPipeline};
pub use reader::{Reader, ReaderOptions, build_answer};
