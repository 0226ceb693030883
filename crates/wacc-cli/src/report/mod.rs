//! LaTeX report for a completed WACC run.
//!
//! Rendering consumes the pipeline's result record only; compiling to PDF
//! shells out to an external TeX toolchain and is strictly optional.

pub mod compile;
pub mod latex;

pub use compile::compile_pdf;
pub use latex::{render, ReportOptions};
