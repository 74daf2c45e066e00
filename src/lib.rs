//! Rezonic graph IR compiler and guardrail validator.
//!
//! An IR describes a node graph declaratively; [`validate`] proves it is
//! safe to dispatch and [`compile`] lowers it into the flat bytecode map a
//! ComfyUI-style worker queue accepts.

pub mod batch;
pub mod compiler;
pub mod config;
pub mod guardrail;
pub mod ir;
pub mod manifest;

pub use batch::{compile_batch, validate_batch};
pub use compiler::{BytecodeMap, CompileError, compile, compile_with_report};
pub use guardrail::{Severity, ValidationResult, validate};
pub use ir::{RezonicIR, RezonicNode, SUPPORTED_IR_VERSION};
pub use manifest::WorkerManifest;
