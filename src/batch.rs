use crate::compiler::{BytecodeMap, CompileError, compile};
use crate::guardrail::{ValidationResult, validate};
use crate::ir::RezonicIR;
use crate::manifest::WorkerManifest;
use rayon::prelude::*;

/// Validates many IRs in parallel; results keep input order.
pub fn validate_batch(irs: &[RezonicIR], manifest: Option<&WorkerManifest>) -> Vec<ValidationResult> {
    irs.par_iter().map(|ir| validate(ir, manifest)).collect()
}

pub fn compile_batch(
    irs: &[RezonicIR],
    manifest: Option<&WorkerManifest>,
) -> Vec<Result<BytecodeMap, CompileError>> {
    irs.par_iter().map(|ir| compile(ir, manifest)).collect()
}
