use crate::guardrail::{ValidationResult, validate};
use crate::ir::RezonicIR;
use crate::manifest::WorkerManifest;
use thiserror::Error;

/// Source of repaired IRs, typically an AI planning service.
pub trait Repairer {
    fn repair(&mut self, ir: &RezonicIR, result: &ValidationResult) -> anyhow::Result<RezonicIR>;
}

impl<F> Repairer for F
where
    F: FnMut(&RezonicIR, &ValidationResult) -> anyhow::Result<RezonicIR>,
{
    fn repair(&mut self, ir: &RezonicIR, result: &ValidationResult) -> anyhow::Result<RezonicIR> {
        self(ir, result)
    }
}

#[derive(Debug, Clone)]
pub struct RepairOutcome {
    pub ir: RezonicIR,
    pub validation: ValidationResult,
    /// Repairs requested before the IR passed.
    pub repairs: usize,
}

#[derive(Debug, Error)]
pub enum RepairError {
    #[error("IR '{id}' still invalid after {attempts} repair attempt(s)")]
    Exhausted {
        id: String,
        attempts: usize,
        last: Box<ValidationResult>,
    },
    #[error("repaired IR changed id from '{expected}' to '{found}'")]
    IdChanged { expected: String, found: String },
    #[error("repair attempt {attempt} failed")]
    Repairer {
        attempt: usize,
        #[source]
        source: anyhow::Error,
    },
}

/// Validates `ir`, asking `repairer` for a corrected IR up to `max_attempts` times.
pub fn repair_until_valid(
    ir: RezonicIR,
    manifest: Option<&WorkerManifest>,
    repairer: &mut impl Repairer,
    max_attempts: usize,
) -> Result<RepairOutcome, RepairError> {
    let mut current = ir;
    let mut validation = validate(&current, manifest);
    let mut repairs = 0;

    while !validation.valid {
        if repairs == max_attempts {
            return Err(RepairError::Exhausted {
                id: current.id,
                attempts: repairs,
                last: Box::new(validation),
            });
        }
        repairs += 1;
        tracing::info!(ir = %current.id, attempt = repairs, errors = validation.errors.len(), "requesting IR repair");

        let repaired = repairer
            .repair(&current, &validation)
            .map_err(|source| RepairError::Repairer { attempt: repairs, source })?;
        if repaired.id != current.id {
            return Err(RepairError::IdChanged { expected: current.id, found: repaired.id });
        }
        current = repaired;
        validation = validate(&current, manifest);
    }

    Ok(RepairOutcome { ir: current, validation, repairs })
}
