//! Guardrail validation: structural, semantic and pre-flight checks that
//! gate an IR before it is lowered and dispatched to a worker.

pub mod dag;
pub mod repair;

use crate::ir::graph::IrGraph;
use crate::ir::{RezonicIR, SUPPORTED_IR_VERSION};
use crate::manifest::{NodeRegistry, SlotLookup, WorkerManifest};
use serde::{Deserialize, Serialize};

pub use repair::{RepairError, RepairOutcome, Repairer, repair_until_valid};

/// Instruction attached to every failed validation for the repair loop.
pub const REMEDIATION: &str = "Autonomous repair required: regenerate the IR so that every listed error is resolved, keep the IR id unchanged, then resubmit it for validation.";

/// More errors than this escalate severity to critical.
const CRITICAL_ERROR_THRESHOLD: usize = 3;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    High,
    Critical,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub severity: Severity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

#[derive(Default)]
struct Diagnostics {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl Diagnostics {
    fn finish(self) -> ValidationResult {
        if self.errors.is_empty() {
            return ValidationResult {
                valid: true,
                errors: self.errors,
                warnings: self.warnings,
                severity: Severity::None,
                remediation: None,
            };
        }
        let severity = if self.errors.len() > CRITICAL_ERROR_THRESHOLD {
            Severity::Critical
        } else {
            Severity::High
        };
        ValidationResult {
            valid: false,
            errors: self.errors,
            warnings: self.warnings,
            severity,
            remediation: Some(REMEDIATION.to_string()),
        }
    }
}

/// Runs every guardrail check and collects the complete diagnosis.
pub fn validate(ir: &RezonicIR, manifest: Option<&WorkerManifest>) -> ValidationResult {
    let mut diag = Diagnostics::default();
    let graph = IrGraph::build(ir);
    let registry = manifest.map(WorkerManifest::registry);

    check_structure(ir, &mut diag);
    check_acyclic(&graph, &mut diag);
    check_slots(ir, &graph, &mut diag);
    if let (Some(manifest), Some(registry)) = (manifest, registry.as_ref()) {
        check_preflight(ir, manifest, registry, &mut diag);
        check_ports(ir, &graph, registry, &mut diag);
    }

    let result = diag.finish();
    tracing::debug!(
        ir = %ir.id,
        valid = result.valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "guardrail validation finished"
    );
    result
}

fn check_structure(ir: &RezonicIR, diag: &mut Diagnostics) {
    if ir.version != SUPPORTED_IR_VERSION {
        diag.errors.push(format!(
            "Version mismatch: IR version '{}' is not supported (expected '{}')",
            ir.version, SUPPORTED_IR_VERSION
        ));
    }
    if ir.nodes.is_empty() {
        diag.errors.push("Structural error: IR contains no executable nodes".to_string());
    }
    for id in ir.duplicate_node_ids() {
        diag.errors.push(format!("Structural error: duplicate node id '{}'", id));
    }
}

fn check_acyclic(graph: &IrGraph, diag: &mut Diagnostics) {
    if let Some((from, to)) = dag::find_back_edge(graph) {
        diag.errors.push(format!(
            "Semantic error: cyclic dependency detected (edge from node '{}' to node '{}' closes a cycle)",
            graph.id_of(from),
            graph.id_of(to)
        ));
    }
}

fn check_slots(ir: &RezonicIR, graph: &IrGraph, diag: &mut Diagnostics) {
    for ((source, target), endpoints) in ir.edges.iter().zip(&graph.endpoints) {
        for (side, parsed) in [("source", &endpoints.0), ("target", &endpoints.1)] {
            match parsed {
                Ok(port) if !graph.is_declared(&port.node_id) => diag.errors.push(format!(
                    "Slot error: {} node '{}' not found (edge '{}' -> '{}')",
                    side, port.node_id, source, target
                )),
                Ok(_) => {}
                Err(e) => {
                    diag.errors.push(format!("Slot error: malformed {} endpoint: {}", side, e))
                }
            }
        }
    }
}

fn check_preflight(
    ir: &RezonicIR,
    manifest: &WorkerManifest,
    registry: &NodeRegistry,
    diag: &mut Diagnostics,
) {
    let free = manifest.free_vram();
    for node in &ir.nodes {
        if !registry.is_available(&node.kind) {
            diag.errors.push(format!(
                "Pre-flight error: node type '{}' (node '{}') is not available on worker '{}'",
                node.kind, node.id, manifest.id
            ));
        }
        if let Some(min_vram) = node.min_vram().filter(|&v| v > free) {
            diag.warnings.push(format!(
                "Node '{}' requests {} GB VRAM but worker '{}' has only {} GB free",
                node.id, min_vram, manifest.id, free
            ));
        }
    }
}

/// Port names the compiler cannot resolve; advisory only.
fn check_ports(ir: &RezonicIR, graph: &IrGraph, registry: &NodeRegistry, diag: &mut Diagnostics) {
    for (_, src, dst) in graph.well_formed_edges() {
        if let Some(node) = ir.node(&src.node_id) {
            if registry.resolve_output_slot(&node.kind, &src.port_name) == SlotLookup::UnknownPort {
                diag.warnings.push(format!(
                    "Output '{}' is not declared by node type '{}'; edge '{}' will be lowered to slot 0",
                    src.port_name, node.kind, src
                ));
            }
        }
        if let Some(node) = ir.node(&dst.node_id) {
            if registry.definition(&node.kind).is_some_and(|def| !def.has_input(&dst.port_name)) {
                diag.warnings.push(format!(
                    "Input '{}' is not declared by node type '{}' (edge target '{}')",
                    dst.port_name, node.kind, dst
                ));
            }
        }
    }
}
