//! Lowering of a Rezonic IR into worker bytecode.
//!
//! The compiler is deliberately permissive: it never re-runs the guardrail
//! and drops edges it cannot lower, so it also works as a diagnostic tool
//! on half-edited graphs. Only an unsupported IR version is refused.

pub mod bytecode;
pub mod passes;

use crate::ir::graph::IrGraph;
use crate::ir::{CompilerFlags, RezonicIR, RezonicNode, SUPPORTED_IR_VERSION, major_minor};
use crate::manifest::{NodeRegistry, WorkerManifest};
use thiserror::Error;

pub use bytecode::{BytecodeMap, BytecodeNode, CompileReport, InputValue};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("unsupported IR version '{found}' (compiler supports {supported})")]
    UnsupportedVersion { found: String, supported: String },
}

/// Working state threaded through the passes.
pub struct LoweringContext<'a> {
    pub ir: &'a RezonicIR,
    pub registry: Option<NodeRegistry<'a>>,
    pub flags: CompilerFlags,
    pub graph: IrGraph,
    /// Nodes still alive, in IR order.
    pub nodes: Vec<&'a RezonicNode>,
    pub bytecode: BytecodeMap,
    pub report: CompileReport,
}

impl<'a> LoweringContext<'a> {
    pub fn new(ir: &'a RezonicIR, manifest: Option<&'a WorkerManifest>) -> Self {
        Self {
            ir,
            registry: manifest.map(WorkerManifest::registry),
            flags: ir.compiler_flags(),
            graph: IrGraph::build(ir),
            nodes: ir.nodes.iter().collect(),
            bytecode: BytecodeMap::new(),
            report: CompileReport::default(),
        }
    }
}

pub trait Pass: Send + Sync {
    fn name(&self) -> &str;
    fn run(&self, ctx: &mut LoweringContext<'_>);
}

pub struct Compiler {
    passes: Vec<Box<dyn Pass>>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
            .with_pass(passes::DeadCodeElimination)
            .with_pass(passes::NodeInstantiation)
            .with_pass(passes::EdgeLowering)
            .with_pass(passes::CfgCompletion)
    }
}

impl Compiler {
    /// An empty pipeline; `Compiler::default()` carries the standard passes.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn with_pass<P: Pass + 'static>(mut self, pass: P) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    pub fn compile_with_report(
        &self,
        ir: &RezonicIR,
        manifest: Option<&WorkerManifest>,
    ) -> Result<(BytecodeMap, CompileReport), CompileError> {
        check_version(&ir.version)?;

        let mut ctx = LoweringContext::new(ir, manifest);
        for pass in &self.passes {
            tracing::debug!(ir = %ir.id, pass = pass.name(), "running pass");
            pass.run(&mut ctx);
        }
        tracing::info!(
            ir = %ir.id,
            nodes = ctx.bytecode.len(),
            skipped_edges = ctx.report.skipped_edges.len(),
            "IR lowered to bytecode"
        );
        Ok((ctx.bytecode, ctx.report))
    }
}

fn check_version(version: &str) -> Result<(), CompileError> {
    match (major_minor(version), major_minor(SUPPORTED_IR_VERSION)) {
        (Some(found), Some(supported)) if found == supported => Ok(()),
        _ => Err(CompileError::UnsupportedVersion {
            found: version.to_string(),
            supported: SUPPORTED_IR_VERSION.to_string(),
        }),
    }
}

pub fn compile(ir: &RezonicIR, manifest: Option<&WorkerManifest>) -> Result<BytecodeMap, CompileError> {
    compile_with_report(ir, manifest).map(|(bytecode, _)| bytecode)
}

pub fn compile_with_report(
    ir: &RezonicIR,
    manifest: Option<&WorkerManifest>,
) -> Result<(BytecodeMap, CompileReport), CompileError> {
    Compiler::default().compile_with_report(ir, manifest)
}
