use anyhow::Context;
use rezonic::compiler::{Compiler, bytecode};
use rezonic::config::{CliArgs, parse_args};
use rezonic::{RezonicIR, WorkerManifest, validate_batch};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args(std::env::args_os()).unwrap_or_else(|e| e.exit());

    if !run(&cli)? {
        std::process::exit(1);
    }
    Ok(())
}

/// Returns whether every IR passed the guardrail.
fn run(cli: &CliArgs) -> anyhow::Result<bool> {
    let manifest = cli.manifest.as_deref().map(load_manifest).transpose()?;
    let irs = cli.inputs.iter()
        .map(|p| load_ir(p))
        .collect::<anyhow::Result<Vec<_>>>()?;

    // 1. Guardrail over every IR at once
    let results = validate_batch(&irs, manifest.as_ref());

    if let Some(dir) = &cli.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    // 2. Lowering of the IRs allowed through
    let compiler = Compiler::default();
    let mut all_valid = true;
    for (ir, validation) in irs.iter().zip(&results) {
        println!("{}", serde_json::to_string(&json!({ "ir": ir.id, "validation": validation }))?);
        all_valid &= validation.valid;
        if cli.validate_only || !(validation.valid || cli.force) {
            continue;
        }

        let (code, report) = match compiler.compile_with_report(ir, manifest.as_ref()) {
            Ok(out) => out,
            Err(e) => {
                tracing::error!(ir = %ir.id, error = %e, "lowering refused");
                continue;
            }
        };
        if cli.report {
            eprintln!("{}", serde_json::to_string_pretty(&json!({ "ir": ir.id, "report": report }))?);
        }

        match &cli.out_dir {
            Some(dir) => {
                let path = dir.join(format!("{}.bytecode.json", ir.id.replace(['/', '\\'], "_")));
                fs::write(&path, bytecode::to_json(&code)?)
                    .with_context(|| format!("Failed to write bytecode: {}", path.display()))?;
                tracing::info!(ir = %ir.id, path = %path.display(), "bytecode written");
            }
            None => println!("{}", serde_json::to_string(&json!({ "ir": ir.id, "bytecode": code }))?),
        }
    }
    Ok(all_valid)
}

fn load_manifest(path: &Path) -> anyhow::Result<WorkerManifest> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read worker manifest: {}", path.display()))?;
    WorkerManifest::from_json(&content)
        .with_context(|| format!("Failed to parse worker manifest: {}", path.display()))
}

fn load_ir(path: &Path) -> anyhow::Result<RezonicIR> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read IR file: {}", path.display()))?;
    RezonicIR::from_json(&content)
        .with_context(|| format!("Failed to parse IR: {}", path.display()))
}
