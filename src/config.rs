//! Command-line configuration, exported from the library so tests can drive it.

use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(
    name = "rezonic",
    about = "Validate Rezonic IR graphs and lower them to worker bytecode",
    after_help = "Log verbosity follows RUST_LOG (default: info)."
)]
pub struct CliArgs {
    /// IR files to validate and lower
    #[arg(required = true, value_name = "IR")]
    pub inputs: Vec<PathBuf>,

    /// Worker manifest used for pre-flight checks and slot resolution
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Write <ir-id>.bytecode.json per IR instead of printing to stdout
    #[arg(long = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Run the guardrail without lowering
    #[arg(long = "validate-only", conflicts_with = "force")]
    pub validate_only: bool,

    /// Lower IRs even when validation fails
    #[arg(long)]
    pub force: bool,

    /// Print the compile report to stderr
    #[arg(long)]
    pub report: bool,
}

/// Parses the full argument vector, `argv[0]` included.
pub fn parse_args<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    CliArgs::try_parse_from(args)
}
