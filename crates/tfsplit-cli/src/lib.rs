//! CLI logic for tfsplit.
//!
//! Gathers the inputs (configuration, dependency graph, optional state),
//! hands them to [`Splitter`] and prints one line per layer.

pub mod error_adapter;

mod args;
mod config;
mod terraform;

pub use args::Args;
pub use terraform::Terraform;

use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use log::info;

use tfsplit::{Splitter, TfsplitError, export::EmitOutcome};

/// Run the tfsplit CLI application, printing results to stdout.
///
/// # Errors
///
/// Returns `TfsplitError` for:
/// - Configuration loading errors
/// - Terraform invocation failures
/// - Graph, source, or state parsing errors
/// - File I/O errors
pub fn run(args: &Args) -> Result<(), TfsplitError> {
    run_with_output(args, &mut io::stdout().lock())
}

/// Run the tfsplit CLI application, printing results to `out`.
///
/// # Errors
///
/// See [`run`].
pub fn run_with_output(args: &Args, out: &mut impl Write) -> Result<(), TfsplitError> {
    let module_dir = Path::new(&args.path);
    info!(module = args.path; "Splitting module");

    let app_config = config::load_config(args.config.as_ref(), module_dir)?;
    let splitter = Splitter::new(app_config);
    let terraform = Terraform::new(&args.terraform_bin, module_dir);

    let graph_text = match &args.graph_file {
        Some(path) => read_input(path)?,
        None => {
            terraform.init(splitter.config().output().backend_config())?;
            terraform.graph()?
        }
    };

    if args.print_graph || args.dry_run {
        let graph = splitter.build_graph(&graph_text)?;

        if args.print_graph {
            write!(out, "{}", graph.to_dot())?;
        }

        if args.dry_run {
            let partition = splitter.plan(&graph)?;
            for (name, closure) in partition.iter() {
                writeln!(out, "{name}:")?;
                for address in closure.addresses() {
                    writeln!(out, "  {address}")?;
                }
            }
            return Ok(());
        }
    }

    let state = match &args.state_file {
        Some(path) => Some(read_input(path)?),
        None if args.imports => Some(terraform.show_json()?),
        None => None,
    };

    let report = splitter.split(module_dir, &graph_text, state.as_deref())?;

    for layer in report.layers() {
        match layer.outcome() {
            EmitOutcome::Written(summary) => writeln!(
                out,
                "{}: written, {} files in {}",
                layer.name(),
                summary.files().len(),
                summary.directory().display()
            )?,
            EmitOutcome::Skipped { directory } => writeln!(
                out,
                "{}: skipped, {} already exists",
                layer.name(),
                directory.display()
            )?,
        }
    }

    Ok(())
}

fn read_input(path: &str) -> Result<String, TfsplitError> {
    fs::read_to_string(path).map_err(|err| TfsplitError::source_read(path, err))
}
