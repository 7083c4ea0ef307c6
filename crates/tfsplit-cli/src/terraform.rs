//! Running the Terraform binary.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, info};

use tfsplit::TfsplitError;

/// Terraform executable bound to a module directory.
#[derive(Debug, Clone)]
pub struct Terraform {
    binary: String,
    working_dir: PathBuf,
}

impl Terraform {
    pub fn new(binary: impl Into<String>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.into(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    /// `terraform init`, with a partial backend configuration file if given.
    pub fn init(&self, backend_config: Option<&str>) -> Result<(), TfsplitError> {
        let backend_arg = backend_config.map(|file| format!("-backend-config={file}"));
        let mut args = vec!["init", "-input=false"];
        args.extend(backend_arg.as_deref());
        self.run(&args)?;
        Ok(())
    }

    /// The module's dependency graph as DOT.
    pub fn graph(&self) -> Result<String, TfsplitError> {
        self.run(&["graph", "-type=plan-refresh-only", "-draw-cycles"])
    }

    /// The current state as JSON.
    pub fn show_json(&self) -> Result<String, TfsplitError> {
        self.run(&["show", "-json"])
    }

    fn run(&self, args: &[&str]) -> Result<String, TfsplitError> {
        let command = format!("{} {}", self.binary, args.join(" "));
        info!(command = command.as_str(); "Running terraform");

        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.working_dir)
            .output()
            .map_err(|err| TfsplitError::Terraform(format!("failed to run `{command}`: {err}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TfsplitError::Terraform(format!(
                "`{command}` failed with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        debug!(command = command.as_str(), bytes = output.stdout.len(); "Terraform finished");
        String::from_utf8(output.stdout)
            .map_err(|err| TfsplitError::Terraform(format!("`{command}` printed invalid UTF-8: {err}")))
    }
}
