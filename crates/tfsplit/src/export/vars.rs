//! Per-layer variable values.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::debug;

use tfsplit_core::LayerClosure;
use tfsplit_parser::parse_hcl;

use super::Exporter;
use crate::TfsplitError;

/// Copies the values of a layer's variables out of a `.tfvars` file.
#[derive(Debug, Clone)]
pub struct VarsExporter {
    file_name: String,
    /// (variable name, exact `name = value` text), in file order.
    values: Vec<(String, String)>,
}

impl VarsExporter {
    /// Read and parse the value file at `path`.
    ///
    /// # Errors
    ///
    /// [`TfsplitError::SourceRead`] if the file cannot be read,
    /// [`TfsplitError::Parse`] if it is not valid HCL.
    pub fn from_file(path: &Path) -> Result<Self, TfsplitError> {
        let source = fs::read_to_string(path).map_err(|err| TfsplitError::source_read(path, err))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "terraform.tfvars".to_string());
        Self::from_source(file_name, &source, &path.display().to_string())
    }

    fn from_source(file_name: String, source: &str, origin: &str) -> Result<Self, TfsplitError> {
        let body = parse_hcl(source)
            .map_err(|err| TfsplitError::new_parse_error(err, source, origin))?;

        let values = body
            .attribute_map()
            .into_iter()
            .map(|(name, attribute)| (name.to_string(), source[attribute.span().range()].to_string()))
            .collect();

        Ok(Self { file_name, values })
    }
}

impl Exporter for VarsExporter {
    fn name(&self) -> &'static str {
        "vars"
    }

    fn export_layer(
        &self,
        layer: &str,
        closure: &LayerClosure,
        directory: &Path,
    ) -> Result<Option<PathBuf>, TfsplitError> {
        let mut contents = String::new();
        for (name, text) in &self.values {
            if closure.contains(&format!("var.{name}")) {
                contents.push_str(text);
                contents.push('\n');
            }
        }

        if contents.is_empty() {
            debug!(layer = layer; "No variable values for layer");
            return Ok(None);
        }

        let path = directory.join(&self.file_name);
        fs::write(&path, contents)?;
        Ok(Some(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfsplit_core::CanonicalAddress;

    const VALUES: &str = r#"region = "eu-west-1"
# shared
instance_count = 3
tags = {
  team = "platform"
}
region = "ignored"
"#;

    fn exporter() -> VarsExporter {
        VarsExporter::from_source("prod.tfvars".to_string(), VALUES, "prod.tfvars").unwrap()
    }

    #[test]
    fn test_writes_only_layer_variables() {
        let dir = tempfile::tempdir().unwrap();
        let closure = LayerClosure::new(
            CanonicalAddress::new("module.app"),
            vec![CanonicalAddress::new("var.tags"), CanonicalAddress::new("var.region")],
        );

        let path = exporter()
            .export_layer("app", &closure, dir.path())
            .unwrap()
            .unwrap();

        assert_eq!(path, dir.path().join("prod.tfvars"));
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "region = \"eu-west-1\"\ntags = {\n  team = \"platform\"\n}\n"
        );
    }

    #[test]
    fn test_layer_without_variables_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let closure = LayerClosure::new(CanonicalAddress::new("module.app"), Vec::new());
        assert!(exporter().export_layer("app", &closure, dir.path()).unwrap().is_none());
        assert!(!dir.path().join("prod.tfvars").exists());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = VarsExporter::from_file(&dir.path().join("absent.tfvars")).unwrap_err();
        assert!(matches!(err, TfsplitError::SourceRead { .. }));
    }

    #[test]
    fn test_malformed_file() {
        let err = VarsExporter::from_source("x.tfvars".into(), "region = \n", "x.tfvars").unwrap_err();
        assert!(matches!(err, TfsplitError::Parse { .. }));
    }
}
