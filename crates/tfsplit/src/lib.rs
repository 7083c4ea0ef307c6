//! tfsplit - split a Terraform root module into layers.
//!
//! A layer is a named slice of a module anchored at one root declaration.
//! The layer receives the root and everything it transitively depends on
//! that an earlier layer has not already claimed, copied verbatim from the
//! module's source into a directory of its own.

pub mod config;
pub mod export;

mod error;
mod graph;
mod index;
mod partition;
mod state;

pub use tfsplit_core::{
    BlockKey, CanonicalAddress, Kind, LayerClosure, LayerSpec, classify, normalize,
};

pub use error::TfsplitError;
pub use graph::DependencyGraph;
pub use index::{BlockIndex, IndexWarning, SourceSpan};
pub use partition::{Partition, partition};
pub use state::{ImportTarget, StateIndex};

use std::path::{Path, PathBuf};

use log::{info, trace};

use config::AppConfig;
use export::{
    BackendExporter, EmitOutcome, Exporter, ImportExporter, LayerEmitter, VarsExporter,
};

/// Runs the split pipeline for one module.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use tfsplit::{LayerSpec, Splitter, config::{AppConfig, OutputConfig}};
///
/// let config = AppConfig::new(
///     vec![
///         LayerSpec::new("network", "module.network"),
///         LayerSpec::new("app", "aws_instance.web"),
///     ],
///     OutputConfig::default(),
/// );
/// let graph = std::fs::read_to_string("graph.dot").unwrap();
///
/// let report = Splitter::new(config)
///     .split(Path::new("."), &graph, None)
///     .expect("Failed to split");
/// for layer in report.layers() {
///     println!("{}: {} members", layer.name(), layer.closure().members().len());
/// }
/// ```
#[derive(Debug, Default)]
pub struct Splitter {
    config: AppConfig,
}

impl Splitter {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Build the dependency graph from `terraform graph` output.
    ///
    /// # Errors
    ///
    /// Returns [`TfsplitError::Parse`] if the text is not a directed graph.
    pub fn build_graph(&self, graph_text: &str) -> Result<DependencyGraph, TfsplitError> {
        info!("Building dependency graph");
        let graph = DependencyGraph::from_dot(graph_text)
            .map_err(|err| TfsplitError::new_parse_error(err, graph_text, "terraform graph"))?;
        trace!(graph:?; "Dependency graph");
        Ok(graph)
    }

    /// Index the declarations of the module in `module_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`TfsplitError::SourceRead`] or [`TfsplitError::Parse`] for
    /// unreadable or invalid source files.
    pub fn index_module(&self, module_dir: &Path) -> Result<BlockIndex, TfsplitError> {
        info!(module:? = module_dir; "Indexing module");
        BlockIndex::from_module(module_dir)
    }

    /// Assign the graph's nodes to the configured layers without writing
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`TfsplitError::Config`] if the layer configuration is invalid.
    pub fn plan(&self, graph: &DependencyGraph) -> Result<Partition, TfsplitError> {
        self.config.validate()?;
        let partition = partition(graph, self.config.layers());
        info!(layers = partition.len(); "Layers partitioned");
        Ok(partition)
    }

    /// Directory that receives one subdirectory per layer.
    pub fn output_root(&self, module_dir: &Path) -> PathBuf {
        module_dir.join(self.config.output().split_root())
    }

    /// Split the module in `module_dir` into layer directories.
    ///
    /// `state_json` is the output of `terraform show -json`; when given,
    /// each written layer also gets `import` blocks for its instances.
    ///
    /// Layers whose directory already exists are reported as skipped and
    /// left untouched.
    ///
    /// # Errors
    ///
    /// Any invalid input aborts the run: configuration, graph, module
    /// source, value or backend files, or state. A declaration the graph
    /// needs but the module lacks aborts with
    /// [`TfsplitError::MissingSource`]; layers written before it remain.
    /// A layer whose files cannot all be written is removed again, so the
    /// next run retries it rather than skipping it.
    pub fn split(
        &self,
        module_dir: &Path,
        graph_text: &str,
        state_json: Option<&str>,
    ) -> Result<SplitReport, TfsplitError> {
        self.config.validate()?;

        let graph = self.build_graph(graph_text)?;
        let index = self.index_module(module_dir)?;
        let exporters = self.exporters(module_dir, state_json)?;
        let partition = self.plan(&graph)?;

        let emitter = LayerEmitter::new(&index, self.output_root(module_dir))
            .with_terraform_block(self.config.output().include_terraform_block());

        let mut layers = Vec::with_capacity(partition.len());
        for (name, closure) in partition.iter() {
            let mut outcome = emitter.emit(name, closure)?;

            if let EmitOutcome::Written(summary) = &mut outcome {
                export::run_exporters(&exporters, name, closure, summary)?;
            }

            layers.push(LayerReport {
                name: name.to_string(),
                closure: closure.clone(),
                outcome,
            });
        }

        info!(
            written = layers.iter().filter(|l| !l.outcome.is_skipped()).count(),
            skipped = layers.iter().filter(|l| l.outcome.is_skipped()).count();
            "Split finished"
        );
        Ok(SplitReport {
            layers,
            index_warnings: index.warnings().to_vec(),
        })
    }

    fn exporters(
        &self,
        module_dir: &Path,
        state_json: Option<&str>,
    ) -> Result<Vec<Box<dyn Exporter>>, TfsplitError> {
        let output = self.config.output();
        let mut exporters: Vec<Box<dyn Exporter>> = Vec::new();

        if let Some(var_file) = output.var_file() {
            exporters.push(Box::new(VarsExporter::from_file(&module_dir.join(var_file))?));
        }
        if let Some(backend_config) = output.backend_config() {
            exporters.push(Box::new(BackendExporter::from_file(
                &module_dir.join(backend_config),
            )?));
        }
        if let Some(state_json) = state_json {
            exporters.push(Box::new(ImportExporter::new(StateIndex::from_json(state_json)?)));
        }

        Ok(exporters)
    }
}

/// Result of [`Splitter::split`].
#[derive(Debug, Clone)]
pub struct SplitReport {
    layers: Vec<LayerReport>,
    index_warnings: Vec<IndexWarning>,
}

impl SplitReport {
    /// Per-layer results, in layer declaration order.
    pub fn layers(&self) -> &[LayerReport] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&LayerReport> {
        self.layers.iter().find(|layer| layer.name == name)
    }

    /// Declarations skipped while indexing the module.
    pub fn index_warnings(&self) -> &[IndexWarning] {
        &self.index_warnings
    }
}

#[derive(Debug, Clone)]
pub struct LayerReport {
    name: String,
    closure: LayerClosure,
    outcome: EmitOutcome,
}

impl LayerReport {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn closure(&self) -> &LayerClosure {
        &self.closure
    }

    pub fn outcome(&self) -> &EmitOutcome {
        &self.outcome
    }
}
