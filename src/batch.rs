//! Sequential batch runner
//!
//! Resolves a request into an ingestion order, then for each source:
//! runs its build step, canonicalizes the resulting raw records through a
//! [`GraphSink`], writes the canonical OWLNETS files and QC report, and
//! runs the configured merge command. The first failing source aborts the
//! batch.

use crate::adapter::{AdapterError, EdgesNodesAdapter, GraphSink, OwlnetsFilesAdapter, SourceAdapter};
use crate::canon::Canonicalizer;
use crate::config::{ConfigError, PipelineConfig};
use crate::ordering::{
    resolve_order, ContextConfig, DependencyPolicy, OrderError, RegistryEntry, SourceKind, SourceRegistry,
};
use crate::owlnets::{IngestReport, OwlnetsError, OwlnetsPaths};
use chrono::Utc;
use std::collections::HashMap;
use std::process::Command;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Sources that are never handed to the merge command.
const MERGE_EXEMPT: &[&str] = &["UMLS"];

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),

    #[error(transparent)]
    Owlnets(#[from] OwlnetsError),

    #[error("{sab}: `{command}` failed with {status}")]
    StepFailed {
        sab: String,
        command: String,
        status: String,
    },

    #[error("{sab}: cannot run `{command}`: {source}")]
    Spawn {
        sab: String,
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}: command is empty")]
    EmptyCommand(String),
}

pub type BatchResult<T> = Result<T, BatchError>;

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// Reuse existing OWLNETS files instead of running build steps
    pub skip_build: bool,
    pub policy: DependencyPolicy,
}

impl BatchOptions {
    pub fn with_skip_build(mut self, skip: bool) -> Self {
        self.skip_build = skip;
        self
    }

    pub fn with_policy(mut self, policy: DependencyPolicy) -> Self {
        self.policy = policy;
        self
    }
}

/// What one source contributed.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub key: String,
    pub sab: String,
    pub adapter: String,
    pub edges: usize,
    pub nodes: usize,
    pub relations: usize,
    pub rejections: usize,
    pub elapsed: chrono::Duration,
}

pub struct BatchRunner {
    config: PipelineConfig,
    canonicalizer: Canonicalizer,
    registry: SourceRegistry,
    contexts: ContextConfig,
    options: BatchOptions,
    adapters: HashMap<String, Box<dyn SourceAdapter>>,
}

impl BatchRunner {
    /// Load registry, contexts, prefixes and rules named by `config`.
    pub fn from_config(config: PipelineConfig, options: BatchOptions) -> BatchResult<Self> {
        let canonicalizer = config.canonicalizer()?;
        let registry = config.source_registry()?;
        let contexts = config.context_config()?;
        Ok(Self::new(config, canonicalizer, registry, contexts, options))
    }

    pub fn new(
        config: PipelineConfig,
        canonicalizer: Canonicalizer,
        registry: SourceRegistry,
        contexts: ContextConfig,
        options: BatchOptions,
    ) -> Self {
        Self {
            config,
            canonicalizer,
            registry,
            contexts,
            options,
            adapters: HashMap::new(),
        }
    }

    /// Use `adapter` for registry key `key` instead of the entry's build step.
    pub fn with_adapter(mut self, key: &str, adapter: Box<dyn SourceAdapter>) -> Self {
        self.adapters.insert(key.to_uppercase(), adapter);
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    pub fn contexts(&self) -> &ContextConfig {
        &self.contexts
    }

    pub fn resolve<S: AsRef<str>>(&self, requested: &[S]) -> BatchResult<Vec<String>> {
        Ok(resolve_order(requested, &self.contexts, &self.registry, self.options.policy)?)
    }

    /// Resolve and ingest `requested`, stopping at the first failure.
    pub fn run<S: AsRef<str>>(&self, requested: &[S]) -> BatchResult<Vec<SourceOutcome>> {
        let order = self.resolve(requested)?;
        info!(sources = ?order, skip_build = self.options.skip_build, "starting batch");
        let started = Utc::now();

        let mut outcomes = Vec::with_capacity(order.len());
        for key in &order {
            outcomes.push(self.run_source(key)?);
        }

        info!(
            sources = outcomes.len(),
            elapsed = %format_elapsed(Utc::now() - started),
            "batch complete"
        );
        Ok(outcomes)
    }

    fn run_source(&self, key: &str) -> BatchResult<SourceOutcome> {
        let entry = self
            .registry
            .get(key)
            .ok_or_else(|| OrderError::UnknownSources(vec![key.to_string()]))?;
        let sab = self.registry.sab_for(key);
        let paths = OwlnetsPaths::new(&self.config.owlnets_dir, &sab);
        let vars = self.placeholders(&sab, entry, &paths);
        let started = Utc::now();
        info!(key, sab = %sab, "ingesting source");

        let files = OwlnetsFilesAdapter::new(paths.clone());
        let adapter: &dyn SourceAdapter = match (self.adapters.get(key), entry.kind()) {
            (Some(custom), _) => &**custom,
            (None, SourceKind::Execute(cmd)) => {
                let mut argv = cmd.render(&vars);
                if self.options.skip_build {
                    argv.push("-s".to_string());
                }
                run_command(&sab, argv)?;
                &files
            }
            (None, SourceKind::EdgesNodes(dir)) => {
                return self.ingest(key, &sab, &paths, &EdgesNodesAdapter::new(dir), &vars, started);
            }
            (None, SourceKind::Owl(url)) => {
                if self.options.skip_build {
                    debug!(sab = %sab, "skipping OWL conversion");
                } else if let Some(converter) = &self.config.owl_converter {
                    run_command(&sab, converter.render(&vars))?;
                } else {
                    warn!(sab = %sab, owl_url = url, "no owl_converter configured; using existing OWLNETS files");
                }
                &files
            }
            (None, SourceKind::Prebuilt) => &files,
        };
        self.ingest(key, &sab, &paths, adapter, &vars, started)
    }

    fn ingest(
        &self,
        key: &str,
        sab: &str,
        paths: &OwlnetsPaths,
        adapter: &dyn SourceAdapter,
        vars: &HashMap<&str, String>,
        started: chrono::DateTime<Utc>,
    ) -> BatchResult<SourceOutcome> {
        let mut sink = GraphSink::new(&self.canonicalizer, sab);
        let emitted = adapter.process(&mut sink)?;
        debug!(
            sab,
            edges = emitted.edges_committed,
            nodes = emitted.nodes_committed,
            rejected = emitted.rejections.len(),
            "adapter finished"
        );
        let output = sink.finish();

        output.graph.write(paths)?;
        let report = IngestReport::from_graph(&output.graph)
            .with_fidelity(output.fidelity.iter().map(|(f, n)| (*f, *n)))
            .with_rejections(output.rejections.iter().map(ToString::to_string).collect());
        report.write(&paths.report)?;

        for finding in output.graph.validate() {
            debug!(sab, finding = %finding, "graph finding");
        }

        if let Some(merge) = &self.config.merge_command {
            if MERGE_EXEMPT.contains(&sab) {
                debug!(sab, "source is exempt from the merge step");
            } else {
                run_command(sab, merge.render(vars))?;
            }
        }

        let elapsed = Utc::now() - started;
        info!(sab, elapsed = %format_elapsed(elapsed), "source complete");
        Ok(SourceOutcome {
            key: key.to_string(),
            sab: sab.to_string(),
            adapter: adapter.id().to_string(),
            edges: output.graph.edges().len(),
            nodes: output.graph.nodes().len(),
            relations: output.graph.relations().len(),
            rejections: output.rejections.len(),
            elapsed,
        })
    }

    /// Values for `{name}` placeholders in build, converter and merge steps.
    fn placeholders(&self, sab: &str, entry: &RegistryEntry, paths: &OwlnetsPaths) -> HashMap<&'static str, String> {
        HashMap::from([
            ("sab", sab.to_string()),
            ("owl_url", entry.owl_url.clone().unwrap_or_default()),
            ("owl_file", entry.owl_file_name().unwrap_or_default().to_string()),
            ("owl_dir", self.config.owl_dir.display().to_string()),
            ("owlnets_dir", self.config.owlnets_dir.display().to_string()),
            ("sab_dir", paths.dir.display().to_string()),
        ])
    }
}

/// Run one external step; a spawn failure or nonzero exit is an error.
fn run_command(sab: &str, argv: Vec<String>) -> BatchResult<()> {
    let Some((program, args)) = argv.split_first() else {
        return Err(BatchError::EmptyCommand(sab.to_string()));
    };
    let command = argv.join(" ");
    info!(sab, command = %command, "running step");
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|source| BatchError::Spawn {
            sab: sab.to_string(),
            command: command.clone(),
            source,
        })?;
    if !status.success() {
        return Err(BatchError::StepFailed {
            sab: sab.to_string(),
            command,
            status: status.to_string(),
        });
    }
    Ok(())
}

/// `HH:MM:SS`
pub fn format_elapsed(elapsed: chrono::Duration) -> String {
    let secs = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}
