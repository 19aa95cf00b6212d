//! owlnets CLI: ontology ingestion into canonical OWLNETS files.
//!
//! Usage:
//!   owlnets build <config> <sources>... [--skip-build] [--assume-ingested]
//!   owlnets order <config> <sources>...
//!   owlnets canonicalize --sab <SAB> [ids...]
//!   owlnets relation [labels...]
//!   owlnets check <dir> <sab> [--json]

use clap::{Parser, Subcommand};
use owlnets::{
    normalize_relation, BatchOptions, BatchRunner, Canonicalizer, DependencyPolicy, IngestReport, OwlnetsGraph,
    OwlnetsPaths, PipelineConfig,
};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "owlnets",
    version,
    about = "Biomedical ontology ingestion into canonical OWLNETS files"
)]
struct Cli {
    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a context or a list of sources
    Build {
        /// Pipeline configuration file (YAML)
        config: PathBuf,
        /// A context name, or source tokens
        #[arg(required = true)]
        sources: Vec<String>,
        /// Reuse existing OWLNETS files instead of running build steps
        #[arg(long)]
        skip_build: bool,
        /// Allow dependencies outside this batch
        #[arg(long)]
        assume_ingested: bool,
    },
    /// Print the resolved ingestion order without running anything
    Order {
        /// Pipeline configuration file (YAML)
        config: PathBuf,
        #[arg(required = true)]
        sources: Vec<String>,
        #[arg(long)]
        assume_ingested: bool,
    },
    /// Canonicalize identifiers (arguments, or one per line on stdin)
    Canonicalize {
        /// Source SAB the identifiers come from
        #[arg(long, default_value = "UNKNOWN")]
        sab: String,
        /// Pipeline configuration supplying prefixes and extra rules
        #[arg(long)]
        config: Option<PathBuf>,
        /// Show fidelity and the rule that fired
        #[arg(long)]
        explain: bool,
        ids: Vec<String>,
    },
    /// Normalize relation labels (arguments, or one per line on stdin)
    Relation { labels: Vec<String> },
    /// Validate an existing OWLNETS directory and print its report
    Check {
        /// Directory holding the OWLNETS files
        dir: PathBuf,
        sab: String,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn policy(assume_ingested: bool) -> DependencyPolicy {
    if assume_ingested {
        DependencyPolicy::AssumeIngested
    } else {
        DependencyPolicy::Strict
    }
}

fn open_runner(config: &Path, options: BatchOptions) -> Result<BatchRunner, String> {
    let config = PipelineConfig::load(config).map_err(|e| e.to_string())?;
    BatchRunner::from_config(config, options).map_err(|e| e.to_string())
}

/// Arguments if any were given, otherwise non-blank stdin lines.
fn inputs(args: Vec<String>) -> Vec<String> {
    if !args.is_empty() {
        return args;
    }
    std::io::stdin()
        .lock()
        .lines()
        .map_while(Result::ok)
        .filter(|l| !l.trim().is_empty())
        .collect()
}

fn cmd_build(config: &Path, sources: &[String], options: BatchOptions) -> i32 {
    let runner = match open_runner(config, options) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match runner.run(sources) {
        Ok(outcomes) => {
            for o in &outcomes {
                println!(
                    "{}\t{} edges\t{} nodes\t{} rejected\t{}",
                    o.sab,
                    o.edges,
                    o.nodes,
                    o.rejections,
                    owlnets::batch::format_elapsed(o.elapsed)
                );
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_order(config: &Path, sources: &[String], policy: DependencyPolicy) -> i32 {
    let runner = match open_runner(config, BatchOptions::default().with_policy(policy)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    match runner.resolve(sources) {
        Ok(order) => {
            for key in order {
                println!("{}", key);
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn cmd_canonicalize(sab: &str, config: Option<&Path>, explain: bool, ids: Vec<String>) -> i32 {
    let engine = match config {
        Some(path) => match PipelineConfig::load(path).and_then(|c| c.canonicalizer()) {
            Ok(engine) => engine,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        },
        None => Canonicalizer::default(),
    };
    for raw in inputs(ids) {
        let c = engine.canonicalize(&raw, sab);
        if explain {
            println!("{}\t{}\t{}\t{}", raw, c.value, c.fidelity, c.rule.as_deref().unwrap_or("-"));
        } else {
            println!("{}", c.value);
        }
    }
    0
}

fn cmd_relation(labels: Vec<String>) -> i32 {
    for raw in inputs(labels) {
        let label = normalize_relation(&raw);
        println!("{}\t{}", label, label.display_label());
    }
    0
}

fn cmd_check(dir: &Path, sab: &str, json: bool) -> i32 {
    let paths = OwlnetsPaths::in_dir(dir);
    let graph = match OwlnetsGraph::read(&paths, &sab.to_uppercase()) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };
    let report = IngestReport::from_graph(&graph);
    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        }
    } else {
        print!("{}", report.render());
    }

    let findings = graph.validate();
    for finding in &findings {
        eprintln!("{}", finding);
    }
    if findings.is_empty() {
        0
    } else {
        2
    }
}

fn main() {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let code = match cli.command {
        Commands::Build {
            config,
            sources,
            skip_build,
            assume_ingested,
        } => {
            let options = BatchOptions::default()
                .with_skip_build(skip_build)
                .with_policy(policy(assume_ingested));
            cmd_build(&config, &sources, options)
        }
        Commands::Order {
            config,
            sources,
            assume_ingested,
        } => cmd_order(&config, &sources, policy(assume_ingested)),
        Commands::Canonicalize {
            sab,
            config,
            explain,
            ids,
        } => cmd_canonicalize(&sab, config.as_deref(), explain, ids),
        Commands::Relation { labels } => cmd_relation(labels),
        Commands::Check { dir, sab, json } => cmd_check(&dir, &sab, json),
    };
    std::process::exit(code);
}
