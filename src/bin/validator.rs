//! Page Validator CLI
//!
//! Validates page schema files against the component and slot registries.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use page_schema_validator::{ComponentNode, ValidationEngine, ValidatorConfig};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "page-validator")]
#[command(about = "Validate generated page schemas")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate component trees (files or directories of .json files)
    Validate {
        /// Schema files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Include per-node traces
        #[arg(long)]
        debug: bool,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
        /// Validate each file this many times (exercises the cache)
        #[arg(long, default_value_t = 1)]
        repeat: usize,
    },

    /// Check named slots in a raw page document
    Slots {
        /// Page document (JSON)
        path: PathBuf,
    },

    /// List registered components
    Registry {
        /// List slot definitions instead of property contracts
        #[arg(long)]
        slots: bool,
    },

    /// Generate a validation report
    Report {
        /// Schema files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Output file (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ValidatorConfig::load_from(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let engine = ValidationEngine::from_config(&config)?;

    match cli.command {
        Commands::Validate { paths, debug, json, repeat } => {
            let files = collect_files(&paths);
            let mut failed = 0;

            for file in &files {
                let tree = read_tree(file)?;
                let mut result = engine.validate(&tree, debug);
                for _ in 1..repeat {
                    result = engine.validate(&tree, debug);
                }

                if json {
                    println!("{}", serde_json::to_string_pretty(&result)?);
                } else if result.valid {
                    println!(
                        "✅ {} - valid ({} nodes, {:.1}µs)",
                        file.display(),
                        result.performance.nodes_checked,
                        result.performance.duration_micros
                    );
                } else {
                    println!("❌ {} - {} error(s)", file.display(), result.errors.len());
                    for error in &result.errors {
                        println!("   └─ {}", error);
                    }
                }

                if !result.valid {
                    failed += 1;
                }
            }

            let stats = engine.performance_stats();
            if !json {
                println!();
                println!("📊 {} file(s), {} invalid", files.len(), failed);
                println!(
                    "   cache: {} entries, {} hits, {} misses | avg {:.1}µs",
                    stats.cache_size,
                    stats.cache_hits,
                    stats.cache_misses,
                    stats.average_validation_micros
                );
            }

            if failed > 0 {
                std::process::exit(1);
            }
            Ok(())
        }

        Commands::Slots { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let document: serde_json::Value = serde_json::from_str(&content)
                .with_context(|| format!("parsing {}", path.display()))?;

            let errors = engine.validate_slots(&document);
            if errors.is_empty() {
                println!("✅ {} - all slots valid", path.display());
                Ok(())
            } else {
                println!("❌ {} - {} slot error(s)", path.display(), errors.len());
                for error in &errors {
                    println!("   └─ {}", error);
                }
                std::process::exit(1);
            }
        }

        Commands::Registry { slots } => {
            if slots {
                println!("🔌 Slot registry ({} components)\n", engine.slot_registry().len());
                for component in engine.slot_registry().iter() {
                    println!("{}", component.component_type);
                    for slot in &component.slots {
                        let marker = if slot.required { "*" } else { " " };
                        println!("  {}{} ({})", marker, slot.name, slot.slot_type);
                    }
                }
            } else {
                println!("📦 Component registry ({} components)\n", engine.registry().len());
                for contract in engine.registry().iter() {
                    println!("{}", contract.component_type);
                    for prop in &contract.properties {
                        let marker = if contract.is_required(&prop.name) { "*" } else { " " };
                        println!("  {}{}: {}", marker, prop.name, prop.value_type);
                    }
                }
            }
            Ok(())
        }

        Commands::Report { paths, output } => {
            let files = collect_files(&paths);
            let mut entries = Vec::with_capacity(files.len());

            for file in &files {
                let tree = read_tree(file)?;
                let result = engine.validate(&tree, false);
                entries.push(serde_json::json!({
                    "file": file.display().to_string(),
                    "valid": result.valid,
                    "nodes_checked": result.performance.nodes_checked,
                    "errors": result.errors,
                }));
            }

            let invalid = entries.iter().filter(|e| e["valid"] == false).count();
            let report = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "files": files.len(),
                "invalid": invalid,
                "stats": engine.performance_stats(),
                "results": entries,
            });

            let report_json = serde_json::to_string_pretty(&report)?;

            if let Some(path) = output {
                std::fs::write(&path, &report_json)?;
                println!("✅ Report written to {:?}", path);
            } else {
                println!("{}", report_json);
            }
            Ok(())
        }
    }
}

/// Expand directories into the .json files beneath them
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<_> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().map(|x| x == "json").unwrap_or(false))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}

fn read_tree(path: &Path) -> anyhow::Result<ComponentNode> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
