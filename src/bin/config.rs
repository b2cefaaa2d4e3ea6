//! Page Validator Config CLI
//!
//! View and manage validation engine configuration.

use clap::{Parser, Subcommand};
use page_schema_validator::{ValidationEngine, ValidatorConfig};

#[derive(Parser)]
#[command(name = "page-validator-config")]
#[command(about = "View and manage page validator configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "page-validator.toml")]
        output: String,
    },

    /// Validate configuration and the registries it points at
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = ValidatorConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Page Validator Configuration\n");
                println!("Cache:");
                println!("  Capacity: {}", cfg.cache.capacity);

                println!("\nSuggestions:");
                println!("  Threshold: {}", cfg.suggestions.threshold);
                println!("  Max suggestions: {}", cfg.suggestions.max_suggestions);

                println!("\nRegistry:");
                println!("  Components: {}", describe_source(cfg.registry.components.as_deref()));
                println!("  Slots: {}", describe_source(cfg.registry.slots.as_deref()));

                println!("\nLogging:");
                println!("  Filter: {}", cfg.logging.filter);
            }
        }

        Commands::Init { output } => {
            let cfg = ValidatorConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => {
            let cfg = match ValidatorConfig::load_from(config.as_deref()) {
                Ok(cfg) => cfg,
                Err(e) => {
                    eprintln!("❌ Configuration error: {}", e);
                    std::process::exit(1);
                }
            };

            match ValidationEngine::from_config(&cfg) {
                Ok(engine) => {
                    println!("✅ Configuration is valid");
                    println!("   Components: {}", engine.registry().len());
                    println!("   Slot tables: {}", engine.slot_registry().len());
                    println!("   Cache capacity: {}", engine.cache_capacity());
                }
                Err(e) => {
                    eprintln!("❌ Registry error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

fn describe_source(path: Option<&std::path::Path>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "(built-in)".to_string(),
    }
}
