//! db-erd CLI - Mermaid ER diagrams from PostgreSQL and MySQL catalogs.

use clap::{Parser, Subcommand};
use db_erd::{Config, ErdError, Orchestrator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Configuration file picked up when `--config` is not given.
const DEFAULT_CONFIG: &str = "db-erd.yaml";

#[derive(Parser)]
#[command(name = "db-erd")]
#[command(about = "Generate Mermaid ER diagrams from PostgreSQL and MySQL schemas")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file [default: db-erd.yaml if present]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the schema and write the diagram
    Generate {
        /// Diagram output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Splice the diagram into this README
        #[arg(long)]
        readme: Option<PathBuf>,

        /// Table to leave out (repeatable)
        #[arg(long = "exclude", value_name = "TABLE")]
        exclude: Vec<String>,

        /// Include secondary indexes
        #[arg(long)]
        show_indexes: bool,

        /// Print the diagram instead of writing files
        #[arg(long)]
        dry_run: bool,

        /// Commit the written files with git
        #[arg(long)]
        commit: bool,
    },

    /// Print the extracted schema model as JSON
    Inspect,

    /// Test the database connection
    HealthCheck,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), ErdError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format).map_err(ErdError::Config)?;

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            output,
            readme,
            exclude,
            show_indexes,
            dry_run,
            commit,
        } => {
            // Apply overrides
            if let Some(path) = output {
                config.output.diagram_path = path;
            }
            if let Some(path) = readme {
                config.output.readme_path = path;
                config.output.update_readme = true;
            }
            config.output.exclude_tables.extend(exclude);
            if show_indexes {
                config.output.show_indexes = true;
            }
            if commit {
                config.git.auto_commit = true;
            }
            config.validate()?;

            let orchestrator = Orchestrator::new(config);
            let summary = orchestrator.run(dry_run).await?;

            if cli.output_json {
                println!("{}", summary.to_json()?);
            } else if dry_run {
                print!("{}", summary.diagram);
            } else {
                eprintln!("\nDiagram generated!");
                if let Some(ref path) = summary.output_path {
                    eprintln!("  Output: {}", path.display());
                }
                eprintln!(
                    "  Tables: {}  Enums: {}  Relationships: {}",
                    summary.tables, summary.enums, summary.relationships
                );
                if let Some(ref path) = summary.readme_path {
                    eprintln!("  README: {}", path.display());
                }
                if summary.committed {
                    eprintln!("  Committed: yes");
                }
                for warning in &summary.warnings {
                    eprintln!("  Warning: {}", warning);
                }
                eprintln!("  Duration: {}ms", summary.duration_ms);
            }
        }

        Commands::Inspect => {
            config.validate()?;
            let schema = Orchestrator::new(config).inspect().await?;
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }

        Commands::HealthCheck => {
            config.validate()?;
            let result = Orchestrator::new(config).health_check().await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("Health Check Results:");
                println!(
                    "  Database ({}): {} ({}ms)",
                    result.dialect,
                    if result.connected { "OK" } else { "FAILED" },
                    result.latency_ms
                );
                if let Some(ref err) = result.error {
                    println!("    Error: {}", err);
                }
            }

            if !result.healthy() {
                return Err(ErdError::connection(
                    result.error.unwrap_or_default(),
                    "health check",
                ));
            }
        }
    }

    Ok(())
}

/// YAML file (if any), then environment overrides.
fn load_config(path: Option<&Path>) -> Result<Config, ErdError> {
    let config = match path {
        Some(path) => {
            if !path.exists() {
                return Err(ErdError::Config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            read_config(path)?
        }
        None if Path::new(DEFAULT_CONFIG).exists() => read_config(Path::new(DEFAULT_CONFIG))?,
        None => Config::default(),
    };

    config.with_env(|key| std::env::var(key).ok())
}

fn read_config(path: &Path) -> Result<Config, ErdError> {
    let content = std::fs::read_to_string(path)?;
    let config = Config::from_yaml_unvalidated(&content)?;
    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => return Err(format!("Unknown verbosity '{}'", other)),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        "json" => subscriber.json().init(),
        "text" => subscriber.init(),
        other => return Err(format!("Unknown log format '{}'", other)),
    }

    Ok(())
}
