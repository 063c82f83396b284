//! Diagram orchestrator - main workflow coordinator.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::registry::AdapterRegistry;
use crate::core::schema::Schema;
use crate::core::traits::SchemaAdapter;
use crate::error::Result;
use crate::publish::{write_diagram, CommitOutcome, GitPublisher};
use crate::render::{DiagramGenerator, MermaidGenerator};
use crate::splice::DocumentSplicer;

/// Diagram orchestrator.
pub struct Orchestrator {
    config: Config,
    registry: AdapterRegistry,
    generator: MermaidGenerator,
}

/// Result of a diagram run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Dialect the schema was read from.
    pub dialect: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,

    pub tables: usize,
    pub columns: usize,
    pub enums: usize,
    pub relationships: usize,
    pub enum_relationships: usize,
    pub indexes: usize,

    /// Nothing was written.
    pub dry_run: bool,

    /// Diagram file path, set once the file has been written.
    pub output_path: Option<PathBuf>,

    /// README that received the diagram, if spliced.
    pub readme_path: Option<PathBuf>,

    /// A git commit was created.
    pub committed: bool,

    /// Non-fatal failures (README splice, git).
    pub warnings: Vec<String>,

    /// Rendered diagram text.
    #[serde(skip)]
    pub diagram: String,
}

impl RunSummary {
    /// Convert to JSON string.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Result of a connectivity probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub dialect: String,
    pub connected: bool,
    pub latency_ms: u64,
    pub error: Option<String>,
}

impl HealthCheckResult {
    pub fn healthy(&self) -> bool {
        self.connected
    }
}

impl Orchestrator {
    /// Create an orchestrator with the built-in adapters.
    pub fn new(config: Config) -> Self {
        Self::with_registry(config, AdapterRegistry::with_builtins())
    }

    /// Create an orchestrator with an explicit adapter registry.
    pub fn with_registry(config: Config, registry: AdapterRegistry) -> Self {
        Self {
            config,
            registry,
            generator: MermaidGenerator::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract, render and publish the diagram.
    ///
    /// Extraction errors abort before anything is written. README and git
    /// failures are recorded as warnings; the diagram file stays written.
    pub async fn run(&self, dry_run: bool) -> Result<RunSummary> {
        let started_at = Utc::now();
        let timer = Instant::now();

        let schema = self.inspect().await?;
        let diagram = self.generator.generate(&schema);

        let mut summary = RunSummary {
            dialect: self.config.database.r#type.to_string(),
            started_at,
            duration_ms: 0,
            tables: schema.tables.len(),
            columns: schema.column_count(),
            enums: schema.enums.len(),
            relationships: schema.relationships.len(),
            enum_relationships: schema.enum_relationships.len(),
            indexes: schema.index_count(),
            dry_run,
            output_path: None,
            readme_path: None,
            committed: false,
            warnings: Vec::new(),
            diagram,
        };

        if dry_run {
            info!("Dry run: rendered {} tables, nothing written", summary.tables);
        } else {
            self.publish(&mut summary).await?;
        }

        summary.duration_ms = timer.elapsed().as_millis() as u64;
        Ok(summary)
    }

    /// Connect, extract the schema model and disconnect.
    ///
    /// Disconnect is always attempted. Its failure is logged and never
    /// replaces an extraction error.
    pub async fn inspect(&self) -> Result<Schema> {
        let mut adapter = self.registry.create(&self.config.database)?;
        info!(
            "Extracting {} schema '{}'",
            adapter.dialect(),
            self.config.database.schema()
        );

        let result = self.extract_with(adapter.as_mut()).await;

        if let Err(e) = adapter.disconnect().await {
            warn!("Failed to disconnect from {}: {}", adapter.dialect(), e);
        }

        result
    }

    /// Test the database connection.
    pub async fn health_check(&self) -> Result<HealthCheckResult> {
        let mut adapter = self.registry.create(&self.config.database)?;
        let timer = Instant::now();
        let connected = adapter.connect().await;
        let latency_ms = timer.elapsed().as_millis() as u64;

        if let Err(e) = adapter.disconnect().await {
            warn!("Failed to disconnect from {}: {}", adapter.dialect(), e);
        }

        Ok(HealthCheckResult {
            dialect: adapter.dialect().to_string(),
            connected: connected.is_ok(),
            latency_ms,
            error: connected.err().map(|e| e.to_string()),
        })
    }

    async fn extract_with(&self, adapter: &mut dyn SchemaAdapter) -> Result<Schema> {
        adapter.connect().await?;
        adapter
            .get_schema(&self.config.excluded_tables(), self.config.output.show_indexes)
            .await
    }

    async fn publish(&self, summary: &mut RunSummary) -> Result<()> {
        let output = &self.config.output;

        write_diagram(&output.diagram_path, &summary.diagram)?;
        info!("Diagram written to {}", output.diagram_path.display());
        summary.output_path = Some(output.diagram_path.clone());

        let mut changed = vec![output.diagram_path.clone()];

        if output.update_readme {
            match DocumentSplicer::from_config(output)
                .update_file(&output.readme_path, &summary.diagram)
            {
                Ok(()) => {
                    info!("Updated {}", output.readme_path.display());
                    summary.readme_path = Some(output.readme_path.clone());
                    changed.push(output.readme_path.clone());
                }
                Err(e) => {
                    warn!("Skipping README update: {}", e);
                    summary.warnings.push(e.to_string());
                }
            }
        }

        if self.config.git.auto_commit {
            match GitPublisher::from_config(&self.config.git)
                .commit(&changed)
                .await
            {
                Ok(CommitOutcome::Committed { pushed }) => {
                    debug!("Commit created (pushed: {})", pushed);
                    summary.committed = true;
                }
                Ok(CommitOutcome::Unchanged) => {}
                Err(e) => {
                    warn!("Skipping git commit: {}", e);
                    summary.warnings.push(e.to_string());
                }
            }
        }

        Ok(())
    }
}
