//! End-to-end run: resolve → extract → merge → print.
//!
//! The extracted archive is released on every path out of [`Pipeline::run`]:
//! explicitly once merging finishes, and through `Drop` if anything in
//! between fails or the future is dropped.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{AssemblyError, ConfigError, Result};
use crate::merge::Assembler;
use crate::model::{MergeReport, ResolvedOrder};
use crate::resolver::OrderResolver;

/// What to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A human-facing order number, resolved through search and expand.
    OrderNumber(String),
    /// A known supply id, resolved with a single bundle call.
    SupplyId(i64),
}

impl Target {
    /// Identifier used to name the output file.
    pub fn reference(&self) -> String {
        match self {
            Self::OrderNumber(number) => number.trim().to_string(),
            Self::SupplyId(id) => id.to_string(),
        }
    }
}

/// One pipeline invocation.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub target: Target,
    pub zip_path: PathBuf,
    pub print: bool,
    pub printer: Option<String>,
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub order: ResolvedOrder,
    pub report: MergeReport,
    pub output_path: PathBuf,
    pub file_size: u64,
    /// `None` when printing was not requested.
    pub printed: Option<bool>,
}

/// Wires the resolver and the assembler together.
pub struct Pipeline {
    resolver: OrderResolver,
    assembler: Assembler,
    config: Config,
}

impl Pipeline {
    /// Create a pipeline from its two components.
    pub fn new(resolver: OrderResolver, assembler: Assembler, config: &Config) -> Self {
        Self {
            resolver,
            assembler,
            config: config.clone(),
        }
    }

    /// Create a pipeline talking to the live API and the platform printer.
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Ok(Self::new(
            OrderResolver::from_config(config)?,
            Assembler::for_platform(),
            config,
        ))
    }

    pub fn resolver(&self) -> &OrderResolver {
        &self.resolver
    }

    pub fn assembler(&self) -> &Assembler {
        &self.assembler
    }

    /// Path the merged PDF for `target` is written to.
    pub fn output_path_for(&self, target: &Target) -> PathBuf {
        self.config.output_path_for(&target.reference())
    }

    /// Run the whole pipeline.
    ///
    /// # Errors
    ///
    /// Resolution and assembly failures are returned as they are. A failed
    /// print is not an error; it shows up as `printed: Some(false)`.
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineOutcome> {
        let order = match &request.target {
            Target::OrderNumber(number) => self.resolver.resolve(number.trim()).await?,
            Target::SupplyId(id) => self.resolver.resolve_by_supply_id(*id).await?,
        };

        let output_path = self.output_path_for(&request.target);

        let mut archive = self.assembler.extract(&request.zip_path)?;
        let merged = self.merge(&order, archive.path(), &output_path).await;
        archive.release();
        let report = merged?;

        let file_size = std::fs::metadata(&output_path)?.len();

        let printed = if request.print {
            Some(self.print(&output_path, request.printer.as_deref()).await)
        } else {
            None
        };

        info!(
            reference = %request.target.reference(),
            pages = report.total_pages,
            output = %output_path.display(),
            "run complete"
        );

        Ok(PipelineOutcome {
            order,
            report,
            output_path,
            file_size,
            printed,
        })
    }

    async fn merge(
        &self,
        order: &ResolvedOrder,
        dir: &Path,
        output_path: &Path,
    ) -> std::result::Result<MergeReport, AssemblyError> {
        let assembler = self.assembler.clone();
        let items = order.items.clone();
        let dir = dir.to_path_buf();
        let output_path = output_path.to_path_buf();

        tokio::task::spawn_blocking(move || assembler.merge(&items, &dir, &output_path))
            .await
            .map_err(|err| AssemblyError::Task(err.to_string()))?
    }

    async fn print(&self, path: &Path, requested: Option<&str>) -> bool {
        let printer = self.config.printer_for(requested).map(str::to_string);

        let assembler = self.assembler.clone();
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || assembler.print(&path, printer.as_deref()))
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "print task failed");
                false
            })
    }
}
