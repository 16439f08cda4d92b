use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::fs::File;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{MergeRequest, StagedUpload};
use crate::services::{
    BlankPageSynthesizer, CommandRunner, FormatNormalizer, MergeOrchestrator, UploadIntake,
    Workspace,
};

/// Merged document ready to send back.
///
/// `pdf` is an open handle to a file whose workspace is already removed;
/// reading it is the only way left to reach the bytes.
#[derive(Debug)]
pub struct MergeOutcome {
    pub pdf: File,
    pub size: u64,
    pub input_count: usize,
    pub separator_count: usize,
    pub processing_time_ms: u64,
}

/// Runs one merge request end to end inside its own workspace.
#[derive(Clone)]
pub struct MergePipeline {
    temp_root: PathBuf,
    intake: UploadIntake,
    normalizer: FormatNormalizer,
    blank_pages: BlankPageSynthesizer,
    orchestrator: MergeOrchestrator,
}

impl MergePipeline {
    pub fn new(config: &Config, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            temp_root: config.temp_root.clone(),
            intake: UploadIntake::new(config.max_files),
            normalizer: FormatNormalizer::new(runner.clone()),
            blank_pages: BlankPageSynthesizer::new(runner.clone()),
            orchestrator: MergeOrchestrator::new(runner),
        }
    }

    pub fn intake(&self) -> &UploadIntake {
        &self.intake
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    /// Validate, normalize, optionally separate, merge, and open the result.
    /// The workspace is gone by the time this returns, whatever the outcome.
    pub async fn run(&self, staged: Vec<StagedUpload>, include_blank: bool) -> AppResult<MergeOutcome> {
        let start = Instant::now();

        // fail fast on cheap client errors before touching the filesystem
        if staged.is_empty() {
            return Err(AppError::no_files());
        }

        let workspace = Workspace::open(&self.temp_root)?;

        let uploaded = self.intake.accept(staged, &workspace)?;
        let normalized = self.normalizer.normalize_all(uploaded).await?;
        let request = MergeRequest::new(normalized, include_blank);

        let separator = if request.wants_separator() {
            let first = &request.files[0].pdf_path;
            Some(self.blank_pages.synthesize(first, workspace.path()).await?)
        } else {
            debug!(
                include_blank = include_blank,
                file_count = request.len(),
                "No separator page needed"
            );
            None
        };

        let artifact = self
            .orchestrator
            .merge(&request, separator.as_deref(), workspace.path())
            .await?;

        let pdf = File::open(&artifact.path)
            .await
            .map_err(|e| AppError::merge(format!("Failed to open merged output: {}", e)))?;
        let size = pdf
            .metadata()
            .await
            .map_err(|e| AppError::merge(format!("Failed to stat merged output: {}", e)))?
            .len();

        // the open handle keeps the artifact readable once its directory is unlinked
        workspace.close().await;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        info!(
            input_count = artifact.input_count,
            separator_count = artifact.separator_count,
            output_bytes = size,
            processing_time_ms = processing_time_ms,
            "Merge pipeline completed"
        );

        Ok(MergeOutcome {
            pdf,
            size,
            input_count: artifact.input_count,
            separator_count: artifact.separator_count,
            processing_time_ms,
        })
    }
}
