use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::models::{interleave_separator, MergeRequest, MergedArtifact};
use crate::services::CommandRunner;

pub const PDFUNITE: &str = "pdfunite";

pub const MERGED_FILE_NAME: &str = "merged.pdf";

#[derive(Clone)]
pub struct MergeOrchestrator {
    runner: Arc<dyn CommandRunner>,
}

impl MergeOrchestrator {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Concatenate the request's PDFs into `dir/merged.pdf`, placing
    /// `separator` between each neighbouring pair when given.
    pub async fn merge(
        &self,
        request: &MergeRequest,
        separator: Option<&Path>,
        dir: &Path,
    ) -> AppResult<MergedArtifact> {
        if request.is_empty() {
            return Err(AppError::no_files());
        }

        let inputs = request.pdf_paths();
        let ordered = interleave_separator(&inputs, separator);
        let output = dir.join(MERGED_FILE_NAME);

        let mut args: Vec<OsString> = ordered.iter().map(|p| p.as_os_str().to_owned()).collect();
        args.push(output.as_os_str().to_owned());

        self.runner.run(PDFUNITE, &args).await.map_err(|e| {
            error!(error = %e, "Merge step failed");
            AppError::merge(e.to_string())
        })?;

        let separator_count = ordered.len() - inputs.len();
        info!(
            input_count = inputs.len(),
            separator_count = separator_count,
            "PDFs merged"
        );

        Ok(MergedArtifact {
            path: output,
            input_count: inputs.len(),
            separator_count,
        })
    }
}
