use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{StagedUpload, UploadedFile};
use crate::services::Workspace;

/// Validates staged uploads and moves the accepted ones into a workspace.
#[derive(Debug, Clone, Copy)]
pub struct UploadIntake {
    max_files: usize,
}

impl UploadIntake {
    pub fn new(max_files: usize) -> Self {
        Self { max_files }
    }

    /// Reject the part that would push a request over the limit, before it
    /// is written anywhere.
    pub fn check_capacity(&self, already_staged: usize) -> AppResult<()> {
        if already_staged >= self.max_files {
            warn!(max_files = self.max_files, "Upload exceeds file limit");
            return Err(AppError::too_many_files(self.max_files));
        }
        Ok(())
    }

    /// Every file is checked before any is moved, so a rejected batch leaves
    /// nothing in the workspace and its staged files are deleted on drop.
    pub fn accept(&self, staged: Vec<StagedUpload>, workspace: &Workspace) -> AppResult<Vec<UploadedFile>> {
        if staged.is_empty() {
            return Err(AppError::no_files());
        }
        if staged.len() > self.max_files {
            return Err(AppError::too_many_files(self.max_files));
        }

        let mut detected = Vec::with_capacity(staged.len());
        for upload in &staged {
            match upload.detect() {
                Some(found) => detected.push(found),
                None => {
                    warn!(file_name = %upload.original_name, "Unsupported file type");
                    return Err(AppError::unsupported_file_type());
                }
            }
        }

        let mut accepted = Vec::with_capacity(staged.len());
        // on-disk names stay short whatever the client sent; the original
        // name only lives on in `UploadedFile`
        for (index, (upload, (kind, extension))) in staged.into_iter().zip(detected).enumerate() {
            let target = workspace.join(format!("{:02}.{}", index, extension));
            let StagedUpload {
                original_name,
                size,
                file,
            } = upload;

            file.persist(&target).map_err(|e| {
                AppError::internal(format!("Failed to move upload into workspace: {}", e.error))
            })?;

            debug!(
                file_name = %original_name,
                kind = kind.as_str(),
                size = size,
                target = %target.display(),
                "Upload relocated"
            );

            accepted.push(UploadedFile {
                original_name,
                kind,
                path: target,
                size,
            });
        }

        info!(file_count = accepted.len(), "Uploads accepted");
        Ok(accepted)
    }
}
