use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::{AppError, AppResult, CommandError};
use crate::models::{FileKind, NormalizedFile, UploadedFile};
use crate::services::CommandRunner;

pub const IMG2PDF: &str = "img2pdf";
pub const ENSCRIPT: &str = "enscript";
pub const PS2PDF: &str = "ps2pdf";

/// Turns every accepted upload into a PDF, one at a time and in order.
#[derive(Clone)]
pub struct FormatNormalizer {
    runner: Arc<dyn CommandRunner>,
}

impl FormatNormalizer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// The Nth output always corresponds to the Nth input. Stops at the
    /// first failure.
    pub async fn normalize_all(&self, files: Vec<UploadedFile>) -> AppResult<Vec<NormalizedFile>> {
        let mut normalized = Vec::with_capacity(files.len());
        for file in files {
            normalized.push(self.normalize(file).await?);
        }

        let converted = normalized
            .iter()
            .filter(|f| f.source.kind != FileKind::Pdf)
            .count();
        info!(
            file_count = normalized.len(),
            converted = converted,
            "Inputs normalized"
        );
        Ok(normalized)
    }

    pub async fn normalize(&self, file: UploadedFile) -> AppResult<NormalizedFile> {
        let pdf_path = match file.kind {
            FileKind::Pdf => file.path.clone(),
            FileKind::Image => self.image_to_pdf(&file.path).await?,
            FileKind::Text => self.text_to_pdf(&file.path).await?,
        };

        debug!(
            file_name = %file.original_name,
            kind = file.kind.as_str(),
            pdf = %pdf_path.display(),
            "Input normalized"
        );

        Ok(NormalizedFile {
            source: file,
            pdf_path,
        })
    }

    async fn image_to_pdf(&self, input: &Path) -> AppResult<PathBuf> {
        let output = input.with_extension("pdf");
        let args = vec![
            input.as_os_str().to_owned(),
            OsString::from("-o"),
            output.as_os_str().to_owned(),
        ];
        self.runner
            .run(IMG2PDF, &args)
            .await
            .map_err(conversion_error)?;
        Ok(output)
    }

    async fn text_to_pdf(&self, input: &Path) -> AppResult<PathBuf> {
        let postscript = input.with_extension("ps");
        let output = input.with_extension("pdf");

        let enscript_args = vec![
            OsString::from("-B"),
            OsString::from("-q"),
            OsString::from("-o"),
            postscript.as_os_str().to_owned(),
            input.as_os_str().to_owned(),
        ];
        self.runner
            .run(ENSCRIPT, &enscript_args)
            .await
            .map_err(conversion_error)?;

        let ps2pdf_args = vec![
            postscript.as_os_str().to_owned(),
            output.as_os_str().to_owned(),
        ];
        self.runner
            .run(PS2PDF, &ps2pdf_args)
            .await
            .map_err(conversion_error)?;

        Ok(output)
    }
}

fn conversion_error(err: CommandError) -> AppError {
    error!(program = err.program(), error = %err, "Conversion step failed");
    AppError::conversion(err.to_string())
}
