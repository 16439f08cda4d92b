use std::path::Path;

use axum::{
    body::Body,
    extract::{
        multipart::{Field, MultipartRejection},
        Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream};
use tempfile::NamedTempFile;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::REQUEST_ID_HEADER;
use crate::models::StagedUpload;

pub const FILES_FIELD: &str = "files";
pub const INCLUDE_BLANK_FIELD: &str = "includeBlank";
pub const DOWNLOAD_FILE_NAME: &str = "merged.pdf";

const UPLOAD_FAILED_MESSAGE: &str = "Upload failed. Please try again.";
const DOWNLOAD_CHUNK_SIZE: usize = 64 * 1024;

pub async fn merge_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    info!(request_id = %request_id, "Starting merge request");

    let mut multipart = multipart.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Request is not a multipart form");
        AppError::validation(UPLOAD_FAILED_MESSAGE)
    })?;

    let intake = state.pipeline.intake();
    let mut staged: Vec<StagedUpload> = Vec::new();
    let mut include_blank = false;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(request_id = %request_id, error = %e, "Failed to read multipart field");
        AppError::validation(UPLOAD_FAILED_MESSAGE)
    })? {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            FILES_FIELD => {
                intake.check_capacity(staged.len())?;
                let upload = stage_field(field, state.pipeline.temp_root()).await?;
                debug!(
                    request_id = %request_id,
                    file_name = %upload.original_name,
                    file_size = upload.size,
                    "File staged"
                );
                staged.push(upload);
            }
            INCLUDE_BLANK_FIELD => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::validation(UPLOAD_FAILED_MESSAGE))?;
                include_blank = value == "true";
            }
            other => {
                debug!(request_id = %request_id, field = other, "Ignoring unknown form field");
            }
        }
    }

    info!(
        request_id = %request_id,
        file_count = staged.len(),
        include_blank = include_blank,
        "Multipart form received"
    );

    let outcome = match state.pipeline.run(staged, include_blank).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Merge request failed");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        output_bytes = outcome.size,
        processing_time_ms = outcome.processing_time_ms,
        "Merge request completed successfully"
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
            (header::CONTENT_LENGTH, outcome.size.to_string()),
        ],
        Body::from_stream(download_stream(outcome.pdf)),
    )
        .into_response())
}

/// Stream one file part to temporary storage chunk by chunk.
async fn stage_field(mut field: Field<'_>, root: &Path) -> AppResult<StagedUpload> {
    let original_name = field.file_name().unwrap_or("").to_string();

    let staged = NamedTempFile::new_in(root)
        .map_err(|e| AppError::internal(format!("Failed to create staging file: {}", e)))?;
    let mut writer = tokio::fs::File::from_std(staged.reopen()?);

    let mut size: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|_| AppError::validation(UPLOAD_FAILED_MESSAGE))?
    {
        writer.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    writer.flush().await?;

    Ok(StagedUpload::new(original_name, size, staged))
}

/// Chunks of the merged file until EOF. A read error ends the stream after
/// it is yielded, which aborts the response.
fn download_stream(file: File) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    stream::unfold(Some(file), |state| async move {
        let Some(mut file) = state else {
            return None;
        };
        let mut buf = BytesMut::with_capacity(DOWNLOAD_CHUNK_SIZE);
        match file.read_buf(&mut buf).await {
            Ok(0) => None,
            Ok(_) => Some((Ok(buf.freeze()), Some(file))),
            Err(e) => {
                warn!(error = %e, "Failed to stream merged output");
                Some((Err(e), None))
            }
        }
    })
}
