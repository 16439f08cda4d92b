use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

pub type AppResult<T> = Result<T, AppError>;

pub const CONVERSION_FAILED_MESSAGE: &str = "File conversion failed. Please try again.";
pub const MERGE_FAILED_MESSAGE: &str = "Merge failed. Please try again.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Conversion failed: {message}")]
    Conversion { message: String },

    #[error("Merge failed: {message}")]
    Merge { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "VALIDATION_ERROR",
            AppError::Conversion { .. } => "CONVERSION_ERROR",
            AppError::Merge { .. } => "MERGE_ERROR",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Conversion { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Merge { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a client. Only validation errors carry their own
    /// text; everything else is replaced so paths and tool output stay internal.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation { message } => message.clone(),
            AppError::Conversion { .. } => CONVERSION_FAILED_MESSAGE.to_string(),
            AppError::Merge { .. } | AppError::Internal { .. } => MERGE_FAILED_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(
                error_code = error_code,
                status_code = %status,
                error_message = %self,
                "Request failed"
            );
        } else {
            tracing::warn!(
                error_code = error_code,
                status_code = %status,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = Json(ErrorResponse {
            error: self.public_message(),
        });

        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
        }
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        AppError::Conversion {
            message: message.into(),
        }
    }

    pub fn merge(message: impl Into<String>) -> Self {
        AppError::Merge {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }

    pub fn no_files() -> Self {
        Self::validation("Please upload at least one file.")
    }

    pub fn too_many_files(max_files: usize) -> Self {
        Self::validation(format!("You can upload up to {} files.", max_files))
    }

    pub fn unsupported_file_type() -> Self {
        Self::validation(
            "Unsupported file type. Allowed: PDF, PNG, JPG, JPEG, TIF, TIFF, GIF, TXT.",
        )
    }
}

/// Failure of a single external tool invocation.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    #[error("`{program}` exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("I/O error while running `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    pub fn program(&self) -> &str {
        match self {
            CommandError::Spawn { program, .. }
            | CommandError::Timeout { program, .. }
            | CommandError::Failed { program, .. }
            | CommandError::Io { program, .. } => program,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, CommandError::Timeout { .. })
    }
}
