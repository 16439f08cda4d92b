//! Trusted Merge
//!
//! HTTP service that accepts a batch of PDFs (plus images and plain text),
//! converts them with external tools, optionally interleaves blank separator
//! pages, and returns a single merged PDF.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::{create_router, AppState};
