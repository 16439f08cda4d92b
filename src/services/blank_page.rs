use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{PageGeometry, PageSize};
use crate::services::CommandRunner;

pub const PDFINFO: &str = "pdfinfo";
pub const GHOSTSCRIPT: &str = "gs";

const BLANK_FILE_NAME: &str = "blank.pdf";

static PAGE_SIZE_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^Page size:\s+([\d.]+)\s+x\s+([\d.]+)\s+pts").expect("page size pattern is valid")
});

/// Parse `pdfinfo` output into a first-page size in whole points.
pub fn parse_page_size(pdfinfo_output: &str) -> Option<PageSize> {
    let line = pdfinfo_output
        .lines()
        .find(|line| line.starts_with("Page size:"))?;
    let captures = PAGE_SIZE_LINE.captures(line)?;
    let width: f64 = captures.get(1)?.as_str().parse().ok()?;
    let height: f64 = captures.get(2)?.as_str().parse().ok()?;

    let (width, height) = (width.round(), height.round());
    if !(width >= 1.0 && height >= 1.0) || width > u32::MAX as f64 || height > u32::MAX as f64 {
        return None;
    }
    Some(PageSize {
        width: width as u32,
        height: height as u32,
    })
}

/// Produces the separator page used between merged documents.
#[derive(Clone)]
pub struct BlankPageSynthesizer {
    runner: Arc<dyn CommandRunner>,
}

impl BlankPageSynthesizer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Size of the first page of `pdf`. Any failure yields the default size.
    pub async fn inspect(&self, pdf: &Path) -> PageGeometry {
        let args = vec![pdf.as_os_str().to_owned()];
        match self.runner.run(PDFINFO, &args).await {
            Ok(output) => match parse_page_size(&output.stdout) {
                Some(size) => PageGeometry::Detected(size),
                None => {
                    debug!("No usable page size in pdfinfo output");
                    PageGeometry::fallback()
                }
            },
            Err(e) => {
                warn!(error = %e, "Page size inspection failed, using default");
                PageGeometry::fallback()
            }
        }
    }

    /// Write one blank page of `size` into `dir`.
    pub async fn create(&self, dir: &Path, size: PageSize) -> AppResult<PathBuf> {
        let output = dir.join(BLANK_FILE_NAME);
        let args = vec![
            OsString::from("-dBATCH"),
            OsString::from("-dNOPAUSE"),
            OsString::from("-dSAFER"),
            OsString::from("-dQUIET"),
            OsString::from("-sDEVICE=pdfwrite"),
            OsString::from(format!("-dDEVICEWIDTHPOINTS={}", size.width)),
            OsString::from(format!("-dDEVICEHEIGHTPOINTS={}", size.height)),
            OsString::from("-dFIXEDMEDIA"),
            OsString::from("-o"),
            output.as_os_str().to_owned(),
            OsString::from("-c"),
            OsString::from("showpage"),
        ];

        self.runner.run(GHOSTSCRIPT, &args).await.map_err(|e| {
            error!(error = %e, "Blank page synthesis failed");
            AppError::conversion(e.to_string())
        })?;

        Ok(output)
    }

    /// Inspect `first_pdf` and create a matching blank page in `dir`.
    pub async fn synthesize(&self, first_pdf: &Path, dir: &Path) -> AppResult<PathBuf> {
        let geometry = self.inspect(first_pdf).await;
        let size = geometry.size();
        let path = self.create(dir, size).await?;

        info!(
            width = size.width,
            height = size.height,
            fallback = geometry.is_fallback(),
            "Blank separator page created"
        );
        Ok(path)
    }
}
