use std::path::{Path, PathBuf};

use super::UploadedFile;

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: u32,
    pub height: u32,
}

impl PageSize {
    /// US Letter.
    pub const DEFAULT: PageSize = PageSize {
        width: 612,
        height: 792,
    };
}

/// Outcome of inspecting the first page of a document. Both variants are
/// usable; `Fallback` records that inspection did not produce a size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageGeometry {
    Detected(PageSize),
    Fallback(PageSize),
}

impl PageGeometry {
    pub fn fallback() -> Self {
        PageGeometry::Fallback(PageSize::DEFAULT)
    }

    pub fn size(&self) -> PageSize {
        match self {
            PageGeometry::Detected(size) | PageGeometry::Fallback(size) => *size,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, PageGeometry::Fallback(_))
    }
}

/// A normalized input: the uploaded file plus the PDF that stands in for it.
#[derive(Debug, Clone)]
pub struct NormalizedFile {
    pub source: UploadedFile,
    pub pdf_path: PathBuf,
}

/// Validated, normalized view of one merge call. Every entry is a PDF inside
/// the request workspace, in submission order.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub files: Vec<NormalizedFile>,
    pub include_blank: bool,
}

impl MergeRequest {
    pub fn new(files: Vec<NormalizedFile>, include_blank: bool) -> Self {
        Self {
            files,
            include_blank,
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn pdf_paths(&self) -> Vec<&Path> {
        self.files.iter().map(|f| f.pdf_path.as_path()).collect()
    }

    /// Separators are only meaningful between two or more documents.
    pub fn wants_separator(&self) -> bool {
        self.include_blank && self.files.len() >= 2
    }
}

/// The merged output inside the workspace.
#[derive(Debug, Clone)]
pub struct MergedArtifact {
    pub path: PathBuf,
    pub input_count: usize,
    pub separator_count: usize,
}

/// Build `f0, [blank], f1, [blank], ..., fN-1`. The separator sits strictly
/// between neighbours, never before the first or after the last file.
pub fn interleave_separator<'a>(files: &[&'a Path], separator: Option<&'a Path>) -> Vec<&'a Path> {
    let mut ordered = Vec::with_capacity(files.len() * 2);
    for (index, file) in files.iter().enumerate() {
        if index > 0 {
            if let Some(blank) = separator {
                ordered.push(blank);
            }
        }
        ordered.push(*file);
    }
    ordered
}
