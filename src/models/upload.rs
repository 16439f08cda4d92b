use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// What a submitted file must be turned into before it can be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
    Text,
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "gif"];

/// Lowercased extension of a client file name, if it has one.
pub fn file_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()?
        .to_str()
        .map(str::to_ascii_lowercase)
}

impl FileKind {
    /// `extension` must already be lowercase.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pdf" => Some(FileKind::Pdf),
            "txt" => Some(FileKind::Text),
            ext if IMAGE_EXTENSIONS.contains(&ext) => Some(FileKind::Image),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Image => "image",
            FileKind::Text => "text",
        }
    }
}

/// A multipart part written to temporary storage, not yet validated.
///
/// The backing file is deleted when this value is dropped, so a rejected
/// request cleans up its staged parts just by returning.
#[derive(Debug)]
pub struct StagedUpload {
    pub original_name: String,
    pub size: u64,
    pub file: NamedTempFile,
}

impl StagedUpload {
    pub fn new(original_name: String, size: u64, file: NamedTempFile) -> Self {
        Self {
            original_name,
            size,
            file,
        }
    }

    /// Kind plus the lowercased extension it was detected from.
    pub fn detect(&self) -> Option<(FileKind, String)> {
        let extension = file_extension(&self.original_name)?;
        let kind = FileKind::from_extension(&extension)?;
        Some((kind, extension))
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// An accepted upload relocated into the request workspace.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub original_name: String,
    pub kind: FileKind,
    pub path: PathBuf,
    pub size: u64,
}
