//! Core data models that flow from the folder scan to the HTTP response.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Recognized document formats. The variant order is the scan order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum FileKind {
    #[serde(rename = ".pdf")]
    Pdf,
    #[serde(rename = ".docx")]
    Docx,
    #[serde(rename = ".txt")]
    Txt,
}

impl FileKind {
    /// Matches a path's extension case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Pdf),
            "docx" => Some(FileKind::Docx),
            "txt" => Some(FileKind::Txt),
            _ => None,
        }
    }

    /// Extension with the leading dot, as reported to clients.
    pub fn as_extension(&self) -> &'static str {
        match self {
            FileKind::Pdf => ".pdf",
            FileKind::Docx => ".docx",
            FileKind::Txt => ".txt",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_extension())
    }
}

/// Per-file diagnostic record produced during a folder scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileReport {
    pub path: String,
    pub filename: String,
    pub extension: FileKind,
    /// Character count of the extracted text (before any trimming).
    pub chars: usize,
    pub had_text: bool,
}

/// Output of the folder collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectedText {
    pub combined_text: String,
    pub files: Vec<FileReport>,
}

/// Admissions form fields extracted by the LLM.
///
/// Always holds exactly the keys in [`crate::prompt::FORM_FIELDS`]; unknown
/// values are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExtractionFields(BTreeMap<String, String>);

impl ExtractionFields {
    /// Builds the full field set, calling `value` once per field name.
    pub(crate) fn from_fn(mut value: impl FnMut(&str) -> String) -> Self {
        Self(
            crate::prompt::FORM_FIELDS
                .iter()
                .map(|name| (name.to_string(), value(*name)))
                .collect(),
        )
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Successful folder analysis: the form fields plus scan diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionResult {
    #[serde(flatten)]
    pub fields: ExtractionFields,
    pub files: Vec<FileReport>,
    pub elapsed_seconds: f64,
}

/// Failed folder analysis.
///
/// `files` and `elapsed_seconds` are only present once a scan actually ran.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResult {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileReport>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<f64>,
}

impl ErrorResult {
    /// An input-validation failure with no scan attached.
    pub fn bare(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            files: None,
            elapsed_seconds: None,
        }
    }
}

/// Body of a `/folder-assist` response: exactly one of the two shapes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FolderAssistResponse {
    Extracted(ExtractionResult),
    Failed(ErrorResult),
}

impl FolderAssistResponse {
    pub fn error(&self) -> Option<&str> {
        match self {
            FolderAssistResponse::Extracted(_) => None,
            FolderAssistResponse::Failed(e) => Some(&e.error),
        }
    }

    pub fn files(&self) -> Option<&[FileReport]> {
        match self {
            FolderAssistResponse::Extracted(r) => Some(&r.files),
            FolderAssistResponse::Failed(e) => e.files.as_deref(),
        }
    }

    pub(crate) fn set_elapsed(&mut self, secs: f64) {
        match self {
            FolderAssistResponse::Extracted(r) => r.elapsed_seconds = secs,
            FolderAssistResponse::Failed(e) => e.elapsed_seconds = Some(secs),
        }
    }
}
