//! Folder collector: scans one directory for PDF, DOCX and TXT files and
//! concatenates their text behind per-file delimiter lines.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::AssistError;
use crate::extract::extract_or_empty;
use crate::models::{CollectedText, FileKind, FileReport};

/// Delimiter line written before each file's text in the combined output.
pub fn file_delimiter(filename: &str) -> String {
    format!("\n\n===== FILE: {} =====\n", filename)
}

/// Scans `folder` (non-recursively) and extracts every recognized file.
///
/// Files are grouped by kind (PDF, DOCX, TXT) and ordered by name within a
/// group. Hidden files are skipped. A file that fails to extract still gets a
/// report with `had_text = false`.
pub fn collect_text_from_folder(folder: &Path) -> Result<CollectedText, AssistError> {
    if !folder.is_dir() {
        return Err(AssistError::NotFound(folder.to_path_buf()));
    }

    tracing::info!(folder = %folder.display(), "scanning folder");

    let matched = list_candidate_files(folder);
    tracing::info!(
        count = matched.len(),
        files = ?matched.iter().map(|(p, _)| p.display().to_string()).collect::<Vec<_>>(),
        "files found"
    );

    let mut collected = CollectedText::default();

    for (path, kind) in matched {
        let text = extract_or_empty(&path, kind);
        let filename = base_name(&path);
        let had_text = !text.trim().is_empty();

        if had_text {
            collected.combined_text.push_str(&file_delimiter(&filename));
            collected.combined_text.push_str(&text);
        } else {
            tracing::warn!(
                path = %path.display(),
                "no text extracted (maybe an image-only scan)"
            );
        }

        collected.files.push(FileReport {
            path: path.display().to_string(),
            filename,
            extension: kind,
            chars: text.chars().count(),
            had_text,
        });
    }

    tracing::info!(
        chars = collected.combined_text.chars().count(),
        "total characters collected"
    );
    Ok(collected)
}

/// Immediate children of `folder` with a recognized extension, sorted by
/// kind and then file name.
fn list_candidate_files(folder: &Path) -> Vec<(PathBuf, FileKind)> {
    let walker = WalkDir::new(folder)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true);

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(folder = %folder.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        if let Some(kind) = FileKind::from_path(entry.path()) {
            files.push((entry.into_path(), kind));
        }
    }

    files.sort_by(|(pa, ka), (pb, kb)| {
        ka.cmp(kb)
            .then_with(|| pa.file_name().cmp(&pb.file_name()))
    });
    files
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
