//! Per-format text extraction for PDF, DOCX and plain-text files.
//!
//! Each extractor returns `Result<String, ExtractError>`; the folder collector
//! turns a failure into empty text via [`extract_or_empty`], so extraction
//! problems never escape the scan of a single file.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use thiserror::Error;

use crate::models::FileKind;

/// Maximum decompressed bytes to read from `word/document.xml` (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

const DOCX_BODY_ENTRY: &str = "word/document.xml";

/// Failure to pull text out of a single file.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

/// Extracts text from the file at `path`, interpreting it as `kind`.
pub fn extract_file(path: &Path, kind: FileKind) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path)?;
    extract_bytes(&bytes, kind)
}

/// Extracts text from in-memory file contents.
pub fn extract_bytes(bytes: &[u8], kind: FileKind) -> Result<String, ExtractError> {
    match kind {
        FileKind::Pdf => extract_pdf(bytes),
        FileKind::Docx => extract_docx(bytes),
        FileKind::Txt => Ok(extract_txt(bytes)),
    }
}

/// Like [`extract_file`], but logs the failure and yields an empty string.
pub fn extract_or_empty(path: &Path, kind: FileKind) -> String {
    match extract_file(path, kind) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(path = %path.display(), kind = %kind, error = %e, "extraction failed");
            String::new()
        }
    }
}

/// Page-by-page extraction; every page is followed by a newline, and pages
/// without a text layer contribute only that newline.
fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs instead of returning Err.
    let pages = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(bytes))
        .map_err(|_| ExtractError::Pdf("parser panicked".to_string()))?
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let mut out = String::new();
    for page in pages {
        out.push_str(&page);
        out.push('\n');
    }
    Ok(out)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let entry = archive
        .by_name(DOCX_BODY_ENTRY)
        .map_err(|e| ExtractError::Docx(format!("{}: {}", DOCX_BODY_ENTRY, e)))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(ExtractError::Docx(format!(
            "{} exceeds size limit ({} bytes)",
            DOCX_BODY_ENTRY, MAX_XML_ENTRY_BYTES
        )));
    }

    let paragraphs = docx_paragraphs(&doc_xml)?;
    Ok(paragraphs.join("\n"))
}

/// Collects the text of every `<w:p>` in document order.
///
/// Paragraphs may nest (text boxes inside runs); each one is emitted when it
/// closes, so an inner paragraph precedes the one that contains it.
fn docx_paragraphs(xml: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut open: Vec<String> = Vec::new();
    let mut paragraphs = Vec::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => open.push(String::new()),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(p) = open.pop() {
                        paragraphs.push(p);
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"p" => paragraphs.push(String::new()),
                b"tab" => push_to_open(&mut open, "\t"),
                b"br" | b"cr" => push_to_open(&mut open, "\n"),
                _ => {}
            },
            Ok(Event::Text(te)) if in_text => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Docx(e.to_string()))?;
                push_to_open(&mut open, &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}

fn push_to_open(open: &mut [String], text: &str) {
    if let Some(current) = open.last_mut() {
        current.push_str(text);
    }
}

/// Lossy UTF-8: undecodable bytes become U+FFFD rather than failing the file.
/// `\r\n` and lone `\r` line endings are normalised to `\n`.
fn extract_txt(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}
