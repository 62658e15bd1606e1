//! File-to-text conversion and passage splitting.
//!
//! PDFs go through lopdf's text extraction, plain text is read as-is, and
//! anything else is skipped. Extracted text is cleaned by dropping short lines
//! (page numbers, running headers, signature blocks) and then split into
//! passages on blank lines. Contracts without `==Heading==` markers come out
//! as a single passage per file.

use std::path::Path;

use clausereview_core::Document;
use tracing::{debug, warn};

use crate::error::StoreError;

/// Lines at or below this many characters are dropped unless they are headings.
const MIN_LINE_CHARS: usize = 30;

/// Extract raw text from a file, or `None` for unsupported formats.
pub fn convert_file(path: &Path) -> Result<Option<String>, StoreError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("pdf") => pdf_text(path).map(Some),
        Some("txt") | Some("md") => {
            let bytes = std::fs::read(path).map_err(|e| StoreError::io(path, e))?;
            Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
        }
        _ => {
            warn!(path = %path.display(), "skipping file with unsupported extension");
            Ok(None)
        }
    }
}

#[cfg(feature = "pdf")]
fn pdf_text(path: &Path) -> Result<String, StoreError> {
    let doc = lopdf::Document::load(path)?;
    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let mut text = String::new();
    for page in &pages {
        // Pages with unsupported encodings yield nothing rather than failing the file.
        match doc.extract_text(&[*page]) {
            Ok(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            Err(e) => warn!(path = %path.display(), page, error = %e, "page text extraction failed"),
        }
    }
    debug!(path = %path.display(), pages = pages.len(), chars = text.len(), "extracted pdf text");
    Ok(text)
}

#[cfg(not(feature = "pdf"))]
fn pdf_text(path: &Path) -> Result<String, StoreError> {
    warn!(path = %path.display(), "built without pdf support; treating as empty");
    Ok(String::new())
}

/// Drop short lines and group the rest into blank-line separated sections.
///
/// A line survives if it is longer than 30 characters or is a `==Heading==`
/// marker. Each heading opens a new section; sections holding nothing but a
/// heading are removed.
pub fn clean_text(text: &str) -> String {
    let mut sections: Vec<Vec<&str>> = vec![Vec::new()];

    for line in text.lines() {
        let heading = is_heading(line);
        if !heading && line.chars().count() <= MIN_LINE_CHARS {
            continue;
        }
        if heading
            && let Some(current) = sections.last()
            && !current.is_empty()
        {
            sections.push(Vec::new());
        }
        if let Some(current) = sections.last_mut() {
            current.push(line);
        }
    }

    sections
        .iter()
        .filter(|s| !(s.is_empty() || (s.len() == 1 && is_heading(s[0]))))
        .map(|s| s.join("\n"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn is_heading(line: &str) -> bool {
    line.len() >= 4 && line.starts_with("==") && line.ends_with("==")
}

/// Split text on blank lines into trimmed, non-empty passages.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Convert one file into passage documents named after the file.
///
/// Unsupported formats and files with no surviving text yield no documents.
pub fn convert_source(path: &Path) -> Result<Vec<Document>, StoreError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let Some(raw) = convert_file(path)? else {
        return Ok(Vec::new());
    };

    let docs: Vec<Document> = split_paragraphs(&clean_text(&raw))
        .into_iter()
        .enumerate()
        .map(|(i, content)| Document::new(&name, i, content))
        .collect();

    debug!(name = %name, passages = docs.len(), "converted source");
    Ok(docs)
}
