//! Text extraction from uploaded résumé documents.
//!
//! Never fails: unreadable PDFs and undecodable bytes degrade to empty or
//! lossy text instead of aborting the interaction.

use bytes::Bytes;
use lopdf::Document;
use tracing::{debug, warn};

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// An uploaded file as received from the client. Lives for one request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: Option<String>,
    pub media_type: Option<String>,
    pub content: Bytes,
}

impl UploadedDocument {
    /// PDF when the declared type says so. Untyped or octet-stream uploads
    /// fall back to the filename extension.
    pub fn is_pdf(&self) -> bool {
        match self.media_type.as_deref().map(essence) {
            Some(mime) if mime.eq_ignore_ascii_case(PDF_MEDIA_TYPE) => true,
            Some(mime)
                if !mime.is_empty() && !mime.eq_ignore_ascii_case("application/octet-stream") =>
            {
                false
            }
            _ => self
                .filename
                .as_deref()
                .is_some_and(|name| name.to_ascii_lowercase().ends_with(".pdf")),
        }
    }
}

/// Strips `; charset=...` style parameters from a media type.
fn essence(media_type: &str) -> &str {
    media_type.split(';').next().unwrap_or_default().trim()
}

/// Returns the document's text: PDF pages joined by a single space, or the
/// content decoded as UTF-8 with invalid sequences dropped.
pub fn extract_text(document: &UploadedDocument) -> String {
    if document.is_pdf() {
        extract_pdf_text(&document.content)
    } else {
        decode_utf8_ignoring_invalid(&document.content)
    }
}

fn extract_pdf_text(data: &[u8]) -> String {
    let doc = match Document::load_mem(data) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("Failed to load PDF, treating as empty: {e}");
            return String::new();
        }
    };

    let pages: Vec<Option<String>> = doc
        .get_pages()
        .keys()
        .map(|page_num| match doc.extract_text(&[*page_num]) {
            Ok(text) => Some(text),
            Err(e) => {
                debug!("No text extracted from page {page_num}: {e}");
                None
            }
        })
        .collect();

    debug!("Extracted text from {} PDF pages", pages.len());
    join_pages(pages)
}

fn join_pages(pages: Vec<Option<String>>) -> String {
    pages
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect::<Vec<_>>()
        .join(" ")
}

/// UTF-8 decode that skips invalid byte sequences instead of replacing them.
fn decode_utf8_ignoring_invalid(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for chunk in data.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
