//! Page-by-page PDF text extraction.

use std::path::Path;

use lopdf::Document;

use crate::errors::ExtractError;

/// Concatenates the text of every page in page order, with nothing inserted between pages.
/// A page with no text contributes the empty string; a page that fails to parse fails the
/// whole document.
pub fn extract_pdf_text(path: &Path) -> Result<String, ExtractError> {
    let doc = Document::load(path)?;
    pages_text(&doc)
}

pub(crate) fn pages_text(doc: &Document) -> Result<String, ExtractError> {
    let mut out = String::new();
    // get_pages is keyed by page number, so iteration is already in reading order
    for page_number in doc.get_pages().keys() {
        let text = doc.extract_text(&[*page_number])?;
        out.push_str(&text);
    }
    Ok(out)
}
