//! Paragraph text from Word documents (OOXML `word/document.xml`).

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;

use crate::errors::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";
/// Maximum decompressed bytes read from the document part (zip-bomb protection).
const MAX_DOCUMENT_XML_BYTES: u64 = 50 * 1024 * 1024;

/// Text of every body paragraph, each followed by one `\n`.
pub fn extract_paragraph_text(path: &Path) -> Result<String, ExtractError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let entry = archive.by_name(DOCUMENT_PART)?;

    let mut xml = Vec::new();
    entry.take(MAX_DOCUMENT_XML_BYTES).read_to_end(&mut xml)?;
    if xml.len() as u64 >= MAX_DOCUMENT_XML_BYTES {
        return Err(ExtractError::Ooxml(format!(
            "{DOCUMENT_PART} exceeds size limit ({MAX_DOCUMENT_XML_BYTES} bytes)"
        )));
    }

    let mut out = String::new();
    for paragraph in body_paragraphs(&xml)? {
        out.push_str(&paragraph);
        out.push('\n');
    }
    Ok(out)
}

/// Paragraphs that sit directly under `w:body`. Paragraphs inside tables, text boxes and
/// content controls are skipped, as are nested paragraphs inside a body paragraph.
pub(crate) fn body_paragraphs(xml: &[u8]) -> Result<Vec<String>, ExtractError> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut paragraphs = Vec::new();
    // local names of the currently open elements
    let mut stack: Vec<Vec<u8>> = Vec::new();
    let mut current: Option<String> = None;
    let mut p_depth = 0usize;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                match name.as_slice() {
                    b"p" if current.is_none() && is_body(&stack) => {
                        current = Some(String::new());
                        p_depth = 1;
                    }
                    b"p" if current.is_some() => p_depth += 1,
                    b"t" if current.is_some() && p_depth == 1 => in_text = true,
                    _ => {}
                }
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"p" if current.is_none() && is_body(&stack) => paragraphs.push(String::new()),
                    // run content only; `w:pPr/w:tabs/w:tab` is a tab-stop definition
                    b"tab" if p_depth == 1 && is_run(&stack) => push(&mut current, "\t"),
                    b"br" | b"cr" if p_depth == 1 && is_run(&stack) => push(&mut current, "\n"),
                    _ => {}
                }
            }
            Ok(Event::Text(te)) if in_text => {
                let text = te
                    .unescape()
                    .map_err(|e| ExtractError::Ooxml(e.to_string()))?;
                push(&mut current, &text);
            }
            Ok(Event::CData(cd)) if in_text => {
                push(&mut current, &String::from_utf8_lossy(&cd.into_inner()));
            }
            Ok(Event::End(e)) => {
                stack.pop();
                match e.local_name().as_ref() {
                    b"t" => in_text = false,
                    b"p" if current.is_some() => {
                        p_depth -= 1;
                        if p_depth == 0 {
                            paragraphs.extend(current.take());
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractError::Ooxml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(paragraphs)
}

fn is_body(stack: &[Vec<u8>]) -> bool {
    stack.last().map(|name| name.as_slice()) == Some(b"body".as_slice())
}

fn is_run(stack: &[Vec<u8>]) -> bool {
    stack.last().map(|name| name.as_slice()) == Some(b"r".as_slice())
}

fn push(current: &mut Option<String>, text: &str) {
    if let Some(paragraph) = current.as_mut() {
        paragraph.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::fixtures::{docx, paragraph};

    const NS: &str = "xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\"";

    fn paragraphs_of(body: &str) -> Vec<String> {
        let xml = format!("<w:document {NS}><w:body>{body}</w:body></w:document>");
        body_paragraphs(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_runs_are_joined_within_a_paragraph() {
        let got = paragraphs_of(
            "<w:p><w:r><w:t>Senior </w:t></w:r><w:r><w:t>Engineer</w:t></w:r></w:p>",
        );
        assert_eq!(got, vec!["Senior Engineer"]);
    }

    #[test]
    fn test_empty_paragraphs_are_kept() {
        let got = paragraphs_of("<w:p/><w:p><w:r><w:t>x</w:t></w:r></w:p><w:p></w:p>");
        assert_eq!(got, vec!["", "x", ""]);
    }

    #[test]
    fn test_tabs_and_breaks() {
        let got = paragraphs_of(
            "<w:p><w:r><w:t>2019</w:t><w:tab/><w:t>Acme</w:t><w:br/><w:t>Berlin</w:t></w:r></w:p>",
        );
        assert_eq!(got, vec!["2019\tAcme\nBerlin"]);
    }

    #[test]
    fn test_tab_stop_definitions_are_not_text() {
        let got = paragraphs_of(
            "<w:p><w:pPr><w:tabs><w:tab w:val=\"right\" w:pos=\"9000\"/></w:tabs></w:pPr>\
             <w:r><w:t>Acme</w:t><w:tab/><w:t>2019</w:t></w:r></w:p>",
        );
        assert_eq!(got, vec!["Acme\t2019"]);
    }

    #[test]
    fn test_hyperlink_runs_are_included() {
        let got = paragraphs_of(
            "<w:p><w:r><w:t>Site: </w:t></w:r><w:hyperlink><w:r><w:t>example.com</w:t></w:r></w:hyperlink></w:p>",
        );
        assert_eq!(got, vec!["Site: example.com"]);
    }

    #[test]
    fn test_table_paragraphs_are_not_body_paragraphs() {
        let got = paragraphs_of(
            "<w:p><w:r><w:t>before</w:t></w:r></w:p>\
             <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>\
             <w:p><w:r><w:t>after</w:t></w:r></w:p>",
        );
        assert_eq!(got, vec!["before", "after"]);
    }

    #[test]
    fn test_text_box_content_is_skipped() {
        let got = paragraphs_of(
            "<w:p><w:r><w:t>main</w:t><w:drawing><w:txbxContent><w:p><w:r><w:t>boxed</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r></w:p>",
        );
        assert_eq!(got, vec!["main"]);
    }

    #[test]
    fn test_entities_are_unescaped() {
        let got = paragraphs_of("<w:p><w:r><w:t>R&amp;D &lt;team&gt;</w:t></w:r></w:p>");
        assert_eq!(got, vec!["R&D <team>"]);
    }

    #[test]
    fn test_deleted_text_is_ignored() {
        let got = paragraphs_of(
            "<w:p><w:del><w:r><w:delText>old</w:delText></w:r></w:del><w:r><w:t>new</w:t></w:r></w:p>",
        );
        assert_eq!(got, vec!["new"]);
    }

    #[test]
    fn test_file_output_has_one_newline_per_paragraph() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cv.docx");
        let body = format!("{}<w:p/>{}", paragraph("SKILLS"), paragraph("Rust, SQL"));
        std::fs::write(&path, docx(&body)).unwrap();
        assert_eq!(
            extract_paragraph_text(&path).unwrap(),
            "SKILLS\n\nRust, SQL\n"
        );
    }

    #[test]
    fn test_zip_without_document_part_is_error() {
        use std::io::Write;
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cv.docx");
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(std::io::Cursor::new(&mut buf));
            zip.start_file("other.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"<x/>").unwrap();
            zip.finish().unwrap();
        }
        std::fs::write(&path, buf).unwrap();
        assert!(matches!(
            extract_paragraph_text(&path),
            Err(ExtractError::Zip(_))
        ));
    }

    #[test]
    fn test_not_a_zip_is_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("cv.docx");
        std::fs::write(&path, b"plain bytes").unwrap();
        assert!(extract_paragraph_text(&path).is_err());
    }
}
