//! Plain-text extraction from DOCX packages.
//!
//! A DOCX file is a zip package; the body lives in `word/document.xml`.
//! Text runs (`w:t`) are concatenated, `w:tab` becomes a tab, `w:br` and
//! paragraph ends (`</w:p>`) become newlines.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ExtractionError;

/// Package part holding the main document body.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Converts a binary document buffer into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Extractor for Office Open XML word-processing documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxTextExtractor;

impl TextExtractor for DocxTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| ExtractionError::Package(e.to_string()))?;

        let mut xml = String::new();
        match archive.by_name(DOCUMENT_PART) {
            Ok(mut part) => {
                part.read_to_string(&mut xml)?;
            }
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(ExtractionError::MissingPart {
                    part: DOCUMENT_PART.into(),
                });
            }
            Err(e) => return Err(ExtractionError::Package(e.to_string())),
        }

        document_xml_to_text(&xml)
    }
}

/// Flatten WordprocessingML body XML into plain text.
pub fn document_xml_to_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;
    let mut paragraphs = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = true,
                b"w:p" => {
                    if paragraphs > 0 {
                        text.push('\n');
                    }
                    paragraphs += 1;
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                // Self-closed empty paragraph
                b"w:p" => {
                    if paragraphs > 0 {
                        text.push('\n');
                    }
                    paragraphs += 1;
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text_run = false;
                }
            }
            Ok(Event::Text(t)) if in_text_run => {
                let chunk = t
                    .unescape()
                    .map_err(|e| ExtractionError::Xml(e.to_string()))?;
                text.push_str(&chunk);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractionError::Xml(format!(
                    "at byte {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn package_with(part: &str, body: &str) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(part, zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(body.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn paragraphs_become_lines() {
        let xml = r#"<w:document><w:body>
            <w:p><w:r><w:t>First</w:t></w:r></w:p>
            <w:p><w:r><w:t xml:space="preserve">Second </w:t></w:r><w:r><w:t>line</w:t></w:r></w:p>
        </w:body></w:document>"#;
        assert_eq!(document_xml_to_text(xml).unwrap(), "First\nSecond line");
    }

    #[test]
    fn tabs_breaks_and_entities() {
        let xml = r#"<w:body><w:p><w:r><w:t>A&amp;B</w:t><w:tab/><w:t>C</w:t><w:br/><w:t>D</w:t></w:r></w:p></w:body>"#;
        assert_eq!(document_xml_to_text(xml).unwrap(), "A&B\tC\nD");
    }

    #[test]
    fn whitespace_outside_text_runs_is_ignored() {
        let xml = "<w:body>\n  <w:p>\n    <w:r><w:t>Only</w:t></w:r>\n  </w:p>\n</w:body>";
        assert_eq!(document_xml_to_text(xml).unwrap(), "Only");
    }

    #[test]
    fn empty_paragraphs_keep_line_positions() {
        let xml = "<w:body><w:p><w:r><w:t>A</w:t></w:r></w:p><w:p/><w:p><w:r><w:t>B</w:t></w:r></w:p></w:body>";
        assert_eq!(document_xml_to_text(xml).unwrap(), "A\n\nB");
    }

    #[test]
    fn extracts_from_package() {
        let bytes = package_with(
            DOCUMENT_PART,
            "<w:document><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>",
        );
        assert_eq!(DocxTextExtractor.extract_text(&bytes).unwrap(), "Hello");
    }

    #[test]
    fn garbage_bytes_are_a_package_error() {
        let err = DocxTextExtractor
            .extract_text(b"definitely not a zip file")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Package(_)));
    }

    #[test]
    fn missing_document_part() {
        let bytes = package_with("word/styles.xml", "<w:styles/>");
        let err = DocxTextExtractor.extract_text(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingPart { .. }));
    }

    #[test]
    fn malformed_xml_is_reported() {
        let bytes = package_with(DOCUMENT_PART, "<w:body><w:p><w:t>x</w:p></w:body>");
        let err = DocxTextExtractor.extract_text(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::Xml(_)));
    }
}
