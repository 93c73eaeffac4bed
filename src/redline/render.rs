//! DOCX rendering of redline markup.
//!
//! Writes a minimal single-section WordprocessingML package: one paragraph per
//! input line, one run per segment.

use std::io::{Cursor, Write};

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;

use crate::error::RenderError;
use crate::redline::markup::{self, Segment, SegmentKind};

/// Font color of deleted text.
pub const DELETE_COLOR: &str = "FF0000";
/// Font color of added text.
pub const ADD_COLOR: &str = "008000";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

// US Letter, 1" margins
const DOCUMENT_CLOSE: &str = r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr></w:body></w:document>"#;

/// Character formatting applied to a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStyle {
    pub bold: bool,
    pub strike: bool,
    pub color: Option<&'static str>,
}

impl RunStyle {
    pub fn for_kind(kind: SegmentKind) -> Self {
        match kind {
            SegmentKind::Plain => Self::default(),
            SegmentKind::Delete => Self {
                strike: true,
                color: Some(DELETE_COLOR),
                ..Self::default()
            },
            SegmentKind::Add => Self {
                bold: true,
                color: Some(ADD_COLOR),
                ..Self::default()
            },
        }
    }

    fn write_properties(&self, out: &mut String) {
        if *self == Self::default() {
            return;
        }
        // CT_RPr element order: b, strike, color
        out.push_str("<w:rPr>");
        if self.bold {
            out.push_str("<w:b/>");
        }
        if self.strike {
            out.push_str("<w:strike/>");
        }
        if let Some(color) = self.color {
            out.push_str(r#"<w:color w:val=""#);
            out.push_str(color);
            out.push_str(r#""/>"#);
        }
        out.push_str("</w:rPr>");
    }
}

/// Render tagged markup into DOCX bytes.
///
/// Never fails on the markup itself; malformed tags render as literal text.
pub fn render(marked_up_text: &str) -> Result<Vec<u8>, RenderError> {
    render_lines(&markup::parse(marked_up_text))
}

/// Render pre-parsed lines into DOCX bytes.
pub fn render_lines(lines: &[Vec<Segment>]) -> Result<Vec<u8>, RenderError> {
    let document = document_xml(lines);

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(name, options)
            .map_err(|e| RenderError::Package(e.to_string()))?;
        zip.write_all(body.as_bytes())?;
    }
    let cursor = zip
        .finish()
        .map_err(|e| RenderError::Package(e.to_string()))?;
    Ok(cursor.into_inner())
}

/// Body XML for the given lines.
pub fn document_xml(lines: &[Vec<Segment>]) -> String {
    let mut out = String::from(DOCUMENT_OPEN);
    for line in lines {
        out.push_str("<w:p>");
        for seg in line {
            write_run(&mut out, seg);
        }
        out.push_str("</w:p>");
    }
    out.push_str(DOCUMENT_CLOSE);
    out
}

fn write_run(out: &mut String, seg: &Segment) {
    let text = xml_safe(&seg.text);
    if text.is_empty() {
        return;
    }
    out.push_str("<w:r>");
    RunStyle::for_kind(seg.kind).write_properties(out);
    out.push_str(r#"<w:t xml:space="preserve">"#);
    out.push_str(&escape(text.as_str()));
    out.push_str("</w:t></w:r>");
}

/// Drop characters XML 1.0 cannot carry (C0 controls other than tab).
fn xml_safe(text: &str) -> String {
    text.chars()
        .filter(|c| *c == '\t' || !c.is_ascii_control())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::extract::{DocxTextExtractor, TextExtractor};

    #[test]
    fn styles_per_kind() {
        let del = RunStyle::for_kind(SegmentKind::Delete);
        assert!(del.strike && !del.bold);
        assert_eq!(del.color, Some("FF0000"));

        let add = RunStyle::for_kind(SegmentKind::Add);
        assert!(add.bold && !add.strike);
        assert_eq!(add.color, Some("008000"));

        assert_eq!(RunStyle::for_kind(SegmentKind::Plain), RunStyle::default());
    }

    #[test]
    fn three_runs_for_mixed_line() {
        let xml = document_xml(&markup::parse("[DELETE]old[/DELETE] text [ADD]new[/ADD]"));
        assert_eq!(xml.matches("<w:r>").count(), 3);
        assert!(xml.contains(
            r#"<w:r><w:rPr><w:strike/><w:color w:val="FF0000"/></w:rPr><w:t xml:space="preserve">old</w:t></w:r>"#
        ));
        assert!(xml.contains(r#"<w:r><w:t xml:space="preserve"> text </w:t></w:r>"#));
        assert!(xml.contains(
            r#"<w:r><w:rPr><w:b/><w:color w:val="008000"/></w:rPr><w:t xml:space="preserve">new</w:t></w:r>"#
        ));
    }

    #[test]
    fn one_paragraph_per_line() {
        let xml = document_xml(&markup::parse("a\n\n[ADD]b[/ADD]"));
        assert_eq!(xml.matches("<w:p>").count(), 3);
        assert_eq!(xml.matches("<w:sectPr>").count(), 1);
    }

    #[test]
    fn text_is_escaped() {
        let xml = document_xml(&markup::parse("Fish & <chips>"));
        assert!(xml.contains("Fish &amp; &lt;chips&gt;"));
    }

    #[test]
    fn control_characters_are_dropped() {
        let xml = document_xml(&markup::parse("a\u{0007}b\tc"));
        assert!(xml.contains(">ab\tc<"));
    }

    #[test]
    fn plain_text_round_trips_through_extraction() {
        let input = "Starters\nGrilled octopus & lemon\n\n\tSoup of the day – €9\n";
        let bytes = render(input).unwrap();
        let text = DocxTextExtractor.extract_text(&bytes).unwrap();
        assert_eq!(text, input);
    }

    #[test]
    fn plain_render_has_no_styling() {
        let bytes = render("Nothing changed here").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut xml = String::new();
        std::io::Read::read_to_string(&mut archive.by_name("word/document.xml").unwrap(), &mut xml)
            .unwrap();
        assert!(!xml.contains("<w:rPr>"));
    }

    #[test]
    fn redline_visible_text_keeps_both_sides() {
        let bytes = render("[DELETE]Chicken[/DELETE][ADD]Chick'n[/ADD] wings").unwrap();
        let text = DocxTextExtractor.extract_text(&bytes).unwrap();
        assert_eq!(text, "ChickenChick'n wings");
    }

    #[test]
    fn package_has_required_parts() {
        let bytes = render("x").unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        for part in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
            assert!(archive.by_name(part).is_ok(), "{part}");
        }
    }
}
