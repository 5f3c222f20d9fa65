// Document Text Extraction
// TXT / PDF / DOCX readers used by preprocess_file and the PDF entry point

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    Unsupported(String),
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DocumentKind {
    Text,
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let ext = Path::new(file_name.trim())
            .extension()?
            .to_string_lossy()
            .to_lowercase();
        match ext.as_str() {
            "txt" => Some(Self::Text),
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }
}

fn char_ref_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|lt|gt|quot|apos|amp);").expect("char ref regex"))
}

/// Extract plain text from an uploaded document, dispatching on its extension.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_file_name(file_name)
        .ok_or_else(|| ExtractError::Unsupported(file_name.to_string()))?;
    match kind {
        DocumentKind::Text => Ok(String::from_utf8_lossy(bytes).into_owned()),
        DocumentKind::Pdf => extract_pdf_text(bytes),
        DocumentKind::Docx => extract_docx_text(bytes),
    }
}

/// Read a file from disk and extract it by its own name.
pub fn extract_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    extract_text(&name, &bytes)
}

/// Read a PDF from disk regardless of its extension.
pub fn extract_pdf_file(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path)?;
    extract_pdf_text(&bytes)
}

pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}

/// Body text of a DOCX, one line per non-empty paragraph. Table cells are read
/// row by row. Tabs and line breaks inside a run are kept as `\t` and `\n`.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => push_paragraph(&mut lines, p),
            DocumentChild::Table(t) => push_table(&mut lines, t),
            _ => {}
        }
    }
    Ok(lines.join("\n"))
}

fn push_paragraph(lines: &mut Vec<String>, paragraph: &Paragraph) {
    let mut text = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(t) => text.push_str(&decode_xml_entities(&t.text)),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    if !text.trim().is_empty() {
        lines.push(text);
    }
}

fn push_table(lines: &mut Vec<String>, table: &Table) {
    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(p) => push_paragraph(lines, p),
                    TableCellContent::Table(t) => push_table(lines, t),
                    _ => {}
                }
            }
        }
    }
}

/// Resolve named and numeric character references left in run text.
fn decode_xml_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    char_ref_re()
        .replace_all(s, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "amp" => Some('&'),
                _ => {
                    let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                        Some(hex) => u32::from_str_radix(hex, 16).ok(),
                        None => entity[1..].parse::<u32>().ok(),
                    };
                    code.and_then(char::from_u32)
                }
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn pack(docx: docx_rs::Docx) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    /// A valid package whose `word/document.xml` is replaced by `body_xml`.
    fn docx_with_body(body_xml: &str) -> Vec<u8> {
        let base = pack(docx_rs::Docx::new().add_paragraph(Paragraph::new()));
        let mut archive = zip::ZipArchive::new(Cursor::new(base)).unwrap();

        let mut out = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut out);
            for i in 0..archive.len() {
                let file = archive.by_index(i).unwrap();
                if file.name() != "word/document.xml" {
                    writer.raw_copy_file(file).unwrap();
                }
            }
            writer
                .start_file("word/document.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            let xml = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
                W_NS, body_xml
            );
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        out.into_inner()
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(DocumentKind::from_file_name("claims.TXT"), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_file_name("a.b.pdf"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_file_name("claims.docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_file_name("claims.doc"), None);
        assert_eq!(DocumentKind::from_file_name("README"), None);
    }

    #[test]
    fn test_plain_text_lossy() {
        let text = extract_text("notes.txt", b"FIG. 1 \xff hinge").unwrap();
        assert_eq!(text, "FIG. 1 \u{fffd} hinge");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = extract_text("drawing.png", b"").unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(ref name) if name == "drawing.png"));
    }

    #[test]
    fn test_invalid_pdf_is_an_error() {
        assert!(matches!(
            extract_text("broken.pdf", b"not a pdf"),
            Err(ExtractError::Pdf(_))
        ));
    }

    #[test]
    fn test_docx_paragraphs() {
        let docx = docx_rs::Docx::new()
            .add_paragraph(Paragraph::new().add_run(docx_rs::Run::new().add_text("Figure 1 shows a hinge 12 and pin 14.")))
            .add_paragraph(Paragraph::new())
            .add_paragraph(Paragraph::new().add_run(docx_rs::Run::new().add_text("Claim 1")));
        let text = extract_docx_text(&pack(docx)).unwrap();
        assert_eq!(text, "Figure 1 shows a hinge 12 and pin 14.\nClaim 1");
    }

    #[test]
    fn test_docx_tabs_breaks_and_char_refs() {
        let body = "<w:p><w:r><w:t>FIG.</w:t><w:tab/><w:t>1 shows the hinge&#8217;s pin</w:t>\
                    <w:br/><w:t>and arm 12.</w:t></w:r></w:p>\
                    <w:p><w:r><w:t>   </w:t></w:r></w:p>\
                    <w:p><w:r><w:t>Claim &lt;1&gt; &amp; part&#x2011;14</w:t></w:r></w:p>";
        let text = extract_docx_text(&docx_with_body(body)).unwrap();
        assert_eq!(
            text,
            "FIG.\t1 shows the hinge\u{2019}s pin\nand arm 12.\nClaim <1> & part\u{2011}14"
        );
    }

    #[test]
    fn test_decode_char_refs() {
        assert_eq!(decode_xml_entities("a &amp;lt; b"), "a &lt; b");
        assert_eq!(decode_xml_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_xml_entities("&#xD800; &bogus;"), "&#xD800; &bogus;");
    }

    #[test]
    fn test_not_a_docx_is_an_error() {
        assert!(matches!(
            extract_text("claims.docx", b"plain bytes"),
            Err(ExtractError::Docx(_))
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = extract_pdf_file(Path::new("/no/such/dir/patent.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}
