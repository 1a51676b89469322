//! Turns an uploaded resume file into plain text.
//!
//! Supported: PDF (pdf-extract), DOCX (zip + quick-xml over `word/document.xml`),
//! and UTF-8 plain text. The format is chosen from the file name extension,
//! falling back to the declared content type.
//!
//! Extraction is CPU-bound and pdf-extract may panic on malformed input, so
//! handlers run `extract_text` inside `spawn_blocking`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

const DOCX_BODY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("could not read PDF: {0}")]
    Pdf(String),

    #[error("could not read DOCX: {0}")]
    Docx(String),

    #[error("text file is not valid UTF-8")]
    InvalidEncoding,

    #[error("no text could be extracted from the document")]
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    /// Picks a format from the upload's file name, then its content type.
    pub fn from_hint(
        file_name: Option<&str>,
        content_type: Option<&str>,
    ) -> Result<Self, ExtractionError> {
        let extension = file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase());

        let by_extension = match extension.as_deref() {
            Some("pdf") => Some(DocumentFormat::Pdf),
            Some("docx") => Some(DocumentFormat::Docx),
            Some("txt") | Some("text") | Some("md") => Some(DocumentFormat::PlainText),
            _ => None,
        };
        if let Some(format) = by_extension {
            return Ok(format);
        }

        match content_type.map(|ct| ct.split(';').next().unwrap_or(ct).trim()) {
            Some("application/pdf") => Ok(DocumentFormat::Pdf),
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document") => {
                Ok(DocumentFormat::Docx)
            }
            Some("text/plain") | Some("text/markdown") => Ok(DocumentFormat::PlainText),
            _ => Err(ExtractionError::UnsupportedFormat(
                file_name
                    .or(content_type)
                    .unwrap_or("unknown")
                    .to_string(),
            )),
        }
    }
}

/// Extracts plain text from `bytes`. Fails with `Empty` when nothing but
/// whitespace comes out.
pub fn extract_text(bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractionError> {
    let text = match format {
        DocumentFormat::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| ExtractionError::Pdf(e.to_string()))?,
        DocumentFormat::Docx => extract_docx(bytes)?,
        DocumentFormat::PlainText => std::str::from_utf8(bytes)
            .map_err(|_| ExtractionError::InvalidEncoding)?
            .to_string(),
    };

    let text = text.trim().to_string();
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text)
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractionError::Docx(format!("not a zip archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|_| ExtractionError::Docx(format!("missing {DOCX_BODY}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    docx_paragraphs(&xml)
}

/// One output line per `<w:p>`; `<w:br/>` starts a new line, `<w:tab/>` becomes a space.
fn docx_paragraphs(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();
    let mut output = String::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"br" => paragraph.push('\n'),
                b"tab" => paragraph.push(' '),
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"p" => {
                    output.push_str(&paragraph);
                    output.push('\n');
                    paragraph.clear();
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                paragraph.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractionError::Docx(format!("malformed XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(output)
}
