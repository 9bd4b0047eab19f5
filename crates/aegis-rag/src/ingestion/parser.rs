//! PDF text extraction

use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Glyph names that leak into pdf-extract output for fonts without a
/// ToUnicode map, and their plain-text replacements
const GLYPH_REPLACEMENTS: &[(&str, &str)] = &[
    ("uni2010", "-"),
    ("uni2011", "-"),
    ("uni2013", "-"),
    ("uni2014", "--"),
    ("uni2018", "'"),
    ("uni2019", "'"),
    ("uni201C", "\""),
    ("uni201D", "\""),
    ("uni2022", "* "),
    ("uni2026", "..."),
    ("uni00A0", " "),
];

/// Unicode punctuation normalised to ASCII
const CHAR_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "--"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "* "),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
    ('\0', ""),
];

/// Clean up extracted PDF text: glyph names, ligatures, blank lines
pub fn cleanup_pdf_text(text: &str) -> String {
    let mut result = text.to_string();

    for (glyph, replacement) in GLYPH_REPLACEMENTS {
        if result.contains(glyph) {
            result = result.replace(glyph, replacement);
        }
    }

    for (ch, replacement) in CHAR_REPLACEMENTS {
        if result.contains(*ch) {
            result = result.replace(*ch, replacement);
        }
    }

    result
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// SHA-256 of raw bytes, hex encoded
pub fn hash_content(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Text extracted from one PDF
#[derive(Debug, Clone)]
pub struct ExtractedText {
    /// Cleaned text content
    pub content: String,
    /// Total pages (if the page tree could be read)
    pub total_pages: Option<u32>,
}

/// PDF text extractor
pub struct PdfExtractor;

impl PdfExtractor {
    /// Whether the bytes start with a PDF header
    pub fn looks_like_pdf(data: &[u8]) -> bool {
        let head = &data[..data.len().min(1024)];
        head.windows(5).any(|w| w == b"%PDF-")
    }

    /// Extract and clean the text of a PDF
    ///
    /// Blocking; callers on the async runtime should use `spawn_blocking`.
    pub fn extract(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        if !Self::looks_like_pdf(data) {
            return Err(Error::file_parse(filename, "file is not a PDF document"));
        }

        let raw = match pdf_extract::extract_text_from_mem(data) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::warn!("pdf-extract returned no text for {}, trying fallback", filename);
                Self::extract_fallback(filename, data)?
            }
            Err(e) => {
                tracing::warn!("pdf-extract failed for {}: {}, trying fallback", filename, e);
                Self::extract_fallback(filename, data)?
            }
        };

        let content = cleanup_pdf_text(&raw);
        if content.is_empty() {
            return Err(Error::ingestion(
                filename,
                "No text content could be extracted from PDF. It may be image-based.",
            ));
        }

        let total_pages = lopdf::Document::load_mem(data)
            .ok()
            .map(|doc| doc.get_pages().len() as u32);

        Ok(ExtractedText { content, total_pages })
    }

    /// Fallback extraction page by page through lopdf
    fn extract_fallback(filename: &str, data: &[u8]) -> Result<String> {
        let doc = lopdf::Document::load_mem(data)
            .map_err(|e| Error::ingestion(filename, format!("Failed to load PDF: {}", e)))?;

        let mut all_text = String::new();
        for page_number in doc.get_pages().keys() {
            match doc.extract_text(&[*page_number]) {
                Ok(text) => {
                    if !all_text.is_empty() {
                        all_text.push('\n');
                    }
                    all_text.push_str(&text);
                }
                Err(e) => {
                    tracing::debug!("Could not extract page {} of {}: {}", page_number, filename, e);
                }
            }
        }

        Ok(all_text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Build a one-page PDF showing `text` in Courier
    pub(crate) fn make_pdf(text: &str) -> Vec<u8> {
        let mut doc = lopdf::Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extract_generated_pdf() {
        let data = make_pdf("Hello World");
        let extracted = PdfExtractor::extract("hello.pdf", &data).unwrap();
        assert!(extracted.content.contains("Hello World"));
        assert_eq!(extracted.total_pages, Some(1));
    }

    #[test]
    fn test_rejects_non_pdf() {
        let err = PdfExtractor::extract("notes.txt", b"just some text").unwrap_err();
        assert!(matches!(err, Error::FileParse { .. }));
    }

    #[test]
    fn test_unreadable_pdf_is_ingestion_error() {
        let err = PdfExtractor::extract("broken.pdf", b"%PDF-1.4\nnot really a pdf").unwrap_err();
        assert!(matches!(err, Error::Ingestion { .. }));
    }

    #[test]
    fn test_cleanup() {
        let cleaned = cleanup_pdf_text("  \u{FB01}rst line \n\n\n uni2019quoted\u{0}  \n");
        assert_eq!(cleaned, "first line\n'quoted");
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_content(b"abc"), hash_content(b"abc"));
        assert_ne!(hash_content(b"abc"), hash_content(b"abd"));
        assert_eq!(hash_content(b"").len(), 64);
    }
}
