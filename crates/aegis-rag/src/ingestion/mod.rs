//! Document ingestion: PDF text extraction and chunking

pub mod chunker;
pub mod parser;

pub use chunker::{TextChunker, TextSpan};
pub use parser::{ExtractedText, PdfExtractor};
