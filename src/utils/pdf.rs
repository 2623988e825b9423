//! PDF content sniffing.
//!
//! arXiv serves an HTML placeholder instead of the PDF for withdrawn
//! articles, with a success status. The only reliable signal is the file
//! content, so downloads are checked against the PDF magic bytes.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Every PDF file starts with these bytes
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Whether `bytes` begins with the PDF signature
pub fn is_pdf_signature(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Read the first four bytes of `path` and check them against [`PDF_MAGIC`].
///
/// Files shorter than four bytes are not PDFs.
pub fn has_pdf_signature(path: &Path) -> io::Result<bool> {
    let mut head = Vec::with_capacity(PDF_MAGIC.len());
    File::open(path)?
        .take(PDF_MAGIC.len() as u64)
        .read_to_end(&mut head)?;
    Ok(is_pdf_signature(&head))
}
