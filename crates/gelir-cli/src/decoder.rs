//! PDF text decoding behind the core's [`TextDecoder`] port.

use std::path::Path;

use gelir_core::{DecodeError, TextDecoder};
use tracing::debug;

/// Decodes PDF documents with `pdf-extract`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextDecoder;

impl TextDecoder for PdfTextDecoder {
    fn decode(&self, path: &Path) -> Result<String, DecodeError> {
        let bytes = std::fs::read(path).map_err(|e| DecodeError::Read(e.to_string()))?;
        let text = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| DecodeError::Decode(e.to_string()))?;

        if text.trim().is_empty() {
            return Err(DecodeError::Empty);
        }
        debug!(path = %path.display(), chars = text.len(), "decoded document text");
        Ok(text)
    }
}
