//! Response-body chunk accumulation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as Base64Standard;

use crate::browser::StreamChunk;
use crate::error::Result;

// ============================================================================
// ChunkAssembler
// ============================================================================

/// Accumulates streamed body chunks and decodes them once at the end.
///
/// Chunks arrive in their transport encoding and may split the encoding
/// anywhere, including mid-quantum for base64. Decoding therefore must
/// happen on the full concatenation, never per chunk.
///
/// A stream is uniformly encoded: either every chunk is base64 or every
/// chunk is plain text.
#[derive(Debug, Default)]
pub(crate) struct ChunkAssembler {
    /// Concatenated transport-encoded payload.
    buf: String,
    /// Encoding of the stream, fixed by the first chunk.
    base64: Option<bool>,
}

impl ChunkAssembler {
    /// Creates an empty assembler.
    #[inline]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk's payload.
    pub(crate) fn push(&mut self, chunk: &StreamChunk) {
        if self.base64.is_none() {
            self.base64 = Some(chunk.base64_encoded);
        }
        self.buf.push_str(&chunk.data);
    }

    /// Decodes the accumulated payload into raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the concatenation is not valid
    /// base64.
    pub(crate) fn finish(self) -> Result<Vec<u8>> {
        match self.base64 {
            Some(true) => Ok(Base64Standard.decode(self.buf)?),
            Some(false) => Ok(self.buf.into_bytes()),
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
