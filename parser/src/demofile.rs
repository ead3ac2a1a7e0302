use std::path::Path;

use tracing::{debug, warn};

use crate::error::Error;

/// A capture read fully into memory. The bytes are never modified.
pub struct DemoFile {
    data: Vec<u8>,
}

/// One compressed frame, borrowed from its [`DemoFile`].
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    pub index: usize,
    pub bytes: &'a [u8],
}

impl DemoFile {
    pub fn from_file(path: &Path) -> Result<DemoFile, Error> {
        let data = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = data.len(), "loaded capture");
        Ok(DemoFile { data })
    }

    pub fn from_bytes(data: Vec<u8>) -> DemoFile {
        DemoFile { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Splits the capture into `chunk_size` frames. A short chunk at the end
    /// of the file is not yielded. A zero `chunk_size` yields nothing.
    pub fn frames(&self, chunk_size: usize) -> impl Iterator<Item = RawFrame<'_>> {
        let trailing = self.trailing_bytes(chunk_size);
        if trailing > 0 {
            warn!(trailing, chunk_size, "discarding partial frame at end of capture");
        }
        let chunks = match chunk_size {
            0 => self.data[..0].chunks_exact(1),
            n => self.data.chunks_exact(n),
        };
        chunks
            .enumerate()
            .map(|(index, bytes)| RawFrame { index, bytes })
    }

    /// Bytes left over after the last whole frame. Zero when `chunk_size` is.
    pub fn trailing_bytes(&self, chunk_size: usize) -> usize {
        self.data.len().checked_rem(chunk_size).unwrap_or(0)
    }
}
