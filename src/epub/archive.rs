//! Archive-writer capability and its zip implementation.

use super::AssemblyError;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Sink for package members. Entries are written in call order.
pub trait ArchiveWriter {
    /// Add a named entry. `stored` keeps it uncompressed.
    fn add_entry(&mut self, name: &str, data: &[u8], stored: bool) -> Result<(), AssemblyError>;

    /// Finalize into a single binary blob.
    fn finish(self) -> Result<Vec<u8>, AssemblyError>;
}

/// In-memory zip archive. Stored entries use `Stored`, everything else `Deflated`.
pub struct ZipArchiveWriter {
    zip: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipArchiveWriter {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn add_entry(&mut self, name: &str, data: &[u8], stored: bool) -> Result<(), AssemblyError> {
        let method = if stored {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .unix_permissions(0o644);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, AssemblyError> {
        Ok(self.zip.finish()?.into_inner())
    }
}
