//! In-memory ZIP bundle of rendered documents.

use std::io::{Cursor, Seek, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

/// MIME type of a serialized bundle
pub const ZIP_MIME: &str = "application/zip";

/// Rendered documents keyed by entry name
///
/// Entries keep the order in which their name was first inserted. Inserting
/// an existing name replaces the bytes in place.
#[derive(Debug, Clone, Default)]
pub struct DocumentBundle {
    entries: Vec<(String, Vec<u8>)>,
    replaced: Vec<String>,
}

impl DocumentBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry, returning the replaced bytes
    pub fn insert(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> Option<Vec<u8>> {
        let name = name.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => {
                self.replaced.push(name);
                Some(std::mem::replace(&mut entry.1, bytes))
            }
            None => {
                self.entries.push((name, bytes));
                None
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(existing, _)| existing == name)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Entry names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Names that were overwritten by a later insert, once per overwrite
    pub fn replaced(&self) -> &[String] {
        &self.replaced
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialize as a ZIP archive
    pub fn to_zip_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.write_to(&mut buffer)?;
        Ok(buffer.into_inner())
    }

    /// Write the ZIP archive to any seekable writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, bytes) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }

        zip.finish()?;
        Ok(())
    }
}
