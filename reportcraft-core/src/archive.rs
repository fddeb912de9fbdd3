//! In-memory access to the compound template archive

use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipArchive, ZipWriter};

use crate::error::RenderError;

/// A template archive loaded fully into memory.
///
/// Entries keep their original order. Entries that are never written are
/// re-packed from their original bytes, untouched, which keeps the template's
/// macros, styles and formulas intact across a render.
pub struct TemplateArchive {
    entries: Vec<Entry>,
}

struct Entry {
    name: String,
    data: Vec<u8>,
}

impl TemplateArchive {
    /// Load every entry of a zip archive into memory.
    pub fn open(bytes: &[u8]) -> Result<Self, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut data)?;
            entries.push(Entry {
                name: file.name().to_string(),
                data,
            });
        }

        Ok(Self { entries })
    }

    /// Read a named entry as UTF-8 text.
    pub fn read_text(&self, path: &str) -> Result<String, RenderError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == path)
            .ok_or_else(|| RenderError::MissingEntry(path.to_string()))?;
        Ok(String::from_utf8(entry.data.clone())?)
    }

    /// Replace (or append) a named entry, leaving all other entries untouched.
    pub fn write_entry(&mut self, path: &str, text: String) {
        match self.entries.iter_mut().find(|e| e.name == path) {
            Some(entry) => entry.data = text.into_bytes(),
            None => self.entries.push(Entry {
                name: path.to_string(),
                data: text.into_bytes(),
            }),
        }
    }

    /// Re-pack the archive. Pure re-serialization: entry order is preserved
    /// and output is deterministic (fixed entry timestamps), so identical
    /// inputs produce byte-identical archives.
    pub fn into_bytes(self) -> Result<Vec<u8>, RenderError> {
        let options = SimpleFileOptions::default().last_modified_time(DateTime::default());
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            writer.start_file(&entry.name, options)?;
            writer.write_all(&entry.data)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_zip() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        writer.start_file("a.xml", options).unwrap();
        writer.write_all(b"<a/>").unwrap();
        writer.start_file("dir/b.bin", options).unwrap();
        writer.write_all(&[0u8, 159, 146, 150]).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_read_and_rewrite_entry() {
        let mut archive = TemplateArchive::open(&small_zip()).unwrap();
        assert_eq!(archive.read_text("a.xml").unwrap(), "<a/>");

        archive.write_entry("a.xml", "<b/>".to_string());
        let bytes = archive.into_bytes().unwrap();

        let reread = TemplateArchive::open(&bytes).unwrap();
        assert_eq!(reread.read_text("a.xml").unwrap(), "<b/>");
    }

    #[test]
    fn test_missing_entry() {
        let archive = TemplateArchive::open(&small_zip()).unwrap();
        assert!(matches!(
            archive.read_text("nope.xml"),
            Err(RenderError::MissingEntry(_))
        ));
    }

    #[test]
    fn test_repack_is_deterministic() {
        let zip = small_zip();
        let first = TemplateArchive::open(&zip).unwrap().into_bytes().unwrap();
        let second = TemplateArchive::open(&zip).unwrap().into_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_binary_entries_survive_repack() {
        let archive = TemplateArchive::open(&small_zip()).unwrap();
        let bytes = archive.into_bytes().unwrap();

        let mut reread = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = reread.by_name("dir/b.bin").unwrap();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        assert_eq!(data, vec![0u8, 159, 146, 150]);
    }
}
