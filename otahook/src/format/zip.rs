// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Minimal per-entry access to target-files and OTA zips. The hooks only ever
//! need to fetch one entry by name from an input archive and add one entry to
//! the output archive, so that is all these traits expose.

use std::io::{self, Read, Seek, Write};

use thiserror::Error;
use zip::{
    CompressionMethod, ZipArchive, ZipWriter,
    result::ZipError,
    write::SimpleFileOptions,
};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Missing entry in zip: {0}")]
    MissingEntry(String),
    #[error("Entry is not valid UTF-8: {0}")]
    NotUtf8(String),
    #[error("Zip error")]
    Zip(#[from] ZipError),
    #[error("I/O error")]
    Io(#[from] io::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Read access to individual entries of an archive.
pub trait EntryReader {
    /// Open the entry named `name` for reading. The entry is decompressed on
    /// the fly.
    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>>;

    /// Read the entire contents of an entry into memory.
    fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut reader = self.open_entry(name)?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;

        Ok(buf)
    }

    /// Read an entry that is expected to contain UTF-8 text.
    fn read_entry_string(&mut self, name: &str) -> Result<String> {
        let data = self.read_entry(name)?;

        String::from_utf8(data).map_err(|_| Error::NotUtf8(name.to_owned()))
    }
}

impl<R: Read + Seek> EntryReader for ZipArchive<R> {
    fn open_entry(&mut self, name: &str) -> Result<Box<dyn Read + '_>> {
        match self.by_name(name) {
            Ok(entry) => Ok(Box::new(entry)),
            Err(ZipError::FileNotFound) => Err(Error::MissingEntry(name.to_owned())),
            Err(e) => Err(e.into()),
        }
    }
}

/// Write access to an archive. After [`Self::start_entry`] returns, all data
/// written via [`Write`] goes into the new entry until the next entry is
/// started or the archive is finalized.
pub trait EntryWriter: Write {
    fn start_entry(&mut self, name: &str) -> Result<()>;

    /// Add an entry with the given contents.
    fn write_entry(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.start_entry(name)?;
        self.write_all(data)?;

        Ok(())
    }
}

impl<W: Write + Seek> EntryWriter for ZipWriter<W> {
    fn start_entry(&mut self, name: &str) -> Result<()> {
        // Images are already compressed or are tiny enough that it doesn't
        // matter. Storing them also keeps them mmap-able by the updater.
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        self.start_file(name, options)?;

        Ok(())
    }
}

/// Join an archive directory prefix and an entry name. Zip paths always use
/// `/` regardless of the host platform.
pub fn entry_path(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');

    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use super::*;

    fn build_zip(entries: &[(&str, &[u8])]) -> ZipArchive<Cursor<Vec<u8>>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, data) in entries {
            writer.write_entry(name, data).unwrap();
        }

        let raw = writer.finish().unwrap();

        ZipArchive::new(raw).unwrap()
    }

    #[test]
    fn read_existing_entry() {
        let mut archive = build_zip(&[("IMAGES/vbmeta.img", b"\x00AVB0\xff")]);

        assert_eq!(
            archive.read_entry("IMAGES/vbmeta.img").unwrap(),
            b"\x00AVB0\xff",
        );
    }

    #[test]
    fn read_missing_entry() {
        let mut archive = build_zip(&[("OTA/android-info.txt", b"board=msmnile\n")]);

        assert_matches!(
            archive.read_entry("IMAGES/vbmeta.img"),
            Err(Error::MissingEntry(n)) if n == "IMAGES/vbmeta.img"
        );
    }

    #[test]
    fn read_non_utf8_entry() {
        let mut archive = build_zip(&[("OTA/android-info.txt", b"\xff\xfe")]);

        assert_matches!(
            archive.read_entry_string("OTA/android-info.txt"),
            Err(Error::NotUtf8(_))
        );
    }

    #[test]
    fn join_entry_path() {
        assert_eq!(entry_path("IMAGES", "vbmeta.img"), "IMAGES/vbmeta.img");
        assert_eq!(entry_path("IMAGES/", "vbmeta.img"), "IMAGES/vbmeta.img");
        assert_eq!(entry_path("", "vbmeta.img"), "vbmeta.img");
    }
}
