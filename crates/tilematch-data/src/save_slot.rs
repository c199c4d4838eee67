//! File-backed storage for snapshot records.
//!
//! A [`SaveSlot`] owns one file. Writes replace it whole: the record is
//! written to a temporary sibling and renamed over the slot, so a reader sees
//! either the old record or the new one, never a mix.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tilematch_core::snapshot::{CodecError, SnapshotRecord};

/// Errors from reading or writing a save slot.
#[derive(Debug, thiserror::Error)]
pub enum SaveSlotError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("save data is corrupt: {0}")]
    Codec(#[from] CodecError),
}

/// On-disk encoding of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    /// Human-readable JSON.
    Json,
    /// Compact bitcode with a magic-number header.
    Binary,
}

impl SaveFormat {
    /// Pick a format from the file extension: `.json` is JSON, anything
    /// else is binary.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => SaveFormat::Json,
            _ => SaveFormat::Binary,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SaveSlot {
    path: PathBuf,
    format: SaveFormat,
}

impl SaveSlot {
    pub fn new(path: impl Into<PathBuf>, format: SaveFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    /// A slot whose format follows the file extension.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = SaveFormat::from_path(&path);
        Self { path, format }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> SaveFormat {
        self.format
    }

    pub fn has_save(&self) -> bool {
        self.path.is_file()
    }

    /// Encode `record` and replace the slot's contents with it.
    pub fn write(&self, record: &SnapshotRecord) -> Result<(), SaveSlotError> {
        let bytes = match self.format {
            SaveFormat::Json => record.to_json()?.into_bytes(),
            SaveFormat::Binary => record.to_bytes()?,
        };

        let tmp = self.temp_path();
        if let Err(e) = fs::write(&tmp, &bytes).and_then(|()| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        log::debug!(
            "wrote {} byte save to {}",
            bytes.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Read and decode the slot. An absent file is `Ok(None)`.
    ///
    /// The record is only decoded here; `Game::load` validates it against
    /// the layout table.
    pub fn read(&self) -> Result<Option<SnapshotRecord>, SaveSlotError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record = match self.format {
            SaveFormat::Json => {
                let text = String::from_utf8(bytes)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
                SnapshotRecord::from_json(&text)?
            }
            SaveFormat::Binary => SnapshotRecord::from_bytes(&bytes)?,
        };
        Ok(Some(record))
    }

    /// Like [`read`](Self::read), but any failure is logged and treated as
    /// no save.
    pub fn read_or_none(&self) -> Option<SnapshotRecord> {
        match self.read() {
            Ok(record) => record,
            Err(e) => {
                log::warn!("ignoring save at {}: {e}", self.path.display());
                None
            }
        }
    }

    /// Remove the slot's file. Returns whether a file was removed.
    pub fn delete(&self) -> Result<bool, SaveSlotError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
