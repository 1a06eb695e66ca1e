use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("cache directory missing or not writable: {0}")]
    CacheDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the cache directory exists; create if missing.
pub fn ensure_cache_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::CacheDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::CacheDir(e.to_string()))?;
    }
    Ok(())
}

const TEMP_PREFIX: &str = ".download-";

/// A download being written to a unique temp file in the cache directory.
///
/// Dropping it without [`StagedFile::commit`] deletes the temp file, so a failed
/// or cancelled download never shows up under its final name.
pub struct StagedFile {
    tmp: NamedTempFile,
    written: u64,
}

impl StagedFile {
    pub fn new_in(dir: &Path) -> Result<Self, PersistError> {
        let tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| PersistError::CacheDir(e.to_string()))?;
        Ok(Self { tmp, written: 0 })
    }

    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.tmp.write_all(chunk)?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush, sync and atomically rename into `target`, replacing any previous file.
    pub fn commit(mut self, target: &Path) -> Result<PathBuf, PersistError> {
        self.tmp.flush()?;
        self.tmp.as_file_mut().sync_all()?;
        self.tmp
            .persist(target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target.to_path_buf())
    }
}

/// Removes other files in `target`'s directory that share its stem, e.g. an
/// older `晴天.flac` once `晴天.mp3` is committed. In-flight temp files are left alone.
pub fn prune_siblings(target: &Path) -> Result<usize, PersistError> {
    let (Some(dir), Some(stem), Some(keep)) =
        (target.parent(), target.file_stem(), target.file_name())
    else {
        return Ok(0);
    };
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let name = entry.file_name();
        if name == keep || name.to_string_lossy().starts_with(TEMP_PREFIX) {
            continue;
        }
        if path.file_stem() == Some(stem) && entry.file_type()?.is_file() {
            fs::remove_file(&path)?;
            removed += 1;
        }
    }
    Ok(removed)
}
