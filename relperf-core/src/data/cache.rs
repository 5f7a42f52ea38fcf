//! Directory cache of raw provider documents.
//!
//! Layout: `{dir}/{TICKER}.csv`, holding the provider document byte for byte.
//!
//! Features:
//! - Atomic writes (write to .tmp, rename into place)
//! - Directory created on first write
//! - Ordered, de-duplicated lookup across several directories (`CachePrecedence`)

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to read cached document {path}: {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write cached document {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// One cache directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of the cache.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for a ticker: `{dir}/{TICKER}.csv`
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{ticker}.csv"))
    }

    /// Read the cached document for a ticker, `None` if there is no file.
    pub fn read(&self, ticker: &str) -> Result<Option<String>, CacheError> {
        let path = self.path_for(ticker);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    /// Write a document verbatim, creating the directory if needed.
    pub fn write(&self, ticker: &str, text: &str) -> Result<PathBuf, CacheError> {
        let path = self.path_for(ticker);
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let tmp_path = path.with_extension("csv.tmp");
        fs::write(&tmp_path, text).map_err(|source| CacheError::Write {
            path: tmp_path.clone(),
            source,
        })?;

        fs::rename(&tmp_path, &path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            CacheError::Write {
                path: path.clone(),
                source,
            }
        })?;

        Ok(path)
    }
}

/// Cache directories consulted after a failed live fetch, in priority order.
///
/// Built from the explicit fallback directory followed by the mirror
/// directory; a directory given twice is only consulted once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePrecedence {
    caches: Vec<DocumentCache>,
}

impl CachePrecedence {
    pub fn new(fallback_dir: Option<&Path>, mirror_dir: Option<&Path>) -> Self {
        Self::from_dirs([fallback_dir, mirror_dir].into_iter().flatten())
    }

    /// Keep the first occurrence of each directory, preserving order.
    pub fn from_dirs<'a>(dirs: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut caches: Vec<DocumentCache> = Vec::new();
        for dir in dirs {
            if !caches.iter().any(|c| c.dir() == dir) {
                caches.push(DocumentCache::new(dir));
            }
        }
        Self { caches }
    }

    pub fn dirs(&self) -> impl Iterator<Item = &Path> {
        self.caches.iter().map(|c| c.dir())
    }

    pub fn is_empty(&self) -> bool {
        self.caches.is_empty()
    }

    /// First cached document for the ticker, with the path it was read from.
    pub fn lookup(&self, ticker: &str) -> Result<Option<(PathBuf, String)>, CacheError> {
        for cache in &self.caches {
            if let Some(text) = cache.read(ticker)? {
                return Ok(Some((cache.path_for(ticker), text)));
            }
        }
        Ok(None)
    }
}
