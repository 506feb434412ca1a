//! Content-hashed on-disk snapshot of a [`CorpusIndex`].
//!
//! File layout is two bincode values back to back: a header with the
//! format version and the source hash, then the index itself. Decoding the
//! header first lets a stale cache be rejected without decoding the payload.
//!
//! Reading never fails loudly. A missing, unreadable, corrupt or stale file
//! is logged and reported as a miss so the caller rebuilds from source.
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::CacheError;
use crate::index::CorpusIndex;

/// Bumped whenever the serialized shape of [`CorpusIndex`] changes.
const FORMAT_VERSION: u32 = 2;

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    format_version: u32,
    content_hash: String,
}

/// Index cache stored at a single file path.
#[derive(Debug, Clone)]
pub struct IndexCache {
    path: PathBuf,
}

impl IndexCache {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// `$HOME/.cache/lexicon-lab/index.bin`, or a relative `.cache` directory
    /// when no home directory is set.
    pub fn default_path() -> PathBuf {
        let base = std::env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        base.join(".cache").join("lexicon-lab").join("index.bin")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// SHA-256 hex digest over the raw bytes of every readable source, in
    /// order. Missing sources are skipped.
    pub fn content_hash<P: AsRef<Path>>(sources: &[P]) -> String {
        let mut hasher = Sha256::new();
        for src in sources {
            let src = src.as_ref();
            match fs::read(src) {
                Ok(bytes) => hasher.update(&bytes),
                Err(e) => {
                    tracing::debug!(path = %src.display(), error = %e, "source not hashed");
                }
            }
        }
        hex(&hasher.finalize())
    }

    /// Digest of in-memory source blobs, same scheme as [`Self::content_hash`].
    pub fn content_hash_bytes<I, B>(blobs: I) -> String
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let mut hasher = Sha256::new();
        for blob in blobs {
            hasher.update(blob.as_ref());
        }
        hex(&hasher.finalize())
    }

    /// Load the cached index if it was built from sources hashing to `hash`.
    pub fn load(&self, hash: &str) -> Option<CorpusIndex> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "index cache not found");
            return None;
        }
        match self.try_load(hash) {
            Ok(mut index) => {
                index.rebuild_syllable_trie();
                tracing::info!(
                    path = %self.path.display(),
                    entries = index.len(),
                    "index cache hit"
                );
                Some(index)
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "index cache miss: {e:#}");
                None
            }
        }
    }

    fn try_load(&self, hash: &str) -> anyhow::Result<CorpusIndex> {
        // Decoding from a slice bounds every length prefix by the file size.
        let bytes = fs::read(&self.path).context("read cache file")?;
        let header: Header = bincode::deserialize(&bytes).context("decode header")?;
        if header.format_version != FORMAT_VERSION {
            bail!(
                "format version {} does not match {}",
                header.format_version,
                FORMAT_VERSION
            );
        }
        if header.content_hash != hash {
            bail!("source files have changed");
        }
        let offset = bincode::serialized_size(&header).context("size header")? as usize;
        let index: CorpusIndex =
            bincode::deserialize(&bytes[offset..]).context("decode index")?;
        Ok(index)
    }

    /// Write `index` under `hash`, atomically replacing any previous file.
    pub fn store(&self, hash: &str, index: &CorpusIndex) -> Result<(), CacheError> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|source| CacheError::Io {
            path: parent.to_path_buf(),
            source,
        })?;

        let temp = NamedTempFile::new_in(parent).map_err(|source| CacheError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            let header = Header {
                format_version: FORMAT_VERSION,
                content_hash: hash.to_string(),
            };
            bincode::serialize_into(&mut writer, &header)?;
            bincode::serialize_into(&mut writer, index)?;
            writer.flush().map_err(|source| CacheError::Io {
                path: temp.path().to_path_buf(),
                source,
            })?;
        }
        temp.persist(&self.path).map_err(|e| CacheError::Io {
            path: self.path.clone(),
            source: e.error,
        })?;

        tracing::debug!(path = %self.path.display(), "index cache written");
        Ok(())
    }

    /// Return the cached index for `sources`, or build a fresh one and try
    /// to refresh the cache with it.
    pub fn load_or_build<P, F>(&self, sources: &[P], build: F) -> CorpusIndex
    where
        P: AsRef<Path>,
        F: FnOnce() -> CorpusIndex,
    {
        let hash = Self::content_hash(sources);
        if let Some(index) = self.load(&hash) {
            return index;
        }

        let index = build();
        match self.store(&hash, &index) {
            Ok(()) => tracing::info!(path = %self.path.display(), "index cache refreshed"),
            Err(e) => tracing::warn!(path = %self.path.display(), "failed to write index cache: {e}"),
        }
        index
    }
}

fn hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}
