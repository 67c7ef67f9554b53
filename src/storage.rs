//! Backing file for the joke collection
//!
//! The whole collection is stored as one pretty-printed JSON array and
//! rewritten in full on every save.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::store::Joke;

/// Errors raised while reading or writing the backing file
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize jokes: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write '{path}': {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// JSON file holding the ordered joke list
#[derive(Debug, Clone)]
pub struct JokeFile {
    path: PathBuf,
}

impl JokeFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored jokes, `Ok(None)` if the file does not exist yet
    pub fn load(&self) -> Result<Option<Vec<Joke>>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StorageError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let jokes = serde_json::from_str(&raw).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(jokes))
    }

    /// Overwrite the file with `jokes`.
    ///
    /// The content goes to a sibling temp file first and is renamed over the
    /// target, so readers only ever see a complete document.
    pub fn save(&self, jokes: &[Joke]) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(jokes).map_err(StorageError::Serialize)?;

        let tmp = self.tmp_path();
        let written = write_file(&tmp, &data).and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(source) = written {
            // the temp file may not exist if creating it was what failed
            let _ = fs::remove_file(&tmp);
            return Err(StorageError::Write {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "jokes.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}
