//! Persistence of per-run player snapshots.
//!
//! The file-backed store writes one `player_stats_<stamp>.csv` per run and
//! rebuilds the whole history by scanning the directory. A file that cannot
//! be read back aborts the scan: a partial history would silently skew the
//! streak computation.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::snapshot::{History, PlayerSnapshot};
use crate::stamp::RunStamp;

pub const SNAPSHOT_PREFIX: &str = "player_stats_";
pub const SNAPSHOT_EXTENSION: &str = "csv";

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("failed to access history directory {path}")]
    Dir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write snapshot {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("corrupt snapshot {path}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("corrupt snapshot {path}, row {row}: {reason}")]
    Schema {
        path: PathBuf,
        row: usize,
        reason: String,
    },
    #[error("snapshot batch mixes run stamps {first} and {other}")]
    MixedBatch { first: RunStamp, other: RunStamp },
}

/// Append-only store of run batches.
pub trait HistoryStore {
    /// Persists one run's snapshots. All entries share the run stamp.
    fn append(&mut self, batch: &[PlayerSnapshot]) -> Result<(), HistoryError>;

    /// Every snapshot persisted so far.
    fn read_all(&self) -> Result<History, HistoryError>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    batches: Vec<Vec<PlayerSnapshot>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> usize {
        self.batches.len()
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&mut self, batch: &[PlayerSnapshot]) -> Result<(), HistoryError> {
        batch_stamp(batch)?;
        self.batches.push(batch.to_vec());
        Ok(())
    }

    fn read_all(&self) -> Result<History, HistoryError> {
        Ok(History::merge(self.batches.iter().cloned()))
    }
}

/// Directory of per-run CSV files.
#[derive(Debug, Clone)]
pub struct CsvHistoryDir {
    dir: PathBuf,
}

impl CsvHistoryDir {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn snapshot_path(&self, stamp: RunStamp) -> PathBuf {
        self.dir
            .join(format!("{SNAPSHOT_PREFIX}{stamp}.{SNAPSHOT_EXTENSION}"))
    }

    /// Snapshot files in lexicographic (and so chronological) order.
    pub fn list_snapshots(&self) -> Result<Vec<PathBuf>, HistoryError> {
        let dir_error = |source: std::io::Error| HistoryError::Dir {
            path: self.dir.clone(),
            source,
        };
        let mut files = Vec::new();
        if !self.dir.exists() {
            return Ok(files);
        }
        for entry in fs::read_dir(&self.dir).map_err(dir_error)? {
            let path = entry.map_err(dir_error)?.path();
            if path.is_file() && is_snapshot_file(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }

    fn read_file(path: &Path) -> Result<Vec<PlayerSnapshot>, HistoryError> {
        let corrupt = |source: csv::Error| HistoryError::Corrupt {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::Reader::from_path(path).map_err(corrupt)?;
        let headers = reader.headers().map_err(corrupt)?.clone();
        if headers.iter().collect::<Vec<_>>() != ["player", "population", "timestamp"] {
            return Err(HistoryError::Schema {
                path: path.to_path_buf(),
                row: 0,
                reason: format!("unexpected header {:?}", headers.iter().collect::<Vec<_>>()),
            });
        }

        let mut snapshots = Vec::new();
        for (index, row) in reader.deserialize::<PlayerSnapshot>().enumerate() {
            let snapshot = row.map_err(corrupt)?;
            if snapshot.player.is_empty() {
                return Err(HistoryError::Schema {
                    path: path.to_path_buf(),
                    row: index + 1,
                    reason: "empty player name".to_string(),
                });
            }
            snapshots.push(snapshot);
        }
        Ok(snapshots)
    }
}

impl HistoryStore for CsvHistoryDir {
    fn append(&mut self, batch: &[PlayerSnapshot]) -> Result<(), HistoryError> {
        let Some(stamp) = batch_stamp(batch)? else {
            debug!("empty snapshot batch, nothing persisted");
            return Ok(());
        };
        fs::create_dir_all(&self.dir).map_err(|source| HistoryError::Dir {
            path: self.dir.clone(),
            source,
        })?;

        let path = self.snapshot_path(stamp);
        let write_error = |source: csv::Error| HistoryError::Write {
            path: path.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&path).map_err(write_error)?;
        for snapshot in batch {
            writer.serialize(snapshot).map_err(write_error)?;
        }
        writer
            .flush()
            .map_err(|err| write_error(csv::Error::from(err)))?;
        info!(path = %path.display(), players = batch.len(), "player snapshot saved");
        Ok(())
    }

    fn read_all(&self) -> Result<History, HistoryError> {
        let files = self.list_snapshots()?;
        let mut history = History::new();
        for path in &files {
            history.extend(Self::read_file(path)?);
        }
        debug!(
            files = files.len(),
            rows = history.len(),
            "history rebuilt from snapshot files"
        );
        Ok(history)
    }
}

fn is_snapshot_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|name| name.to_str());
    let extension = path.extension().and_then(|ext| ext.to_str());
    matches!(name, Some(name) if name.starts_with(SNAPSHOT_PREFIX))
        && extension == Some(SNAPSHOT_EXTENSION)
}

/// The single stamp shared by a batch, or `None` for an empty batch.
fn batch_stamp(batch: &[PlayerSnapshot]) -> Result<Option<RunStamp>, HistoryError> {
    let Some(first) = batch.first().map(|snapshot| snapshot.timestamp) else {
        return Ok(None);
    };
    if let Some(other) = batch
        .iter()
        .map(|snapshot| snapshot.timestamp)
        .find(|stamp| *stamp != first)
    {
        return Err(HistoryError::MixedBatch { first, other });
    }
    Ok(Some(first))
}
