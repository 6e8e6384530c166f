use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};

use crate::inactivity::InactivityRecord;

pub const DEFAULT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Error)]
#[error("failed to write inactivity report {path}")]
pub struct ReportError {
    pub path: PathBuf,
    #[source]
    pub source: csv::Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Written { path: PathBuf, rows: usize },
    NothingToReport,
}

impl ReportOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, ReportOutcome::Written { .. })
    }
}

/// Writes the inactivity list, replacing any previous report.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    path: PathBuf,
    preview_rows: usize,
}

impl ReportWriter {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// With no flagged players nothing is written and an earlier report is
    /// left in place.
    pub fn write(&self, records: &[InactivityRecord]) -> Result<ReportOutcome, ReportError> {
        if records.is_empty() {
            info!("no inactive players yet");
            if self.path.exists() {
                warn!(
                    path = %self.path.display(),
                    "earlier inactivity report left in place"
                );
            }
            return Ok(ReportOutcome::NothingToReport);
        }

        let report_error = |source: csv::Error| ReportError {
            path: self.path.clone(),
            source,
        };
        let mut writer = csv::Writer::from_path(&self.path).map_err(report_error)?;
        for record in records {
            writer.serialize(record).map_err(report_error)?;
        }
        writer
            .flush()
            .map_err(|err| report_error(csv::Error::from(err)))?;

        info!(
            path = %self.path.display(),
            rows = records.len(),
            "inactive player report updated"
        );
        for record in records.iter().take(self.preview_rows) {
            info!(
                player = %record.player,
                inactive_days = record.inactive_days,
                last_active = %record.last_active,
                "inactive"
            );
        }

        Ok(ReportOutcome::Written {
            path: self.path.clone(),
            rows: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::stamp::RunStamp;

    fn record(player: &str, days: u32) -> InactivityRecord {
        InactivityRecord {
            player: player.to_string(),
            inactive_days: days,
            last_active: RunStamp::parse("20250301_080000").unwrap(),
        }
    }

    #[test]
    fn writes_report_columns_in_given_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inactive_players.csv");
        let outcome = ReportWriter::new(&path)
            .write(&[record("Long", 4), record("Short", 2)])
            .unwrap();
        assert_eq!(
            outcome,
            ReportOutcome::Written {
                path: path.clone(),
                rows: 2
            }
        );
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "player,inactive_days,last_active\n\
             Long,4,20250301_080000\n\
             Short,2,20250301_080000\n"
        );
    }

    #[test]
    fn overwrites_previous_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inactive_players.csv");
        let writer = ReportWriter::new(&path);
        writer
            .write(&[record("A", 5), record("B", 3), record("C", 2)])
            .unwrap();
        writer.write(&[record("D", 2)]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("D,2,"));
    }

    #[test]
    fn empty_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inactive_players.csv");
        let outcome = ReportWriter::new(&path).with_preview_rows(0).write(&[]).unwrap();
        assert_eq!(outcome, ReportOutcome::NothingToReport);
        assert!(!path.exists());
    }

    #[test]
    fn empty_list_leaves_earlier_report_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("inactive_players.csv");
        let writer = ReportWriter::new(&path);
        writer.write(&[record("Alice", 2)]).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        assert_eq!(writer.write(&[]).unwrap(), ReportOutcome::NothingToReport);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn unwritable_location_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("inactive_players.csv");
        let err = ReportWriter::new(&path).write(&[record("A", 2)]).unwrap_err();
        assert_eq!(err.path, path);
    }
}
