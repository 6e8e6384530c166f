use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::aggregate::PlayerTotals;
use crate::history::{HistoryError, HistoryStore};
use crate::inactivity::{InactivityDetector, InactivityRecord, DEFAULT_MIN_INACTIVE_DAYS};
use crate::report::{ReportError, ReportOutcome, ReportWriter, DEFAULT_PREVIEW_ROWS};
use crate::stamp::RunStamp;
use crate::village::{SourceError, VillageSource};

#[derive(Debug, Error)]
pub enum CensusError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

#[derive(Debug, Clone)]
pub struct CensusSettings {
    pub stamp: RunStamp,
    pub report_path: PathBuf,
    pub min_inactive_days: u32,
    pub preview_rows: usize,
}

impl CensusSettings {
    pub fn new(stamp: RunStamp, report_path: impl Into<PathBuf>) -> Self {
        Self {
            stamp,
            report_path: report_path.into(),
            min_inactive_days: DEFAULT_MIN_INACTIVE_DAYS,
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

pub struct CensusBuilder<S, H> {
    settings: CensusSettings,
    source: S,
    history: H,
}

impl<S: VillageSource, H: HistoryStore> CensusBuilder<S, H> {
    pub fn new(settings: CensusSettings, source: S, history: H) -> Self {
        Self {
            settings,
            source,
            history,
        }
    }

    pub fn with_min_inactive_days(mut self, days: u32) -> Self {
        self.settings.min_inactive_days = days;
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.settings.preview_rows = rows;
        self
    }

    pub fn build(self) -> Census<S, H> {
        Census {
            detector: InactivityDetector::new(self.settings.min_inactive_days),
            report: ReportWriter::new(&self.settings.report_path)
                .with_preview_rows(self.settings.preview_rows),
            source: self.source,
            history: self.history,
            settings: self.settings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stamp: RunStamp,
    pub villages_total: usize,
    pub villages_usable: usize,
    pub players: usize,
    pub history_rows: usize,
    pub inactive: Vec<InactivityRecord>,
    pub outcome: ReportOutcome,
}

/// One census pass: villages in, snapshot appended, inactivity report out.
pub struct Census<S, H> {
    settings: CensusSettings,
    source: S,
    history: H,
    detector: InactivityDetector,
    report: ReportWriter,
}

impl<S: VillageSource, H: HistoryStore> Census<S, H> {
    pub fn run(&mut self) -> Result<RunSummary, CensusError> {
        let stamp = self.settings.stamp;
        let villages = self.source.villages()?;
        let totals = PlayerTotals::aggregate(&villages);
        info!(
            %stamp,
            villages = villages.len(),
            usable = totals.villages_usable(),
            players = totals.players(),
            "villages aggregated"
        );

        self.history.append(&totals.snapshots(stamp))?;
        let history = self.history.read_all()?;
        let inactive = self.detector.detect(&history);
        let outcome = self.report.write(&inactive)?;

        Ok(RunSummary {
            stamp,
            villages_total: villages.len(),
            villages_usable: totals.villages_usable(),
            players: totals.players(),
            history_rows: history.len(),
            inactive,
            outcome,
        })
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn settings(&self) -> &CensusSettings {
        &self.settings
    }
}
