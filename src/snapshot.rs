use serde::{Deserialize, Serialize};

use crate::stamp::RunStamp;

/// Total population of one player at one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player: String,
    pub population: u64,
    pub timestamp: RunStamp,
}

impl PlayerSnapshot {
    pub fn new(player: impl Into<String>, population: u64, timestamp: RunStamp) -> Self {
        Self {
            player: player.into(),
            population,
            timestamp,
        }
    }
}

/// Every snapshot produced so far, in discovery order.
///
/// History is a plain concatenation of run batches. It is never deduplicated
/// and never reordered; time ordering is applied per player by the detector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    snapshots: Vec<PlayerSnapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge<I, B>(batches: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: IntoIterator<Item = PlayerSnapshot>,
    {
        let mut history = Self::new();
        for batch in batches {
            history.extend(batch);
        }
        history
    }

    pub fn extend(&mut self, batch: impl IntoIterator<Item = PlayerSnapshot>) {
        self.snapshots.extend(batch);
    }

    pub fn snapshots(&self) -> &[PlayerSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Distinct players in order of first appearance.
    pub fn players(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.snapshots
            .iter()
            .map(|snapshot| snapshot.player.as_str())
            .filter(|player| seen.insert(*player))
            .collect()
    }

    /// True when every snapshot of `earlier` is still present, unchanged and
    /// in the same position.
    pub fn extends(&self, earlier: &History) -> bool {
        self.snapshots.starts_with(&earlier.snapshots)
    }
}

impl IntoIterator for History {
    type Item = PlayerSnapshot;
    type IntoIter = std::vec::IntoIter<PlayerSnapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.into_iter()
    }
}
