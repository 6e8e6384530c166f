use std::collections::BTreeMap;

use tracing::warn;

use crate::snapshot::PlayerSnapshot;
use crate::stamp::RunStamp;
use crate::village::VillageRecord;

/// Per-player population totals for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerTotals {
    totals: BTreeMap<String, u64>,
    villages_usable: usize,
}

impl PlayerTotals {
    /// Sums population per player over usable villages; the rest are dropped.
    /// A total that would exceed `u64::MAX` saturates there.
    pub fn aggregate(villages: &[VillageRecord]) -> Self {
        let mut totals = BTreeMap::new();
        let mut villages_usable = 0;
        for (player, population) in villages.iter().filter_map(VillageRecord::usable) {
            let total = totals.entry(player.to_string()).or_insert(0_u64);
            *total = total.checked_add(population).unwrap_or_else(|| {
                warn!(player, "population total saturated at u64::MAX");
                u64::MAX
            });
            villages_usable += 1;
        }
        Self {
            totals,
            villages_usable,
        }
    }

    pub fn get(&self, player: &str) -> Option<u64> {
        self.totals.get(player).copied()
    }

    pub fn players(&self) -> usize {
        self.totals.len()
    }

    pub fn villages_usable(&self) -> usize {
        self.villages_usable
    }

    pub fn total_population(&self) -> u64 {
        self.totals
            .values()
            .fold(0_u64, |sum, population| sum.saturating_add(*population))
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// One snapshot per player, ordered by player name.
    pub fn snapshots(&self, stamp: RunStamp) -> Vec<PlayerSnapshot> {
        self.totals
            .iter()
            .map(|(player, population)| PlayerSnapshot::new(player.clone(), *population, stamp))
            .collect()
    }
}
