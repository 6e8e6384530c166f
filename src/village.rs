use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One map cell after text extraction. Only villages that carry an owner,
/// a population and a village id take part in the census.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VillageRecord {
    pub x: i64,
    pub y: i64,
    pub player: Option<String>,
    pub population: Option<u64>,
    pub village_id: Option<i64>,
    pub tile_id: Option<i64>,
    #[serde(default)]
    pub title: String,
}

impl VillageRecord {
    pub fn new(x: i64, y: i64) -> Self {
        Self {
            x,
            y,
            player: None,
            population: None,
            village_id: None,
            tile_id: None,
            title: String::new(),
        }
    }

    pub fn owned_by(mut self, player: impl Into<String>, population: u64) -> Self {
        self.player = Some(player.into());
        self.population = Some(population);
        self
    }

    pub fn with_ids(mut self, village_id: Option<i64>, tile_id: Option<i64>) -> Self {
        self.village_id = village_id;
        self.tile_id = tile_id;
        self
    }

    /// Owner and population of a village that counts toward a player total.
    pub fn usable(&self) -> Option<(&str, u64)> {
        self.village_id?;
        let player = self.player.as_deref()?;
        let population = self.population?;
        Some((player, population))
    }

    pub fn is_usable(&self) -> bool {
        self.usable().is_some()
    }
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read map export {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse map export {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Produces the village list for one run.
pub trait VillageSource {
    fn villages(&self) -> Result<Vec<VillageRecord>, SourceError>;
}

/// Fixed village list, mostly for tests and replays.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<VillageRecord>,
}

impl InMemorySource {
    pub fn new(records: Vec<VillageRecord>) -> Self {
        Self { records }
    }
}

impl VillageSource for InMemorySource {
    fn villages(&self) -> Result<Vec<VillageRecord>, SourceError> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usable_requires_village_id_player_and_population() {
        let full = VillageRecord::new(1, 2)
            .owned_by("Alice", 120)
            .with_ids(Some(7), Some(99));
        assert_eq!(full.usable(), Some(("Alice", 120)));

        let no_village = VillageRecord::new(1, 2)
            .owned_by("Alice", 120)
            .with_ids(None, Some(99));
        assert!(!no_village.is_usable());

        let no_owner = VillageRecord::new(1, 2).with_ids(Some(7), Some(99));
        assert!(!no_owner.is_usable());
    }

    #[test]
    fn tile_id_is_not_required() {
        let record = VillageRecord::new(0, 0)
            .owned_by("Bob", 5)
            .with_ids(Some(1), None);
        assert!(record.is_usable());
    }

    #[test]
    fn zero_population_is_still_usable() {
        let record = VillageRecord::new(0, 0)
            .owned_by("Bob", 0)
            .with_ids(Some(1), Some(1));
        assert_eq!(record.usable(), Some(("Bob", 0)));
    }
}
