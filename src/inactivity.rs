//! Non-growth streak detection over the snapshot history.
//!
//! Each player's snapshots are folded in time order through [`StreakState`].
//! Only the trailing streak survives the fold: any strict population increase
//! resets the count and moves `last_active` forward. Decreases and
//! stagnation are both counted as non-growth.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::snapshot::{History, PlayerSnapshot};
use crate::stamp::RunStamp;

/// Streak length at which a player is reported.
pub const DEFAULT_MIN_INACTIVE_DAYS: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InactivityRecord {
    pub player: String,
    pub inactive_days: u32,
    pub last_active: RunStamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakState {
    pub prev_population: Option<u64>,
    pub inactive_days: u32,
    pub last_active: Option<RunStamp>,
}

impl StreakState {
    pub fn step(self, snapshot: &PlayerSnapshot) -> Self {
        match self.prev_population {
            None => Self {
                prev_population: Some(snapshot.population),
                inactive_days: self.inactive_days,
                last_active: Some(snapshot.timestamp),
            },
            Some(prev) if snapshot.population > prev => Self {
                prev_population: Some(snapshot.population),
                inactive_days: 0,
                last_active: Some(snapshot.timestamp),
            },
            Some(_) => Self {
                prev_population: Some(snapshot.population),
                inactive_days: self.inactive_days + 1,
                last_active: self.last_active,
            },
        }
    }

    /// Folds a time-ordered snapshot sequence.
    pub fn walk<'a>(snapshots: impl IntoIterator<Item = &'a PlayerSnapshot>) -> Self {
        snapshots
            .into_iter()
            .fold(Self::default(), |state, snapshot| state.step(snapshot))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InactivityDetector {
    min_inactive_days: u32,
}

impl Default for InactivityDetector {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INACTIVE_DAYS)
    }
}

impl InactivityDetector {
    pub fn new(min_inactive_days: u32) -> Self {
        Self { min_inactive_days }
    }

    /// Current streak of every player in `history`, in first-appearance order.
    pub fn streaks(&self, history: &History) -> Vec<(String, StreakState)> {
        let players = history.players();
        let mut per_player: HashMap<&str, Vec<&PlayerSnapshot>> = HashMap::new();
        for snapshot in history.snapshots() {
            per_player
                .entry(snapshot.player.as_str())
                .or_default()
                .push(snapshot);
        }

        players
            .into_iter()
            .map(|player| {
                let mut snapshots = per_player.remove(player).unwrap_or_default();
                snapshots.sort_by_key(|snapshot| snapshot.timestamp);
                (player.to_string(), StreakState::walk(snapshots))
            })
            .collect()
    }

    /// Players whose trailing streak reaches the threshold, longest first.
    pub fn detect(&self, history: &History) -> Vec<InactivityRecord> {
        let streaks = self.streaks(history);
        let players = streaks.len();
        let mut flagged: Vec<InactivityRecord> = streaks
            .into_iter()
            .filter(|(_, state)| state.inactive_days >= self.min_inactive_days)
            .filter_map(|(player, state)| {
                state.last_active.map(|last_active| InactivityRecord {
                    player,
                    inactive_days: state.inactive_days,
                    last_active,
                })
            })
            .collect();
        flagged.sort_by(|a, b| b.inactive_days.cmp(&a.inactive_days));
        debug!(
            players,
            flagged = flagged.len(),
            threshold = self.min_inactive_days,
            "inactivity scan finished"
        );
        flagged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(day: u32) -> RunStamp {
        RunStamp::parse(&format!("202503{day:02}_080000")).unwrap()
    }

    fn series(player: &str, populations: &[u64]) -> Vec<PlayerSnapshot> {
        populations
            .iter()
            .enumerate()
            .map(|(i, pop)| PlayerSnapshot::new(player, *pop, t(i as u32 + 1)))
            .collect()
    }

    fn walk(player: &str, populations: &[u64]) -> StreakState {
        StreakState::walk(&series(player, populations))
    }

    #[test]
    fn first_snapshot_sets_last_active_only() {
        let state = StreakState::default().step(&PlayerSnapshot::new("A", 50, t(1)));
        assert_eq!(state.inactive_days, 0);
        assert_eq!(state.last_active, Some(t(1)));
        assert_eq!(state.prev_population, Some(50));
    }

    #[test]
    fn growth_resets_and_moves_last_active() {
        let state = StreakState {
            prev_population: Some(50),
            inactive_days: 3,
            last_active: Some(t(1)),
        }
        .step(&PlayerSnapshot::new("A", 51, t(5)));
        assert_eq!(state.inactive_days, 0);
        assert_eq!(state.last_active, Some(t(5)));
    }

    #[test]
    fn non_growth_counts_and_keeps_last_active() {
        let start = StreakState {
            prev_population: Some(50),
            inactive_days: 1,
            last_active: Some(t(1)),
        };
        for population in [50, 10] {
            let state = start.step(&PlayerSnapshot::new("A", population, t(3)));
            assert_eq!(state.inactive_days, 2);
            assert_eq!(state.last_active, Some(t(1)));
            assert_eq!(state.prev_population, Some(population));
        }
    }

    #[test]
    fn flat_population_is_flagged() {
        let state = walk("Alice", &[100, 100, 100]);
        assert_eq!(state.inactive_days, 2);
        assert_eq!(state.last_active, Some(t(1)));
    }

    #[test]
    fn single_stagnation_after_growth_is_not_enough() {
        let state = walk("Bob", &[100, 150, 150]);
        assert_eq!(state.inactive_days, 1);
        assert_eq!(state.last_active, Some(t(2)));
    }

    #[test]
    fn single_snapshot_never_counts() {
        let state = walk("Carol", &[200]);
        assert_eq!(state.inactive_days, 0);
        assert_eq!(state.last_active, Some(t(1)));
    }

    #[test]
    fn decreases_count_as_non_growth() {
        let state = walk("Dave", &[100, 90, 85]);
        assert_eq!(state.inactive_days, 2);
        assert_eq!(state.last_active, Some(t(1)));
    }

    #[test]
    fn only_the_trailing_streak_matters() {
        let snapshots = series("Eve", &[100, 50, 200, 200]);
        let after_growth = StreakState::walk(&snapshots[..3]);
        assert_eq!(after_growth.inactive_days, 0);
        let state = StreakState::walk(&snapshots);
        assert_eq!(state.inactive_days, 1);
        assert_eq!(state.last_active, Some(t(3)));
    }

    #[test]
    fn detect_reports_only_players_at_threshold() {
        let history = History::merge(vec![
            series("Alice", &[100, 100, 100]),
            series("Bob", &[100, 150, 150]),
            series("Carol", &[200]),
            series("Dave", &[100, 90, 85]),
            series("Eve", &[100, 50, 200, 200]),
        ]);
        let flagged = InactivityDetector::default().detect(&history);
        let names: Vec<_> = flagged.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Dave"]);
        assert!(flagged.iter().all(|r| r.inactive_days == 2));
        assert!(flagged.iter().all(|r| r.last_active == t(1)));
    }

    #[test]
    fn detect_sorts_longest_streak_first_and_keeps_ties_stable() {
        let history = History::merge(vec![
            series("Short", &[5, 5, 5]),
            series("Long", &[9, 9, 9, 9, 9]),
            series("AlsoShort", &[7, 6, 6]),
        ]);
        let flagged = InactivityDetector::default().detect(&history);
        let order: Vec<_> = flagged
            .iter()
            .map(|r| (r.player.as_str(), r.inactive_days))
            .collect();
        assert_eq!(order, vec![("Long", 4), ("Short", 2), ("AlsoShort", 2)]);
    }

    #[test]
    fn history_order_does_not_matter_within_a_player() {
        let mut snapshots = series("Alice", &[100, 120, 120, 120]);
        snapshots.reverse();
        let history = History::merge(vec![snapshots]);
        let flagged = InactivityDetector::default().detect(&history);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].inactive_days, 2);
        assert_eq!(flagged[0].last_active, t(2));
    }

    #[test]
    fn missing_runs_are_not_synthesised() {
        let history = History::merge(vec![
            vec![PlayerSnapshot::new("Gone", 40, t(1))],
            vec![PlayerSnapshot::new("Gone", 40, t(2))],
            vec![PlayerSnapshot::new("Other", 1, t(3))],
        ]);
        let streaks = InactivityDetector::default().streaks(&history);
        assert_eq!(streaks[0].0, "Gone");
        assert_eq!(streaks[0].1.inactive_days, 1);
    }

    #[test]
    fn duplicate_batches_are_not_deduplicated() {
        let batch = series("Alice", &[100, 100]);
        let history = History::merge(vec![batch.clone(), batch]);
        let streaks = InactivityDetector::default().streaks(&history);
        // Four snapshots, three non-growth steps.
        assert_eq!(streaks[0].1.inactive_days, 3);
    }

    #[test]
    fn custom_threshold() {
        let history = History::merge(vec![series("Bob", &[100, 150, 150])]);
        assert_eq!(InactivityDetector::new(1).detect(&history).len(), 1);
        assert!(InactivityDetector::new(3)
            .detect(&History::merge(vec![series("Alice", &[1, 1, 1])]))
            .is_empty());
    }
}
