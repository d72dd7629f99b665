//! Per-round raw scores and the rank points derived from them.

use std::collections::HashMap;

use minima_protocol::PlayerId;

/// Raw scores and rank points, one row per player and one column per round.
///
/// Lower raw scores are better. After a game ends the totals are frozen
/// into a read-only snapshot that survives until the next game starts.
#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    /// Row order; also the tie-break order when ranking.
    roster: Vec<PlayerId>,
    rounds: usize,
    scores: HashMap<PlayerId, Vec<Option<f64>>>,
    points: HashMap<PlayerId, Vec<u32>>,
    frozen: Option<Vec<(PlayerId, u32)>>,
}

impl Leaderboard {
    pub fn new(roster: &[PlayerId], rounds: usize) -> Self {
        let mut board = Self::default();
        board.allocate(roster, rounds);
        board
    }

    fn allocate(&mut self, roster: &[PlayerId], rounds: usize) {
        self.roster = roster.to_vec();
        self.rounds = rounds;
        self.scores = roster.iter().map(|&p| (p, vec![None; rounds])).collect();
        self.points = roster.iter().map(|&p| (p, vec![0; rounds])).collect();
    }

    /// Sets a raw score cell if it is still empty.
    ///
    /// Returns `false` when the cell was already set or does not exist.
    pub fn record_score(&mut self, player: PlayerId, round: usize, score: f64) -> bool {
        match self.scores.get_mut(&player).and_then(|row| row.get_mut(round)) {
            Some(cell) if cell.is_none() => {
                *cell = Some(score);
                true
            }
            _ => false,
        }
    }

    pub fn score(&self, player: PlayerId, round: usize) -> Option<f64> {
        self.scores.get(&player)?.get(round).copied().flatten()
    }

    pub fn points(&self, player: PlayerId, round: usize) -> Option<u32> {
        self.points.get(&player)?.get(round).copied()
    }

    /// Ranks the roster for `round` and stores each player's points.
    ///
    /// Ascending by raw score with ties in roster order; players with no
    /// score rank last. Rank `r` (0 = best) earns `N - r`, so one round
    /// hands out exactly `1..=N`.
    pub fn compute_round_points(&mut self, round: usize) -> Vec<(PlayerId, u32)> {
        if round >= self.rounds {
            return Vec::new();
        }
        let mut ranked: Vec<(PlayerId, Option<f64>)> = self
            .roster
            .iter()
            .map(|&p| (p, self.score(p, round)))
            .collect();
        ranked.sort_by(|(_, a), (_, b)| match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let n = ranked.len() as u32;
        let awarded: Vec<(PlayerId, u32)> = ranked
            .into_iter()
            .enumerate()
            .map(|(rank, (player, _))| (player, n - rank as u32))
            .collect();

        for &(player, pts) in &awarded {
            if let Some(cell) = self.points.get_mut(&player).and_then(|row| row.get_mut(round)) {
                *cell = pts;
            }
        }
        tracing::debug!(round, ?awarded, "round points computed");
        awarded
    }

    pub fn total(&self, player: PlayerId) -> u32 {
        self.points.get(&player).map_or(0, |row| row.iter().sum())
    }

    /// Live cumulative totals in roster order.
    pub fn totals(&self) -> Vec<(PlayerId, u32)> {
        self.roster.iter().map(|&p| (p, self.total(p))).collect()
    }

    /// Snapshots the current totals. No-op if already frozen.
    pub fn freeze(&mut self) {
        if self.frozen.is_none() {
            self.frozen = Some(self.totals());
        }
    }

    /// Reallocates both grids for a new game and drops the snapshot.
    pub fn unfreeze(&mut self, roster: &[PlayerId], rounds: usize) {
        self.frozen = None;
        self.allocate(roster, rounds);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn frozen_snapshot(&self) -> Option<&[(PlayerId, u32)]> {
        self.frozen.as_deref()
    }

    /// Deletes a player's rows without touching anyone else's.
    pub fn remove_player(&mut self, player: PlayerId) {
        self.roster.retain(|&p| p != player);
        self.scores.remove(&player);
        self.points.remove(&player);
    }

    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }
}
