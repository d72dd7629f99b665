//! The game session: roster, rounds, submissions.
//!
//! Every transition is synchronous and returns the messages it produced.
//! Nothing here touches a socket, so the caller can run a transition under
//! a lock and deliver afterwards.

use std::collections::HashMap;

use minima_landscape::{FunctionGenerator, HiddenFunction, Minimum, Point, SeedRng};
use minima_protocol::{Outbound, PlayerId, RevealEntry, ServerMessage};
use serde::Serialize;

use crate::{GameError, GamePhase, GameSettings, Leaderboard};

/// One roster member as the operator sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub submitted: bool,
}

/// One line of the standings table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub player_id: PlayerId,
    pub name: String,
    pub total: u32,
}

/// Live totals while a game runs, the frozen snapshot after it ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standings {
    pub frozen: bool,
    /// Highest total first.
    pub entries: Vec<Standing>,
}

/// Operator snapshot of the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStatus {
    #[serde(flatten)]
    pub phase: GamePhase,
    pub settings: GameSettings,
    pub roster: Vec<RosterEntry>,
    /// Seed of the current round's function.
    pub seed: Option<u64>,
}

/// The round lifecycle state machine.
///
/// Invariants:
/// - while a round is in progress the submission map's keys are exactly
///   the roster;
/// - the round index is below `settings.rounds` while started;
/// - a raw score, once recorded, is never overwritten.
#[derive(Debug)]
pub struct GameSession {
    settings: GameSettings,
    phase: GamePhase,
    roster: Vec<PlayerId>,
    names: HashMap<PlayerId, String>,
    submitted: HashMap<PlayerId, bool>,
    /// Final positions for the current round, cleared between rounds.
    positions: HashMap<PlayerId, Point>,
    functions: Vec<HiddenFunction>,
    leaderboard: Leaderboard,
    /// Names behind the frozen snapshot, kept after players leave.
    final_names: HashMap<PlayerId, String>,
    /// Feeds each game's generator. `None` means OS entropy per game.
    seeds: Option<SeedRng>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(None)
    }
}

impl GameSession {
    /// Creates an idle session. With a base seed every game played on
    /// this session is reproducible.
    pub fn new(base_seed: Option<u64>) -> Self {
        Self {
            settings: GameSettings::default(),
            phase: GamePhase::WaitingForPlayers,
            roster: Vec::new(),
            names: HashMap::new(),
            submitted: HashMap::new(),
            positions: HashMap::new(),
            functions: Vec::new(),
            leaderboard: Leaderboard::default(),
            final_names: HashMap::new(),
            seeds: base_seed.map(SeedRng::new),
        }
    }

    // -----------------------------------------------------------------------
    // Player-facing transitions
    // -----------------------------------------------------------------------

    /// Handles `GAME` from a registered player.
    ///
    /// Before a game starts the player joins the roster. Once started,
    /// roster members are sent the current game again and everyone else
    /// is told the game is unavailable.
    pub fn join(&mut self, player: PlayerId, name: &str) -> Vec<Outbound> {
        let on_roster = self.roster.contains(&player);
        match self.phase {
            GamePhase::WaitingForPlayers => {
                if !on_roster {
                    self.roster.push(player);
                    tracing::info!(%player, name, roster = self.roster.len(), "player joined");
                }
                self.names.insert(player, name.to_string());
                vec![Outbound::to(player, ServerMessage::GameOk)]
            }
            _ if on_roster => {
                tracing::info!(%player, phase = %self.phase, "player resumed");
                let setup = ServerMessage::GameStart(self.settings.setup());
                let mut out = vec![Outbound::to(player, setup)];
                if let Some(seed) = self.current_seed() {
                    out.push(Outbound::to(player, ServerMessage::Func { seed }));
                }
                out
            }
            _ => {
                tracing::debug!(%player, "join refused, game running");
                vec![Outbound::to(player, ServerMessage::GameUnavailable)]
            }
        }
    }

    /// Handles `SCORE`. Returns `true` if this submission completed the round.
    ///
    /// A second submission in the same round is ignored. Completion never
    /// advances the round by itself.
    pub fn submit_score(
        &mut self,
        player: PlayerId,
        value: f64,
        position: Option<Point>,
    ) -> Result<bool, GameError> {
        if self.phase == GamePhase::WaitingForPlayers {
            return Err(GameError::InvalidState {
                operation: "submit a score",
                phase: self.phase,
            });
        }
        if !self.roster.contains(&player) {
            return Err(GameError::NotInGame(player));
        }
        let GamePhase::InProgress { round } = self.phase else {
            tracing::debug!(%player, "score after round completion ignored");
            return Ok(false);
        };
        if self.submitted.get(&player).copied().unwrap_or(false) {
            tracing::debug!(%player, round, "duplicate score ignored");
            return Ok(false);
        }
        if let Some(pos) = position {
            if pos.dimension() != self.settings.dim {
                return Err(GameError::PositionMismatch {
                    expected: self.settings.dim,
                    actual: pos.dimension(),
                });
            }
            self.positions.insert(player, pos);
        }

        self.leaderboard.record_score(player, round, value);
        self.submitted.insert(player, true);
        tracing::info!(%player, round, score = value, "score submitted");
        Ok(self.check_round_complete())
    }

    /// Drops a player from the game, for instance on disconnect.
    ///
    /// Completion is re-evaluated against the smaller roster. If nobody is
    /// left the session returns to `WaitingForPlayers` and the game's
    /// totals are discarded. Returns `false` if the player was not on the
    /// roster.
    pub fn remove_player(&mut self, player: PlayerId) -> bool {
        let Some(idx) = self.roster.iter().position(|&p| p == player) else {
            return false;
        };
        self.roster.remove(idx);
        self.names.remove(&player);
        self.submitted.remove(&player);
        self.positions.remove(&player);
        tracing::info!(%player, roster = self.roster.len(), "player left the game");

        if !self.phase.is_started() {
            return true;
        }
        self.leaderboard.remove_player(player);
        if self.roster.is_empty() {
            tracing::info!("roster empty, abandoning game");
            self.clear_game();
            self.leaderboard = Leaderboard::default();
        } else {
            self.check_round_complete();
        }
        true
    }

    /// Points a roster entry at a player's new username.
    pub fn rename(&mut self, player: PlayerId, name: &str) {
        if let Some(entry) = self.names.get_mut(&player) {
            *entry = name.to_string();
        }
    }

    // -----------------------------------------------------------------------
    // Operator transitions
    // -----------------------------------------------------------------------

    /// Starts a game for the current roster.
    ///
    /// Generates one hidden function per round, reallocates the
    /// leaderboard, and announces the game followed by round 0's seed.
    pub fn start(&mut self, settings: GameSettings) -> Result<Vec<Outbound>, GameError> {
        if self.phase.is_started() {
            return Err(GameError::InvalidState {
                operation: "start",
                phase: self.phase,
            });
        }
        settings.validate()?;
        if self.roster.is_empty() {
            return Err(GameError::EmptyRoster);
        }

        let base_seed = self.seeds.as_mut().map(SeedRng::next_u64);
        let mut generator =
            FunctionGenerator::new(settings.dim, settings.difficulty, settings.domain, base_seed);
        self.functions = generator.generate_rounds(settings.rounds);
        self.settings = settings;
        self.leaderboard.unfreeze(&self.roster, settings.rounds);
        self.final_names.clear();
        self.begin_round(0);

        let seed = self.current_seed().unwrap_or_default();
        tracing::info!(
            players = self.roster.len(),
            rounds = settings.rounds,
            dim = %settings.dim,
            difficulty = %settings.difficulty,
            base_seed = generator.base_seed(),
            seed,
            "game started"
        );
        Ok(vec![
            Outbound::broadcast(self.roster.clone(), ServerMessage::GameStart(settings.setup())),
            Outbound::broadcast(self.roster.clone(), ServerMessage::Func { seed }),
        ])
    }

    /// Broadcasts every player's final position and score for the
    /// completed round. Players without a position are left out.
    pub fn reveal(&self) -> Result<Vec<Outbound>, GameError> {
        let GamePhase::RoundComplete { round } = self.phase else {
            return Err(GameError::InvalidState {
                operation: "reveal",
                phase: self.phase,
            });
        };
        let entries: Vec<RevealEntry> = self
            .roster
            .iter()
            .filter_map(|p| {
                Some(RevealEntry {
                    name: self.names.get(p)?.clone(),
                    position: *self.positions.get(p)?,
                    score: self.leaderboard.score(*p, round)?,
                })
            })
            .collect();

        if entries.is_empty() {
            tracing::debug!(round, "nothing to reveal");
            return Ok(Vec::new());
        }
        tracing::info!(round, entries = entries.len(), "round revealed");
        Ok(vec![Outbound::broadcast(
            self.roster.clone(),
            ServerMessage::Reveal(entries),
        )])
    }

    /// Moves past a completed round: the next round's seed, or `GAME over`
    /// after the last one.
    pub fn advance(&mut self) -> Result<Vec<Outbound>, GameError> {
        let GamePhase::RoundComplete { round } = self.phase else {
            return Err(GameError::InvalidState {
                operation: "advance",
                phase: self.phase,
            });
        };
        let next = round + 1;
        if next < self.settings.rounds {
            self.begin_round(next);
            let seed = self.current_seed().unwrap_or_default();
            tracing::info!(round = next, seed, "round started");
            Ok(vec![Outbound::broadcast(
                self.roster.clone(),
                ServerMessage::Func { seed },
            )])
        } else {
            let out = vec![Outbound::broadcast(self.roster.clone(), ServerMessage::GameOver)];
            self.finish_game(true);
            tracing::info!("game over");
            Ok(out)
        }
    }

    /// Scores every player who has not submitted as `f64::MAX` and
    /// completes the round. Returns the players that were forced.
    pub fn force_finish(&mut self) -> Result<Vec<PlayerId>, GameError> {
        let GamePhase::InProgress { round } = self.phase else {
            return Err(GameError::InvalidState {
                operation: "force finish",
                phase: self.phase,
            });
        };
        let forced: Vec<PlayerId> = self
            .roster
            .iter()
            .copied()
            .filter(|p| !self.submitted.get(p).copied().unwrap_or(false))
            .collect();
        for &player in &forced {
            self.leaderboard.record_score(player, round, f64::MAX);
            self.submitted.insert(player, true);
        }
        tracing::warn!(round, forced = forced.len(), "round force-finished");
        self.check_round_complete();
        Ok(forced)
    }

    /// Returns to `WaitingForPlayers` from any phase.
    ///
    /// A running game is ended with `GAME over` and its totals frozen.
    /// With `kick` the roster is cleared, otherwise it is kept for a rematch.
    pub fn reset(&mut self, kick: bool) -> Vec<Outbound> {
        let mut out = Vec::new();
        if self.phase.is_started() {
            out.push(Outbound::broadcast(self.roster.clone(), ServerMessage::GameOver));
            self.finish_game(kick);
        } else if kick {
            self.roster.clear();
            self.names.clear();
        }
        tracing::info!(kick, roster = self.roster.len(), "game reset");
        out
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn roster(&self) -> &[PlayerId] {
        &self.roster
    }

    pub fn contains(&self, player: PlayerId) -> bool {
        self.roster.contains(&player)
    }

    pub fn has_submitted(&self, player: PlayerId) -> bool {
        self.submitted.get(&player).copied().unwrap_or(false)
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    /// The hidden function for the current round.
    pub fn current_function(&self) -> Option<&HiddenFunction> {
        self.functions.get(self.phase.round()?)
    }

    pub fn current_seed(&self) -> Option<u64> {
        self.current_function().map(HiddenFunction::seed)
    }

    /// True minimum of the current round, for the operator only.
    pub fn current_minimum(&self) -> Option<Minimum> {
        self.current_function().map(HiddenFunction::true_minimum)
    }

    pub fn standings(&self) -> Standings {
        let (frozen, totals, names) = match self.leaderboard.frozen_snapshot() {
            Some(snapshot) => (true, snapshot.to_vec(), &self.final_names),
            None => (false, self.leaderboard.totals(), &self.names),
        };
        let mut entries: Vec<Standing> = totals
            .into_iter()
            .map(|(player_id, total)| Standing {
                player_id,
                name: names
                    .get(&player_id)
                    .cloned()
                    .unwrap_or_else(|| player_id.to_string()),
                total,
            })
            .collect();
        entries.sort_by(|a, b| b.total.cmp(&a.total));
        Standings { frozen, entries }
    }

    pub fn status(&self) -> GameStatus {
        GameStatus {
            phase: self.phase,
            settings: self.settings,
            roster: self
                .roster
                .iter()
                .map(|&player_id| RosterEntry {
                    player_id,
                    name: self.names.get(&player_id).cloned().unwrap_or_default(),
                    submitted: self.has_submitted(player_id),
                })
                .collect(),
            seed: self.current_seed(),
        }
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn begin_round(&mut self, round: usize) {
        self.submitted = self.roster.iter().map(|&p| (p, false)).collect();
        self.positions.clear();
        self.phase = GamePhase::InProgress { round };
    }

    /// Completes the round iff every roster member has submitted.
    fn check_round_complete(&mut self) -> bool {
        let GamePhase::InProgress { round } = self.phase else {
            return false;
        };
        if self.submitted.is_empty() || !self.submitted.values().all(|&s| s) {
            return false;
        }
        let awarded = self.leaderboard.compute_round_points(round);
        self.phase = GamePhase::RoundComplete { round };
        tracing::info!(round, ?awarded, "round complete, waiting for operator");
        true
    }

    /// Freezes the totals and goes idle.
    fn finish_game(&mut self, kick: bool) {
        if !self.leaderboard.is_frozen() {
            self.final_names = self
                .leaderboard
                .roster()
                .iter()
                .filter_map(|p| Some((*p, self.names.get(p)?.clone())))
                .collect();
            self.leaderboard.freeze();
        }
        self.clear_game();
        if kick {
            self.roster.clear();
            self.names.clear();
        }
    }

    fn clear_game(&mut self) {
        self.phase = GamePhase::WaitingForPlayers;
        self.submitted.clear();
        self.positions.clear();
        self.functions.clear();
    }
}
