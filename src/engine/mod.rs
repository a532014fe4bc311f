use std::sync::Arc;

use crate::level::LevelSpec;
use crate::rng::Rng;
use crate::types::{
    EnemyKind, EnemyMove, EnemyView, MoveOutcome, Outcome, RejectReason, StateView, TurnPhase,
    TurnReport,
};

pub mod board;
mod policy;

use self::board::Board;

#[derive(Clone, Debug)]
struct EnemyInternal {
    id: String,
    pos: String,
    kind: EnemyKind,
}

#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,
    level: Arc<LevelSpec>,
    player_pos: String,
    enemies: Vec<EnemyInternal>,
    phase: TurnPhase,
    outcome: Outcome,
    current_region: u8,
    enemy_turn_due: bool,
    player_moves: u64,
    enemy_passes: u64,
    timed_ticks: u64,
    rng: Rng,
}

impl GameState {
    pub fn new(board: Board, level: Arc<LevelSpec>, seed: u64) -> Self {
        let enemies = level
            .enemies
            .iter()
            .map(|def| EnemyInternal {
                id: def.id.clone(),
                pos: def.start_cell.clone(),
                kind: def.kind,
            })
            .collect();
        let current_region = board.region_of(&level.start_cell).unwrap_or(0);
        Self {
            player_pos: level.start_cell.clone(),
            board,
            level,
            enemies,
            phase: TurnPhase::PlayerTurn,
            outcome: Outcome::InProgress,
            current_region,
            enemy_turn_due: true,
            player_moves: 0,
            enemy_passes: 0,
            timed_ticks: 0,
            rng: Rng::new(seed),
        }
    }

    pub fn level(&self) -> &Arc<LevelSpec> {
        &self.level
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player_pos(&self) -> &str {
        &self.player_pos
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn current_region(&self) -> Option<u8> {
        self.board.is_split().then_some(self.current_region)
    }

    pub fn enemy_turn_due(&self) -> bool {
        self.enemy_turn_due
    }

    pub fn player_moves(&self) -> u64 {
        self.player_moves
    }

    pub fn enemy_passes(&self) -> u64 {
        self.enemy_passes
    }

    pub fn timed_ticks(&self) -> u64 {
        self.timed_ticks
    }

    pub fn enemies(&self) -> Vec<EnemyView> {
        self.enemies
            .iter()
            .map(|enemy| EnemyView {
                id: enemy.id.clone(),
                pos: enemy.pos.clone(),
                kind: enemy.kind,
            })
            .collect()
    }

    pub fn enemy_pos(&self, id: &str) -> Option<&str> {
        self.enemies
            .iter()
            .find(|enemy| enemy.id == id)
            .map(|enemy| enemy.pos.as_str())
    }

    pub fn enemy_at(&self, cell: &str) -> Option<&str> {
        self.enemies
            .iter()
            .find(|enemy| enemy.pos == cell)
            .map(|enemy| enemy.id.as_str())
    }

    pub fn is_on_bridge(&self) -> bool {
        self.board.is_bridge(&self.player_pos)
    }

    pub fn player_effective(&self) -> String {
        if self.is_on_bridge() {
            self.board.bridge_instance(self.current_region)
        } else {
            self.player_pos.clone()
        }
    }

    pub fn attempt_player_move(&mut self, target: &str) -> MoveOutcome {
        if self.outcome.is_terminal() {
            return MoveOutcome::Ignored;
        }
        let logical = self.board.logical(target).to_string();
        if logical == self.player_pos {
            return MoveOutcome::Ignored;
        }
        if self.phase != TurnPhase::PlayerTurn {
            return MoveOutcome::Rejected(RejectReason::NotPlayerTurn);
        }
        if self.level.is_blocked(&logical) {
            return MoveOutcome::Rejected(RejectReason::Blocked);
        }
        let destination = if self.board.is_bridge(&logical) {
            self.board.bridge_instance(self.current_region)
        } else {
            logical.clone()
        };
        if !self.board.is_adjacent(&self.player_effective(), &destination) {
            return MoveOutcome::Rejected(RejectReason::NotAdjacent);
        }
        if self.enemy_at(&logical).is_some() {
            return MoveOutcome::Rejected(RejectReason::Occupied);
        }

        self.phase = TurnPhase::Resolving;
        if let Some(region) = self.board.region_of(&destination) {
            self.current_region = region;
        }
        self.player_pos = logical;
        self.player_moves += 1;

        if self.player_pos == self.level.target_cell {
            self.outcome = Outcome::Won;
            return MoveOutcome::Won;
        }

        let enemy_turn = self.enemy_turn_due;
        self.enemy_turn_due = !enemy_turn;
        self.phase = if enemy_turn {
            TurnPhase::EnemyTurn
        } else {
            TurnPhase::PlayerTurn
        };
        MoveOutcome::Accepted { enemy_turn }
    }

    pub fn resolve_enemy_turn(&mut self) -> TurnReport {
        if self.outcome.is_terminal() {
            return TurnReport::default();
        }
        self.phase = TurnPhase::Resolving;
        let report = self.move_enemies(EnemyKind::moves_per_turn);
        self.enemy_passes += 1;
        if !self.outcome.is_terminal() {
            self.phase = TurnPhase::PlayerTurn;
        }
        report
    }

    pub fn tick_timed_enemies(&mut self) -> TurnReport {
        if self.outcome.is_terminal() {
            return TurnReport::default();
        }
        let previous = self.phase;
        self.phase = TurnPhase::Resolving;
        let report = self.move_enemies(|kind| !kind.moves_per_turn());
        self.timed_ticks += 1;
        if !self.outcome.is_terminal() {
            self.phase = previous;
        }
        report
    }

    pub fn switch_region(&mut self) -> bool {
        if !self.board.is_split()
            || !self.is_on_bridge()
            || self.outcome.is_terminal()
            || self.phase != TurnPhase::PlayerTurn
        {
            return false;
        }
        self.current_region = 1 - self.current_region.min(1);
        true
    }

    pub fn available_moves(&self) -> Vec<String> {
        if self.outcome.is_terminal() || self.phase != TurnPhase::PlayerTurn {
            return Vec::new();
        }
        self.board
            .neighbors(&self.player_effective())
            .iter()
            .map(|cell| self.board.logical(cell).to_string())
            .filter(|cell| !self.level.is_blocked(cell))
            .filter(|cell| self.enemy_at(cell).is_none())
            .collect()
    }

    pub fn view(&self) -> StateView {
        StateView {
            level_id: self.level.id,
            player: self.player_pos.clone(),
            enemies: self.enemies(),
            current_region: self.current_region(),
            phase: self.phase,
            outcome: self.outcome,
            available: self.available_moves(),
            player_moves: self.player_moves,
            enemy_passes: self.enemy_passes,
        }
    }

    fn move_enemies(&mut self, selected: impl Fn(EnemyKind) -> bool) -> TurnReport {
        let player = self.player_effective();
        let player_region = self.board.region_of(&player);
        let mut report = TurnReport::default();

        for idx in 0..self.enemies.len() {
            let kind = self.enemies[idx].kind;
            if !selected(kind) {
                continue;
            }
            let from = self.enemies[idx].pos.clone();
            if self.board.is_split() && self.board.region_of(&from) != player_region {
                continue;
            }
            let next = {
                let others: Vec<&str> = self
                    .enemies
                    .iter()
                    .enumerate()
                    .filter(|(other, _)| *other != idx)
                    .map(|(_, enemy)| enemy.pos.as_str())
                    .collect();
                let options = policy::candidates(&self.board, &self.level, &from, &others);
                policy::choose_next(kind, &self.board, &from, &player, &options, &mut self.rng)
            };
            if next != from {
                report.moves.push(EnemyMove {
                    id: self.enemies[idx].id.clone(),
                    from,
                    to: next.clone(),
                });
                self.enemies[idx].pos = next;
            }
        }

        if self.enemies.iter().any(|enemy| enemy.pos == self.player_pos) {
            self.outcome = Outcome::Lost;
            report.caught = true;
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::board::Board;
    use super::policy;
    use super::GameState;
    use crate::keyboard::Topology;
    use crate::level::LevelSpec;
    use crate::levels::builtin_levels;
    use crate::types::{EnemyKind, MoveOutcome, Outcome, RejectReason, TurnPhase};

    fn state_for(level: LevelSpec) -> GameState {
        state_with_seed(level, 1)
    }

    fn state_with_seed(level: LevelSpec, seed: u64) -> GameState {
        let board = Board::for_level(Arc::new(Topology::standard()), &level);
        GameState::new(board, Arc::new(level), seed)
    }

    fn chase_level() -> LevelSpec {
        builtin_levels()
            .into_iter()
            .find(|level| level.id == 3)
            .expect("level 3")
    }

    fn split_level(start: &str) -> LevelSpec {
        let mut level = builtin_levels()
            .into_iter()
            .find(|level| level.is_split())
            .expect("split level");
        level.start_cell = start.to_string();
        level.enemies.clear();
        level
    }

    #[test]
    fn non_adjacent_move_never_changes_position() {
        let mut state = state_for(LevelSpec::new(1, "A", "Enter"));
        for target in ["P", "Enter", "X", "1", "Space"] {
            assert_eq!(
                state.attempt_player_move(target),
                MoveOutcome::Rejected(RejectReason::NotAdjacent),
                "{target}"
            );
            assert_eq!(state.player_pos(), "A");
        }
        assert_eq!(state.player_moves(), 0);
    }

    #[test]
    fn unknown_cell_is_treated_as_unreachable() {
        let mut state = state_for(LevelSpec::new(1, "A", "Enter"));
        assert_eq!(
            state.attempt_player_move("F13"),
            MoveOutcome::Rejected(RejectReason::NotAdjacent)
        );
        assert_eq!(state.player_pos(), "A");
    }

    #[test]
    fn blocked_move_never_changes_position() {
        let mut state = state_for(chase_level());
        assert_eq!(
            state.attempt_player_move("H"),
            MoveOutcome::Rejected(RejectReason::Blocked)
        );
        assert_eq!(
            state.attempt_player_move("N"),
            MoveOutcome::Rejected(RejectReason::Blocked)
        );
        assert_eq!(state.player_pos(), "G");
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let level = LevelSpec::new(1, "A", "Enter").with_enemy("e1", "S", EnemyKind::Chaser);
        let mut state = state_for(level);
        assert_eq!(
            state.attempt_player_move("S"),
            MoveOutcome::Rejected(RejectReason::Occupied)
        );
        assert_eq!(state.player_pos(), "A");
    }

    #[test]
    fn pressing_own_cell_is_ignored() {
        let mut state = state_for(LevelSpec::new(1, "A", "Enter"));
        assert_eq!(state.attempt_player_move("A"), MoveOutcome::Ignored);
    }

    #[test]
    fn legal_move_leaves_enemies_until_their_pass() {
        let mut state = state_for(chase_level());
        assert_eq!(
            state.attempt_player_move("F"),
            MoveOutcome::Accepted { enemy_turn: true }
        );
        assert_eq!(state.player_pos(), "F");
        assert_eq!(state.enemy_pos("e1"), Some("Q"));
        assert_eq!(state.enemy_pos("e2"), Some("P"));
        assert_eq!(state.phase(), TurnPhase::EnemyTurn);
        assert_eq!(state.enemy_passes(), 0);
    }

    #[test]
    fn enemies_resolve_once_per_two_player_moves() {
        let level = LevelSpec::new(1, "A", "Enter").with_enemy("e1", "P", EnemyKind::Chaser);
        let mut state = state_for(level);

        assert_eq!(
            state.attempt_player_move("S"),
            MoveOutcome::Accepted { enemy_turn: true }
        );
        assert_eq!(
            state.attempt_player_move("D"),
            MoveOutcome::Rejected(RejectReason::NotPlayerTurn)
        );
        state.resolve_enemy_turn();
        assert_eq!(state.phase(), TurnPhase::PlayerTurn);
        assert_eq!(
            state.attempt_player_move("D"),
            MoveOutcome::Accepted { enemy_turn: false }
        );
        assert_eq!(state.phase(), TurnPhase::PlayerTurn);
        assert_eq!(state.player_moves(), 2);
        assert_eq!(state.enemy_passes(), 1);
        assert!(state.enemy_turn_due());
    }

    #[test]
    fn chaser_always_closes_in_when_it_can() {
        let topology = Topology::standard();
        let keys: Vec<String> = topology
            .cells()
            .iter()
            .filter(|cell| !cell.bridge)
            .map(|cell| cell.id.clone())
            .collect();
        for enemy in &keys {
            for player in &keys {
                if enemy == player {
                    continue;
                }
                let level = LevelSpec::new(1, player, "Enter").with_enemy(
                    "e1",
                    enemy,
                    EnemyKind::Chaser,
                );
                let mut state = state_for(level);
                let board = state.board().clone();
                let before = board.distance(enemy, player);
                let options = policy::candidates(&board, state.level(), enemy, &[]);
                let can_close = options
                    .iter()
                    .any(|cell| board.distance(cell, player) < before);

                state.resolve_enemy_turn();
                let after_pos = state.enemy_pos("e1").expect("enemy").to_string();
                let after = board.distance(&after_pos, player);
                if can_close {
                    assert!(after < before, "{enemy} -> {after_pos} chasing {player}");
                } else {
                    assert_eq!(&after_pos, enemy);
                }
            }
        }
    }

    #[test]
    fn enemies_move_in_level_order_against_current_positions() {
        let level = LevelSpec::new(1, "H", "Enter")
            .with_enemy("e1", "F", EnemyKind::Chaser)
            .with_enemy("e2", "D", EnemyKind::Chaser);
        let mut state = state_for(level);
        let report = state.resolve_enemy_turn();
        assert_eq!(state.enemy_pos("e1"), Some("G"));
        // e2 steps into the key e1 just left.
        assert_eq!(state.enemy_pos("e2"), Some("F"));
        assert_eq!(report.moves.len(), 2);
        assert!(!report.caught);

        let swapped = LevelSpec::new(1, "H", "Enter")
            .with_enemy("e2", "D", EnemyKind::Chaser)
            .with_enemy("e1", "F", EnemyKind::Chaser);
        let mut state = state_for(swapped);
        state.resolve_enemy_turn();
        assert_eq!(state.enemy_pos("e2"), Some("R"));
        assert_eq!(state.enemy_pos("e1"), Some("G"));
    }

    #[test]
    fn reaching_target_wins_and_freezes() {
        let mut state = state_for(LevelSpec::new(1, "L", ";"));
        assert_eq!(state.attempt_player_move(";"), MoveOutcome::Won);
        assert_eq!(state.outcome(), Outcome::Won);
        assert_eq!(state.attempt_player_move("L"), MoveOutcome::Ignored);
        assert_eq!(state.player_pos(), ";");
        assert!(state.available_moves().is_empty());
    }

    #[test]
    fn enemy_on_player_loses_and_freezes() {
        let level = LevelSpec::new(1, "A", "Enter").with_enemy("e1", "D", EnemyKind::Chaser);
        let mut state = state_for(level);
        assert_eq!(
            state.attempt_player_move("S"),
            MoveOutcome::Accepted { enemy_turn: true }
        );
        let report = state.resolve_enemy_turn();
        assert!(report.caught);
        assert_eq!(state.outcome(), Outcome::Lost);
        assert_eq!(state.enemy_pos("e1"), Some("S"));

        assert_eq!(state.attempt_player_move("A"), MoveOutcome::Ignored);
        let passes = state.enemy_passes();
        assert!(state.resolve_enemy_turn().moves.is_empty());
        assert!(state.tick_timed_enemies().moves.is_empty());
        assert_eq!(state.enemy_passes(), passes);
    }

    #[test]
    fn timed_enemies_only_move_on_ticks() {
        let level = LevelSpec::new(1, "A", "Enter").with_enemy("t1", "P", EnemyKind::Timed);
        let mut state = state_for(level);
        state.resolve_enemy_turn();
        assert_eq!(state.enemy_pos("t1"), Some("P"));

        let report = state.tick_timed_enemies();
        assert_eq!(report.moves.len(), 1);
        assert_ne!(state.enemy_pos("t1"), Some("P"));
        assert_eq!(state.timed_ticks(), 1);
        assert_eq!(state.phase(), TurnPhase::PlayerTurn);
    }

    #[test]
    fn random_enemies_replay_with_same_seed() {
        let level = LevelSpec::new(1, "A", "Enter")
            .with_enemy("r1", "I", EnemyKind::Random)
            .with_enemy("r2", "K", EnemyKind::Random);
        let mut a = state_with_seed(level.clone(), 99);
        let mut b = state_with_seed(level, 99);
        for _ in 0..20 {
            a.resolve_enemy_turn();
            b.resolve_enemy_turn();
            assert_eq!(a.enemies(), b.enemies());
        }
    }

    #[test]
    fn random_enemies_never_touch_bridge_or_blocked_keys() {
        let level = LevelSpec::new(1, "`", "Enter")
            .with_blocked(&["V", "B"])
            .with_enemy("r1", "C", EnemyKind::Random);
        let mut state = state_with_seed(level, 5);
        for _ in 0..200 {
            state.resolve_enemy_turn();
            let pos = state.enemy_pos("r1").expect("enemy").to_string();
            assert_ne!(pos, "Space");
            assert_ne!(pos, "V");
            assert_ne!(pos, "B");
            if state.outcome().is_terminal() {
                break;
            }
        }
    }

    #[test]
    fn bridge_toggles_region_without_moving() {
        let mut state = state_for(split_level("B"));
        assert_eq!(state.current_region(), Some(0));
        assert_eq!(
            state.attempt_player_move("Space"),
            MoveOutcome::Accepted { enemy_turn: true }
        );
        state.resolve_enemy_turn();
        assert_eq!(state.player_pos(), "Space");
        assert_eq!(state.player_effective(), "Space_0");

        assert!(state.switch_region());
        assert_eq!(state.player_pos(), "Space");
        assert_eq!(state.current_region(), Some(1));
        assert_eq!(state.player_effective(), "Space_1");

        assert_eq!(
            state.attempt_player_move("B"),
            MoveOutcome::Rejected(RejectReason::NotAdjacent)
        );
        assert_eq!(
            state.attempt_player_move("N"),
            MoveOutcome::Accepted { enemy_turn: false }
        );
        assert_eq!(state.current_region(), Some(1));
    }

    #[test]
    fn switch_region_needs_split_bridge() {
        let mut state = state_for(split_level("B"));
        assert!(!state.switch_region());

        let mut standard = state_for(LevelSpec::new(1, "B", "Enter"));
        standard.attempt_player_move("Space");
        standard.resolve_enemy_turn();
        assert!(standard.is_on_bridge());
        assert!(!standard.switch_region());
        assert_eq!(standard.current_region(), None);
    }

    #[test]
    fn split_regions_cut_direct_crossing() {
        let mut state = state_for(split_level("T"));
        assert_eq!(
            state.attempt_player_move("Y"),
            MoveOutcome::Rejected(RejectReason::NotAdjacent)
        );
    }

    #[test]
    fn enemies_wait_while_player_is_in_other_region() {
        let mut level = split_level("B");
        level.enemies.push(crate::level::EnemyDef::new("far", "P", EnemyKind::Chaser));
        level.enemies.push(crate::level::EnemyDef::new("near", "Q", EnemyKind::Chaser));
        let mut state = state_for(level);
        let report = state.resolve_enemy_turn();
        assert_eq!(state.enemy_pos("far"), Some("P"));
        assert_ne!(state.enemy_pos("near"), Some("Q"));
        assert_eq!(report.moves.len(), 1);
    }

    #[test]
    fn available_moves_skip_blocked_and_enemies() {
        let level = LevelSpec::new(1, "G", "Enter")
            .with_blocked(&["T", "Y", "H"])
            .with_enemy("e1", "V", EnemyKind::Chaser);
        let state = state_for(level);
        assert_eq!(state.available_moves(), vec!["F", "B"]);
    }

    #[test]
    fn available_moves_offer_the_bridge_by_key_name() {
        let state = state_for(split_level("B"));
        assert!(state.available_moves().contains(&"Space".to_string()));
        assert!(!state.available_moves().contains(&"Space_0".to_string()));
    }
}
