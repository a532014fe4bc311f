use std::sync::Arc;

use serde_json::json;

use crate::constants::{
    ENEMY_TURN_DELAY_MS, LEVEL_ADVANCE_DELAY_MS, RESTART_KEY, SHAKE_CLEAR_MS,
    TIMED_ENEMY_INTERVAL_MS,
};
use crate::engine::board::Board;
use crate::engine::GameState;
use crate::input::InputSource;
use crate::keyboard::Topology;
use crate::level::LevelSpec;
use crate::logging;
use crate::scheduler::Scheduler;
use crate::types::{MoveOutcome, Outcome, PresenterEvent, StateView};

pub trait Presenter {
    fn on_level_loaded(&mut self, level: &LevelSpec);
    fn on_state_changed(&mut self, view: &StateView);
    fn on_invalid_move(&mut self, cell: &str);
    fn on_invalid_move_cleared(&mut self, _cell: &str) {}
    fn on_outcome(&mut self, outcome: Outcome);
}

#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<PresenterEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PresenterEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<PresenterEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn last_view(&self) -> Option<&StateView> {
        self.events.iter().rev().find_map(|event| match event {
            PresenterEvent::StateChanged { view } => Some(view),
            _ => None,
        })
    }
}

impl Presenter for EventLog {
    fn on_level_loaded(&mut self, level: &LevelSpec) {
        self.events.push(PresenterEvent::LevelLoaded {
            level_id: level.id,
            target: level.target_cell.clone(),
            blocked: level.blocked.iter().cloned().collect(),
            message: level.message.clone(),
            split: level.is_split(),
        });
    }

    fn on_state_changed(&mut self, view: &StateView) {
        self.events
            .push(PresenterEvent::StateChanged { view: view.clone() });
    }

    fn on_invalid_move(&mut self, cell: &str) {
        self.events.push(PresenterEvent::InvalidMove {
            cell: cell.to_string(),
        });
    }

    fn on_invalid_move_cleared(&mut self, cell: &str) {
        self.events.push(PresenterEvent::InvalidMoveCleared {
            cell: cell.to_string(),
        });
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        self.events.push(PresenterEvent::Outcome { outcome });
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ControllerOptions {
    pub enemy_turn_delay_ms: u64,
    pub timed_interval_ms: u64,
    pub shake_clear_ms: u64,
    pub advance_delay_ms: u64,
    pub seed: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            enemy_turn_delay_ms: ENEMY_TURN_DELAY_MS,
            timed_interval_ms: TIMED_ENEMY_INTERVAL_MS,
            shake_clear_ms: SHAKE_CLEAR_MS,
            advance_delay_ms: LEVEL_ADVANCE_DELAY_MS,
            seed: 1,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Task {
    EnemyTurn,
    TimedTick,
    ClearShake { cell: String },
    AdvanceLevel,
}

#[derive(Clone, Debug)]
struct Pending {
    session: u64,
    task: Task,
}

pub struct GameController<P: Presenter> {
    topology: Arc<Topology>,
    levels: Vec<Arc<LevelSpec>>,
    level_index: usize,
    state: Option<GameState>,
    presenter: P,
    options: ControllerOptions,
    queue: Scheduler<Pending>,
    session: u64,
    timed_session: Option<u64>,
    now_ms: u64,
}

impl<P: Presenter> GameController<P> {
    pub fn new(levels: Vec<LevelSpec>, presenter: P, options: ControllerOptions) -> Self {
        Self {
            topology: Arc::new(Topology::standard()),
            levels: levels.into_iter().map(Arc::new).collect(),
            level_index: 0,
            state: None,
            presenter,
            options,
            queue: Scheduler::new(),
            session: 0,
            timed_session: None,
            now_ms: 0,
        }
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn level_index(&self) -> usize {
        self.level_index
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn next_due_ms(&self) -> Option<u64> {
        self.queue.next_due_ms()
    }

    pub fn timed_interval_active(&self) -> bool {
        self.timed_session.is_some()
    }

    pub fn load_level(&mut self, index: usize) -> bool {
        let Some(level) = self.levels.get(index).cloned() else {
            logging::emit(
                "warn",
                "level_missing",
                json!({ "index": index, "levelCount": self.levels.len() }),
            );
            return false;
        };

        self.cancel_timed_interval("level_load");
        self.session += 1;
        self.level_index = index;

        for warning in level.lint(&self.topology) {
            logging::emit(
                "warn",
                "level_lint",
                json!({ "levelId": level.id, "message": warning }),
            );
        }

        let board = Board::for_level(self.topology.clone(), &level);
        let seed = self.options.seed.wrapping_add(u64::from(level.id));
        let state = GameState::new(board, level.clone(), seed);
        self.presenter.on_level_loaded(&level);
        self.presenter.on_state_changed(&state.view());
        self.state = Some(state);

        if level.has_timed_enemies() {
            self.timed_session = Some(self.session);
            self.schedule(self.options.timed_interval_ms, Task::TimedTick);
        }

        logging::emit(
            "info",
            "level_loaded",
            json!({
                "levelId": level.id,
                "index": index,
                "session": self.session,
                "enemies": level.enemies.len(),
                "split": level.is_split(),
                "atMs": self.now_ms,
            }),
        );
        true
    }

    pub fn restart(&mut self) -> bool {
        self.load_level(self.level_index)
    }

    pub fn handle_key(&mut self, key: &str) {
        let Some(outcome) = self.state.as_ref().map(GameState::outcome) else {
            return;
        };
        match outcome {
            Outcome::Lost if key == RESTART_KEY => {
                self.restart();
                return;
            }
            Outcome::Lost | Outcome::Won => return,
            Outcome::InProgress => {}
        }
        if !self.topology.contains(key) {
            return;
        }

        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.is_on_bridge() && state.board().is_bridge(key) {
            if state.switch_region() {
                let view = state.view();
                self.presenter.on_state_changed(&view);
            }
            return;
        }

        let result = state.attempt_player_move(key);
        let view = state.view();
        match result {
            MoveOutcome::Accepted { enemy_turn } => {
                self.presenter.on_state_changed(&view);
                if enemy_turn {
                    self.schedule(self.options.enemy_turn_delay_ms, Task::EnemyTurn);
                }
            }
            MoveOutcome::Won => {
                self.presenter.on_state_changed(&view);
                self.finish(Outcome::Won);
            }
            MoveOutcome::Rejected(reason) => {
                self.presenter.on_invalid_move(key);
                self.schedule(
                    self.options.shake_clear_ms,
                    Task::ClearShake {
                        cell: key.to_string(),
                    },
                );
                logging::emit(
                    "debug",
                    "move_rejected",
                    json!({ "cell": key, "reason": reason, "atMs": self.now_ms }),
                );
            }
            MoveOutcome::Ignored => {}
        }
    }

    pub fn advance(&mut self, dt_ms: u64) {
        self.advance_to(self.now_ms.saturating_add(dt_ms));
    }

    pub fn advance_to(&mut self, now_ms: u64) {
        while let Some((due_ms, pending)) = self.queue.pop_due(now_ms) {
            self.now_ms = self.now_ms.max(due_ms);
            self.run_task(pending);
        }
        self.now_ms = self.now_ms.max(now_ms);
    }

    pub fn run_script(&mut self, input: &mut impl InputSource) {
        while let Some(event) = input.next_event() {
            self.advance_to(event.at_ms);
            self.handle_key(&event.key);
        }
    }

    fn schedule(&mut self, delay_ms: u64, task: Task) {
        let pending = Pending {
            session: self.session,
            task,
        };
        self.queue
            .schedule(self.now_ms.saturating_add(delay_ms), pending);
    }

    fn run_task(&mut self, pending: Pending) {
        match pending.task {
            Task::ClearShake { cell } => self.presenter.on_invalid_move_cleared(&cell),
            _ if pending.session != self.session => {}
            Task::EnemyTurn => self.run_enemy_turn(),
            Task::TimedTick => self.run_timed_tick(pending.session),
            Task::AdvanceLevel => {
                let next = self.level_index + 1;
                if !self.load_level(next) {
                    logging::emit(
                        "info",
                        "campaign_complete",
                        json!({ "levels": self.levels.len() }),
                    );
                }
            }
        }
    }

    fn run_enemy_turn(&mut self) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.outcome().is_terminal() {
            return;
        }
        let report = state.resolve_enemy_turn();
        let view = state.view();
        let outcome = state.outcome();
        self.presenter.on_state_changed(&view);
        logging::emit(
            "debug",
            "enemy_turn",
            json!({ "moves": report.moves, "caught": report.caught, "atMs": self.now_ms }),
        );
        if outcome.is_terminal() {
            self.finish(outcome);
        }
    }

    fn run_timed_tick(&mut self, session: u64) {
        if self.timed_session != Some(session) {
            return;
        }
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let report = state.tick_timed_enemies();
        let view = state.view();
        let outcome = state.outcome();
        self.presenter.on_state_changed(&view);
        logging::emit(
            "debug",
            "timed_tick",
            json!({ "moves": report.moves, "caught": report.caught, "atMs": self.now_ms }),
        );
        if outcome.is_terminal() {
            self.finish(outcome);
        } else {
            self.schedule(self.options.timed_interval_ms, Task::TimedTick);
        }
    }

    fn finish(&mut self, outcome: Outcome) {
        self.cancel_timed_interval("outcome");
        self.presenter.on_outcome(outcome);
        logging::emit(
            "info",
            "level_finished",
            json!({
                "outcome": outcome,
                "levelIndex": self.level_index,
                "atMs": self.now_ms,
            }),
        );
        if outcome == Outcome::Won {
            self.schedule(self.options.advance_delay_ms, Task::AdvanceLevel);
        }
    }

    fn cancel_timed_interval(&mut self, reason: &str) {
        if let Some(session) = self.timed_session.take() {
            logging::emit(
                "info",
                "timed_interval_cancelled",
                json!({ "session": session, "reason": reason, "atMs": self.now_ms }),
            );
        }
    }
}
