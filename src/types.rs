use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyKind {
    Chaser,
    Random,
    Timed,
}

impl EnemyKind {
    pub fn moves_per_turn(self) -> bool {
        !matches!(self, Self::Timed)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    #[default]
    Standard,
    Split,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    PlayerTurn,
    EnemyTurn,
    Resolving,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    InProgress,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    NotPlayerTurn,
    Blocked,
    NotAdjacent,
    Occupied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Accepted { enemy_turn: bool },
    Won,
    Rejected(RejectReason),
    Ignored,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnemyView {
    pub id: String,
    pub pos: String,
    #[serde(rename = "type")]
    pub kind: EnemyKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EnemyMove {
    pub id: String,
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub moves: Vec<EnemyMove>,
    pub caught: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StateView {
    #[serde(rename = "levelId")]
    pub level_id: u32,
    pub player: String,
    pub enemies: Vec<EnemyView>,
    #[serde(rename = "currentRegion", skip_serializing_if = "Option::is_none")]
    pub current_region: Option<u8>,
    pub phase: TurnPhase,
    pub outcome: Outcome,
    pub available: Vec<String>,
    #[serde(rename = "playerMoves")]
    pub player_moves: u64,
    #[serde(rename = "enemyPasses")]
    pub enemy_passes: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresenterEvent {
    LevelLoaded {
        #[serde(rename = "levelId")]
        level_id: u32,
        target: String,
        blocked: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        split: bool,
    },
    StateChanged {
        view: StateView,
    },
    InvalidMove {
        cell: String,
    },
    InvalidMoveCleared {
        cell: String,
    },
    Outcome {
        outcome: Outcome,
    },
}
