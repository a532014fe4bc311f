use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::keyboard::Topology;
use crate::types::{EnemyKind, LayoutMode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyDef {
    pub id: String,
    #[serde(rename = "startKey", alias = "startCell")]
    pub start_cell: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: EnemyKind,
}

impl EnemyDef {
    pub fn new(id: &str, start_cell: &str, kind: EnemyKind) -> Self {
        Self {
            id: id.to_string(),
            start_cell: start_cell.to_string(),
            kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub id: u32,
    #[serde(rename = "startKey", alias = "startCell")]
    pub start_cell: String,
    #[serde(rename = "targetKey", alias = "targetCell")]
    pub target_cell: String,
    #[serde(rename = "blockedKeys", alias = "blockedCells", default)]
    pub blocked: BTreeSet<String>,
    #[serde(default)]
    pub enemies: Vec<EnemyDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub layout: LayoutMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<[Vec<String>; 2]>,
}

impl LevelSpec {
    pub fn new(id: u32, start_cell: &str, target_cell: &str) -> Self {
        Self {
            id,
            start_cell: start_cell.to_string(),
            target_cell: target_cell.to_string(),
            blocked: BTreeSet::new(),
            enemies: Vec::new(),
            message: None,
            layout: LayoutMode::Standard,
            regions: None,
        }
    }

    pub fn with_blocked(mut self, keys: &[&str]) -> Self {
        self.blocked = keys.iter().map(|key| key.to_string()).collect();
        self
    }

    pub fn with_enemy(mut self, id: &str, start_cell: &str, kind: EnemyKind) -> Self {
        self.enemies.push(EnemyDef::new(id, start_cell, kind));
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_split(mut self, left: &[&str], right: &[&str]) -> Self {
        self.layout = LayoutMode::Split;
        self.regions = Some([
            left.iter().map(|key| key.to_string()).collect(),
            right.iter().map(|key| key.to_string()).collect(),
        ]);
        self
    }

    pub fn is_blocked(&self, cell: &str) -> bool {
        self.blocked.contains(cell)
    }

    pub fn is_split(&self) -> bool {
        self.layout == LayoutMode::Split
    }

    pub fn has_timed_enemies(&self) -> bool {
        self.enemies.iter().any(|enemy| !enemy.kind.moves_per_turn())
    }

    pub fn lint(&self, topology: &Topology) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut check_cell = |label: &str, cell: &str| {
            if !topology.contains(cell) {
                warnings.push(format!("{label} {cell:?} is not a key"));
            }
        };
        check_cell("start", &self.start_cell);
        check_cell("target", &self.target_cell);
        for key in &self.blocked {
            check_cell("blocked key", key);
        }
        for enemy in &self.enemies {
            check_cell(&format!("enemy {}", enemy.id), &enemy.start_cell);
        }

        if self.is_blocked(&self.start_cell) {
            warnings.push(format!("start {:?} is blocked", self.start_cell));
        }
        if self.is_blocked(&self.target_cell) {
            warnings.push(format!("target {:?} is blocked", self.target_cell));
        }

        let mut seen = HashSet::new();
        for enemy in &self.enemies {
            if self.is_blocked(&enemy.start_cell) {
                warnings.push(format!(
                    "enemy {} starts on blocked key {:?}",
                    enemy.id, enemy.start_cell
                ));
            }
            if enemy.start_cell == self.start_cell {
                warnings.push(format!("enemy {} starts on the player", enemy.id));
            }
            if !seen.insert(enemy.start_cell.as_str()) {
                warnings.push(format!(
                    "enemy {} shares start {:?} with another enemy",
                    enemy.id, enemy.start_cell
                ));
            }
        }

        match (&self.layout, &self.regions) {
            (LayoutMode::Split, None) => {
                warnings.push("split layout without regions".to_string());
            }
            (LayoutMode::Split, Some([left, right])) => {
                let left: HashSet<&str> = left.iter().map(String::as_str).collect();
                for key in right {
                    if left.contains(key.as_str()) {
                        warnings.push(format!("key {key:?} is in both regions"));
                    }
                }
                for cell in topology.cells().iter().filter(|cell| !cell.bridge) {
                    let in_right = right.iter().any(|key| key == &cell.id);
                    if !left.contains(cell.id.as_str()) && !in_right {
                        warnings.push(format!("key {:?} has no region", cell.id));
                    }
                }
            }
            (LayoutMode::Standard, Some(_)) => {
                warnings.push("regions are ignored outside split layout".to_string());
            }
            (LayoutMode::Standard, None) => {}
        }
        warnings
    }
}

pub fn parse_levels(text: &str) -> Result<Vec<LevelSpec>, String> {
    let levels: Vec<LevelSpec> =
        serde_json::from_str(text).map_err(|error| format!("invalid level data: {error}"))?;
    if levels.is_empty() {
        return Err("level data contains no levels".to_string());
    }
    Ok(levels)
}

pub fn load_levels(path: &Path) -> Result<Vec<LevelSpec>, String> {
    let text = fs::read_to_string(path)
        .map_err(|error| format!("failed to read {}: {error}", path.display()))?;
    parse_levels(&text).map_err(|error| format!("{}: {error}", path.display()))
}
