use std::collections::HashMap;

use serde::Serialize;

use crate::constants::{
    row_offset, BOTTOM_ROW, BRIDGE_KEY, BRIDGE_ROW, STANDARD_ROWS, UNREACHABLE_DISTANCE,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: String,
    pub row: i32,
    pub col: i32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub bridge: bool,
}

impl Cell {
    fn visual_x(&self) -> f64 {
        self.col as f64 + row_offset(self.row)
    }
}

// A lower-row key touches the upper-row keys at its own column and the next one.
pub fn staggered_adjacent(a: &Cell, b: &Cell) -> bool {
    if a.id == b.id || a.bridge || b.bridge {
        return false;
    }
    if a.row == b.row {
        return (a.col - b.col).abs() == 1;
    }
    if (a.row - b.row).abs() != 1 {
        return false;
    }
    let (upper, lower) = if a.row < b.row { (a, b) } else { (b, a) };
    let shift = upper.col - lower.col;
    (0..=1).contains(&shift)
}

pub fn bridge_adjacent(bridge: &Cell, other: &Cell) -> bool {
    bridge.bridge && !other.bridge && other.row == BOTTOM_ROW
}

pub fn visual_distance(a: &Cell, b: &Cell) -> f64 {
    if a.id == b.id {
        return 0.0;
    }
    if a.bridge || b.bridge {
        let other = if a.bridge { b } else { a };
        if other.bridge {
            return 0.0;
        }
        return f64::from((BRIDGE_ROW - other.row).abs());
    }
    let dx = a.visual_x() - b.visual_x();
    let dy = f64::from(a.row - b.row);
    (dx * dx + dy * dy).sqrt()
}

#[derive(Clone, Debug)]
pub struct Topology {
    cells: Vec<Cell>,
    index: HashMap<String, usize>,
}

impl Topology {
    pub fn standard() -> Self {
        Self::from_rows(&STANDARD_ROWS, Some(BRIDGE_KEY))
    }

    pub fn from_rows(rows: &[&[&str]], bridge: Option<&str>) -> Self {
        let mut cells = Vec::new();
        for (row, keys) in rows.iter().enumerate() {
            for (col, key) in keys.iter().enumerate() {
                cells.push(Cell {
                    id: (*key).to_string(),
                    row: row as i32,
                    col: col as i32,
                    bridge: false,
                });
            }
        }
        if let Some(id) = bridge {
            cells.push(Cell {
                id: id.to_string(),
                row: BRIDGE_ROW,
                col: 0,
                bridge: true,
            });
        }
        let index = cells
            .iter()
            .enumerate()
            .map(|(idx, cell)| (cell.id.clone(), idx))
            .collect();
        Self { cells, index }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, id: &str) -> Option<&Cell> {
        self.index.get(id).map(|idx| &self.cells[*idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn bridge(&self) -> Option<&Cell> {
        self.cells.iter().find(|cell| cell.bridge)
    }

    pub fn is_bridge(&self, id: &str) -> bool {
        self.cell(id).is_some_and(|cell| cell.bridge)
    }

    pub fn row(&self, row: i32) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(move |cell| cell.row == row)
    }

    pub fn is_adjacent(&self, a: &str, b: &str) -> bool {
        let (Some(a), Some(b)) = (self.cell(a), self.cell(b)) else {
            return false;
        };
        if a.bridge {
            return bridge_adjacent(a, b);
        }
        if b.bridge {
            return bridge_adjacent(b, a);
        }
        staggered_adjacent(a, b)
    }

    pub fn neighbors(&self, id: &str) -> Vec<String> {
        if !self.contains(id) {
            return Vec::new();
        }
        self.cells
            .iter()
            .filter(|cell| self.is_adjacent(id, &cell.id))
            .map(|cell| cell.id.clone())
            .collect()
    }

    pub fn distance(&self, a: &str, b: &str) -> f64 {
        match (self.cell(a), self.cell(b)) {
            (Some(a), Some(b)) => visual_distance(a, b),
            _ => UNREACHABLE_DISTANCE,
        }
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::standard()
    }
}
