use std::io::Write;

use crate::constants::{key_label, row_offset};
use crate::controller::Presenter;
use crate::keyboard::Topology;
use crate::level::LevelSpec;
use crate::types::{Outcome, PresenterEvent, StateView};

pub struct JsonLinePresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_event(&mut self, event: &PresenterEvent) {
        let written = serde_json::to_string(event)
            .map_err(|error| error.to_string())
            .and_then(|text| writeln!(self.out, "{text}").map_err(|error| error.to_string()));
        if let Err(error) = written {
            eprintln!("[keychase] failed to write event: {error}");
        }
    }
}

impl<W: Write> Presenter for JsonLinePresenter<W> {
    fn on_level_loaded(&mut self, level: &LevelSpec) {
        self.write_event(&PresenterEvent::LevelLoaded {
            level_id: level.id,
            target: level.target_cell.clone(),
            blocked: level.blocked.iter().cloned().collect(),
            message: level.message.clone(),
            split: level.is_split(),
        });
    }

    fn on_state_changed(&mut self, view: &StateView) {
        self.write_event(&PresenterEvent::StateChanged { view: view.clone() });
    }

    fn on_invalid_move(&mut self, cell: &str) {
        self.write_event(&PresenterEvent::InvalidMove {
            cell: cell.to_string(),
        });
    }

    fn on_invalid_move_cleared(&mut self, cell: &str) {
        self.write_event(&PresenterEvent::InvalidMoveCleared {
            cell: cell.to_string(),
        });
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        self.write_event(&PresenterEvent::Outcome { outcome });
    }
}

pub struct TextPresenter<W: Write> {
    out: W,
    topology: Topology,
    level: Option<LevelSpec>,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            topology: Topology::standard(),
            level: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&self, view: &StateView) -> String {
        let Some(level) = self.level.as_ref() else {
            return String::new();
        };
        let right_region: Vec<&str> = match (&level.regions, level.is_split()) {
            (Some([_, right]), true) => right.iter().map(String::as_str).collect(),
            _ => Vec::new(),
        };

        let mut lines = Vec::new();
        let mut row = 0;
        loop {
            let cells: Vec<_> = self.topology.row(row).collect();
            if cells.is_empty() {
                break;
            }
            let indent = " ".repeat((row_offset(row) * 2.0).round() as usize);
            let drawn: Vec<String> = cells
                .iter()
                .map(|cell| {
                    let id = cell.id.as_str();
                    let mark = if view.player == id {
                        '@'
                    } else if view.enemies.iter().any(|enemy| enemy.pos == id) {
                        '!'
                    } else if level.target_cell == id {
                        '*'
                    } else if level.is_blocked(id) {
                        '#'
                    } else if view.available.iter().any(|key| key == id) {
                        '+'
                    } else {
                        ' '
                    };
                    if right_region.contains(&id) {
                        format!("<{}{mark}>", key_label(id))
                    } else {
                        format!("[{}{mark}]", key_label(id))
                    }
                })
                .collect();
            lines.push(format!("{indent}{}", drawn.join("")));
            row += 1;
        }
        if let Some(region) = view.current_region {
            lines.push(format!("region {region}"));
        }
        lines.join("\n")
    }

    fn write_text(&mut self, text: &str) {
        if let Err(error) = writeln!(self.out, "{text}") {
            eprintln!("[keychase] failed to draw: {error}");
        }
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn on_level_loaded(&mut self, level: &LevelSpec) {
        self.level = Some(level.clone());
        let message = level.message.clone().unwrap_or_default();
        self.write_text(&format!("LEVEL {}  {message}", level.id));
    }

    fn on_state_changed(&mut self, view: &StateView) {
        let text = self.render(view);
        self.write_text(&text);
    }

    fn on_invalid_move(&mut self, cell: &str) {
        self.write_text(&format!("can't move to {}", key_label(cell)));
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        let text = match outcome {
            Outcome::Won => "LEVEL COMPLETE",
            Outcome::Lost => "GAME OVER - PRESS R TO RESTART",
            Outcome::InProgress => return,
        };
        self.write_text(text);
    }
}
