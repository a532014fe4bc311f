use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::{BRIDGE_KEY, UNREACHABLE_DISTANCE};
use crate::keyboard::{bridge_adjacent, staggered_adjacent, visual_distance, Cell, Topology};
use crate::level::LevelSpec;

#[derive(Clone, Debug)]
pub struct Board {
    topology: Arc<Topology>,
    regions: Option<HashMap<String, u8>>,
}

impl Board {
    pub fn standard(topology: Arc<Topology>) -> Self {
        Self {
            topology,
            regions: None,
        }
    }

    pub fn for_level(topology: Arc<Topology>, level: &LevelSpec) -> Self {
        let regions = match (&level.regions, level.is_split()) {
            (Some(parts), true) => {
                let mut map = HashMap::new();
                for (region, keys) in parts.iter().enumerate() {
                    for key in keys {
                        map.entry(key.clone()).or_insert(region as u8);
                    }
                }
                Some(map)
            }
            (None, true) => Some(HashMap::new()),
            _ => None,
        };
        Self { topology, regions }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn is_split(&self) -> bool {
        self.regions.is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cell(id).is_some()
    }

    pub fn bridge_instance(&self, region: u8) -> String {
        let base = self.bridge_id();
        if self.is_split() {
            format!("{base}_{region}")
        } else {
            base.to_string()
        }
    }

    pub fn is_bridge(&self, id: &str) -> bool {
        self.topology.is_bridge(id) || self.instance_region(id).is_some()
    }

    pub fn logical<'a>(&'a self, id: &'a str) -> &'a str {
        if self.instance_region(id).is_some() {
            self.bridge_id()
        } else {
            id
        }
    }

    pub fn region_of(&self, id: &str) -> Option<u8> {
        let regions = self.regions.as_ref()?;
        if let Some(region) = self.instance_region(id) {
            return Some(region);
        }
        regions.get(id).copied()
    }

    pub fn is_adjacent(&self, a: &str, b: &str) -> bool {
        let (Some(cell_a), Some(cell_b)) = (self.cell(a), self.cell(b)) else {
            return false;
        };
        if cell_a.bridge && cell_b.bridge {
            return false;
        }
        let Some(regions) = self.regions.as_ref() else {
            return if cell_a.bridge {
                bridge_adjacent(cell_a, cell_b)
            } else if cell_b.bridge {
                bridge_adjacent(cell_b, cell_a)
            } else {
                staggered_adjacent(cell_a, cell_b)
            };
        };

        let same_region = match (self.region_of(a), self.region_of(b)) {
            (Some(ra), Some(rb)) => ra == rb,
            _ => false,
        };
        if !same_region {
            return false;
        }
        if cell_a.bridge {
            return bridge_adjacent(cell_a, cell_b);
        }
        if cell_b.bridge {
            return bridge_adjacent(cell_b, cell_a);
        }
        regions.contains_key(a) && regions.contains_key(b) && staggered_adjacent(cell_a, cell_b)
    }

    pub fn neighbors(&self, id: &str) -> Vec<String> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut out = Vec::new();
        for cell in self.topology.cells() {
            if cell.bridge && self.is_split() {
                for region in 0..2u8 {
                    let instance = self.bridge_instance(region);
                    if self.is_adjacent(id, &instance) {
                        out.push(instance);
                    }
                }
                continue;
            }
            if self.is_adjacent(id, &cell.id) {
                out.push(cell.id.clone());
            }
        }
        out
    }

    pub fn distance(&self, a: &str, b: &str) -> f64 {
        match (self.cell(a), self.cell(b)) {
            (Some(a), Some(b)) => visual_distance(a, b),
            _ => UNREACHABLE_DISTANCE,
        }
    }

    fn bridge_id(&self) -> &str {
        self.topology
            .bridge()
            .map(|cell| cell.id.as_str())
            .unwrap_or(BRIDGE_KEY)
    }

    fn instance_region(&self, id: &str) -> Option<u8> {
        if !self.is_split() {
            return None;
        }
        let suffix = id.strip_prefix(self.bridge_id())?.strip_prefix('_')?;
        match suffix {
            "0" => Some(0),
            "1" => Some(1),
            _ => None,
        }
    }

    // A bare bridge id is not a position under split; only its instances are.
    fn cell(&self, id: &str) -> Option<&Cell> {
        if self.instance_region(id).is_some() {
            return self.topology.bridge();
        }
        let cell = self.topology.cell(id)?;
        if cell.bridge && self.is_split() {
            return None;
        }
        Some(cell)
    }
}
