//! Uniform grid spatial index.
//!
//! Each agent occupies exactly one cell; relocating an agent is a
//! delete-then-insert. `cell_size` should be tuned to roughly the median of
//! the communication range and the typical neighbor-query radius — that
//! gives O(1) expected neighbors per query. Too small and queries scan many
//! empty cells; too large and each cell holds most of the population.

use std::collections::{HashMap, HashSet};

use swarm_types::{AgentId, Point2};

pub type CellKey = (i64, i64);

pub struct Grid {
    cell_size: f64,
    cells: HashMap<CellKey, HashSet<AgentId>>,
    cell_of: HashMap<AgentId, CellKey>,
}

impl Grid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: HashMap::new(),
            cell_of: HashMap::new(),
        }
    }

    pub fn key_for(&self, p: Point2) -> CellKey {
        ((p.x / self.cell_size).floor() as i64, (p.y / self.cell_size).floor() as i64)
    }

    /// Place or relocate `id` at `p`. No-op if it is already in the correct
    /// cell.
    pub fn upsert(&mut self, id: AgentId, p: Point2) {
        let key = self.key_for(p);
        if self.cell_of.get(&id) == Some(&key) {
            return;
        }
        self.remove(id);
        self.cells.entry(key).or_default().insert(id);
        self.cell_of.insert(id, key);
    }

    pub fn remove(&mut self, id: AgentId) {
        if let Some(key) = self.cell_of.remove(&id) {
            if let Some(set) = self.cells.get_mut(&key) {
                set.remove(&id);
                if set.is_empty() {
                    self.cells.remove(&key);
                }
            }
        }
    }

    /// All agent ids whose cell is within Chebyshev distance
    /// `ceil(radius / cell_size)` of `center`'s cell.
    pub fn ids_within(&self, center: Point2, radius: f64) -> Vec<AgentId> {
        let center_key = self.key_for(center);
        let reach = (radius / self.cell_size).ceil() as i64;
        let mut out = Vec::new();
        for dx in -reach..=reach {
            for dy in -reach..=reach {
                let key = (center_key.0 + dx, center_key.1 + dy);
                if let Some(set) = self.cells.get(&key) {
                    out.extend(set.iter().copied());
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_then_remove_clears_cell() {
        let mut g = Grid::new(10.0);
        g.upsert(AgentId::new(1), Point2::new(5.0, 5.0));
        assert_eq!(g.ids_within(Point2::new(5.0, 5.0), 1.0), vec![AgentId::new(1)]);
        g.remove(AgentId::new(1));
        assert!(g.ids_within(Point2::new(5.0, 5.0), 1.0).is_empty());
    }

    #[test]
    fn relocation_moves_between_cells() {
        let mut g = Grid::new(10.0);
        let id = AgentId::new(1);
        g.upsert(id, Point2::new(5.0, 5.0));
        g.upsert(id, Point2::new(500.0, 500.0));
        assert!(g.ids_within(Point2::new(5.0, 5.0), 1.0).is_empty());
        assert_eq!(g.ids_within(Point2::new(500.0, 500.0), 1.0), vec![id]);
    }

    #[test]
    fn ids_within_covers_chebyshev_neighbors() {
        let mut g = Grid::new(10.0);
        let near = AgentId::new(1);
        let far = AgentId::new(2);
        g.upsert(near, Point2::new(12.0, 0.0));
        g.upsert(far, Point2::new(500.0, 500.0));
        let found = g.ids_within(Point2::new(0.0, 0.0), 15.0);
        assert!(found.contains(&near));
        assert!(!found.contains(&far));
    }
}
