//! Uniform grid over enemy positions for hit-detection broad phase.
//!
//! The grid is rebuilt from scratch once per tick.  Queries are a conservative
//! over-approximation: they return every enemy whose *centre* falls in a cell
//! touched by the query box grown by the largest enemy half-extent, and the
//! caller still runs the exact AABB test.
//!
//! ## Cell size
//!
//! [`GRID_CELL_SIZE`] = 100 keeps a whip swing (≈ 150 × 30) or a garlic aura
//! (radius 60–250) inside a handful of cells, while a crowd of a few hundred
//! chasers spreads across enough cells that each query touches only a small
//! fraction of them.

use crate::enemy::{EnemyArena, EnemyId};
use crate::geometry::Aabb;
use bevy::math::Vec2;
use std::collections::HashMap;

/// Side length of one grid cell (world units).
pub const GRID_CELL_SIZE: f32 = 100.0;

#[derive(Debug, Clone, Default)]
pub struct SpatialGrid {
    /// Map from cell coordinates to the enemies whose centre lies in that cell.
    cells: HashMap<(i32, i32), Vec<EnemyId>>,
    /// Largest enemy half-extent seen during the last rebuild.
    max_half: f32,
}

impl SpatialGrid {
    fn world_to_cell(pos: Vec2) -> (i32, i32) {
        let x = (pos.x / GRID_CELL_SIZE).floor() as i32;
        let y = (pos.y / GRID_CELL_SIZE).floor() as i32;
        (x, y)
    }

    pub fn insert(&mut self, id: EnemyId, pos: Vec2, half: f32) {
        let cell = Self::world_to_cell(pos);
        self.cells.entry(cell).or_default().push(id);
        self.max_half = self.max_half.max(half);
    }

    /// Clear all grid data (call before each rebuild).
    pub fn clear(&mut self) {
        // Drop cells left empty by the previous frame, then reuse the rest.
        self.cells.retain(|_, v| !v.is_empty());
        for v in self.cells.values_mut() {
            v.clear();
        }
        self.max_half = 0.0;
    }

    /// Rebuild from the current enemy positions.
    pub fn rebuild(&mut self, enemies: &EnemyArena) {
        self.clear();
        for (id, enemy) in enemies.iter() {
            self.insert(id, enemy.pos, enemy.size);
        }
    }

    /// Candidate enemies for `area`, sorted into slot order.
    ///
    /// Sorting makes the result order identical to a brute-force scan of the
    /// arena, which is the tie-break order for pierce-limited effects.
    pub fn query(&self, area: &Aabb) -> Vec<EnemyId> {
        let reach = area.half + Vec2::splat(self.max_half);
        let (x0, y0) = Self::world_to_cell(area.center - reach);
        let (x1, y1) = Self::world_to_cell(area.center + reach);

        let mut found = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                if let Some(ids) = self.cells.get(&(x, y)) {
                    found.extend_from_slice(ids);
                }
            }
        }
        found.sort_unstable_by_key(|id| id.index);
        found
    }

    pub fn len(&self) -> usize {
        self.cells.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnemyTable;
    use crate::enemy::{Enemy, EnemyKind};

    fn arena_with(points: &[Vec2]) -> EnemyArena {
        let table = EnemyTable::default();
        let mut arena = EnemyArena::new();
        for &p in points {
            arena.insert(Enemy::new(EnemyKind::Chaser, &table.chaser, p, 1.0));
        }
        arena
    }

    #[test]
    fn query_matches_brute_force() {
        let points: Vec<Vec2> = (0..60)
            .map(|i| Vec2::new((i * 37 % 900) as f32, (i * 53 % 700) as f32))
            .collect();
        let arena = arena_with(&points);
        let mut grid = SpatialGrid::default();
        grid.rebuild(&arena);
        assert_eq!(grid.len(), 60);

        let area = Aabb::new(Vec2::new(400.0, 300.0), Vec2::new(120.0, 40.0));
        let exact: Vec<EnemyId> = arena
            .iter()
            .filter(|(_, e)| e.body().overlaps(&area))
            .map(|(id, _)| id)
            .collect();
        let via_grid: Vec<EnemyId> = grid
            .query(&area)
            .into_iter()
            .filter(|id| arena.get(*id).is_some_and(|e| e.body().overlaps(&area)))
            .collect();
        assert_eq!(exact, via_grid);
    }

    #[test]
    fn candidates_come_back_in_slot_order() {
        // Slot 0 sits in a later cell than slot 1.
        let arena = arena_with(&[Vec2::new(250.0, 250.0), Vec2::new(150.0, 150.0)]);
        let mut grid = SpatialGrid::default();
        grid.rebuild(&arena);
        let ids = grid.query(&Aabb::square(Vec2::new(200.0, 200.0), 100.0));
        assert_eq!(ids.len(), 2);
        assert!(ids[0].index < ids[1].index);
    }

    #[test]
    fn cells_left_empty_are_dropped() {
        let mut grid = SpatialGrid::default();
        grid.rebuild(&arena_with(&[Vec2::new(150.0, 150.0)]));
        let moved = arena_with(&[Vec2::new(850.0, 850.0)]);
        grid.rebuild(&moved);
        grid.rebuild(&moved);
        assert_eq!(grid.cells.len(), 1);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn clear_empties_grid() {
        let arena = arena_with(&[Vec2::ZERO, Vec2::splat(500.0)]);
        let mut grid = SpatialGrid::default();
        grid.rebuild(&arena);
        grid.clear();
        assert!(grid.is_empty());
        assert!(grid.query(&Aabb::square(Vec2::ZERO, 1000.0)).is_empty());
    }
}
