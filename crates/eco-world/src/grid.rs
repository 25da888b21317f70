//! Rectangular field of cells, each holding at most one animal.

use eco_core::{Coordinate, Occupant, Species};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A bounded (non-wrapping) 2D grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Option<Occupant>>,
}

impl Grid {
    /// Both dimensions must be positive.
    pub fn new(rows: i32, cols: i32) -> Self {
        assert!(
            rows > 0 && cols > 0,
            "grid dimensions must be positive, got {rows}x{cols}"
        );
        let size = (rows * cols) as usize;
        Self {
            rows,
            cols,
            cells: vec![None; size],
        }
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn contains(&self, location: Coordinate) -> bool {
        (0..self.rows).contains(&location.row) && (0..self.cols).contains(&location.col)
    }

    /// Empty every cell
    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    /// Empty one cell
    pub fn clear_at(&mut self, location: Coordinate) {
        let index = self.index(location);
        self.cells[index] = None;
    }

    /// Put an occupant at a location, replacing whatever was there. The
    /// replaced animal is not told; keeping it consistent is up to the caller.
    pub fn place(&mut self, occupant: Occupant, location: Coordinate) {
        let index = self.index(location);
        self.cells[index] = Some(occupant);
    }

    pub fn get(&self, location: Coordinate) -> Option<Occupant> {
        self.cells[self.index(location)]
    }

    pub fn is_free(&self, location: Coordinate) -> bool {
        self.get(location).is_none()
    }

    /// All in-bounds cells adjacent to `location` (diagonals included),
    /// shuffled. Callers that take the first match therefore get a random one.
    pub fn adjacent_locations<R: Rng + ?Sized>(
        &self,
        location: Coordinate,
        rng: &mut R,
    ) -> Vec<Coordinate> {
        assert!(
            self.contains(location),
            "location {location} outside {}x{} grid",
            self.rows,
            self.cols
        );

        let mut locations = Vec::with_capacity(8);
        for d_row in -1..=1 {
            for d_col in -1..=1 {
                if d_row == 0 && d_col == 0 {
                    continue;
                }
                let next = location.offset(d_row, d_col);
                if self.contains(next) {
                    locations.push(next);
                }
            }
        }

        locations.shuffle(rng);
        locations
    }

    /// The empty cells among [`Grid::adjacent_locations`], in the same order
    pub fn free_adjacent_locations<R: Rng + ?Sized>(
        &self,
        location: Coordinate,
        rng: &mut R,
    ) -> Vec<Coordinate> {
        self.adjacent_locations(location, rng)
            .into_iter()
            .filter(|&next| self.is_free(next))
            .collect()
    }

    /// A random empty adjacent cell, if there is one
    pub fn free_adjacent_location<R: Rng + ?Sized>(
        &self,
        location: Coordinate,
        rng: &mut R,
    ) -> Option<Coordinate> {
        self.free_adjacent_locations(location, rng).into_iter().next()
    }

    fn index(&self, location: Coordinate) -> usize {
        assert!(
            self.contains(location),
            "location {location} outside {}x{} grid",
            self.rows,
            self.cols
        );
        (location.row * self.cols + location.col) as usize
    }

    /// Get position from index
    pub fn index_to_location(&self, index: usize) -> Coordinate {
        let row = (index as i32) / self.cols;
        let col = (index as i32) % self.cols;
        Coordinate::new(row, col)
    }

    /// Iterator over every cell in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, Option<Occupant>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, cell)| (self.index_to_location(i), *cell))
    }

    /// Iterator over occupied cells only
    pub fn occupants(&self) -> impl Iterator<Item = (Coordinate, Occupant)> + '_ {
        self.iter()
            .filter_map(|(location, cell)| cell.map(|occupant| (location, occupant)))
    }

    /// Read-only view of which species sits where
    pub fn snapshot(&self) -> FieldSnapshot {
        FieldSnapshot {
            rows: self.rows,
            cols: self.cols,
            cells: self
                .cells
                .iter()
                .map(|cell| cell.map(|occupant| occupant.species))
                .collect(),
        }
    }
}

/// Occupancy of every cell at one moment, for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub rows: i32,
    pub cols: i32,
    cells: Vec<Option<Species>>,
}

impl FieldSnapshot {
    /// Species at a location; `None` for an empty or out-of-range cell
    pub fn species_at(&self, location: Coordinate) -> Option<Species> {
        if !(0..self.rows).contains(&location.row) || !(0..self.cols).contains(&location.col) {
            return None;
        }
        self.cells[(location.row * self.cols + location.col) as usize]
    }

    /// Rows of cells, top to bottom
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Option<Species>]> + '_ {
        self.cells.chunks(self.cols as usize)
    }

    pub fn count(&self, species: Species) -> usize {
        self.cells
            .iter()
            .filter(|cell| **cell == Some(species))
            .count()
    }
}
