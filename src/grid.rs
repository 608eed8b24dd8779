use std::collections::{HashSet, VecDeque};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top = 0,
    Right = 1,
    Bottom = 2,
    Left = 3,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn offset(self) -> (i32, i32) {
        match self {
            Side::Top => (0, -1),
            Side::Right => (1, 0),
            Side::Bottom => (0, 1),
            Side::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Side {
        match self {
            Side::Top => Side::Bottom,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Left => Side::Right,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub i: i32,
    pub j: i32,
    pub walls: [bool; 4],
    pub visited: bool,
}

impl Cell {
    pub fn new(i: i32, j: i32) -> Self {
        Self {
            i,
            j,
            walls: [true; 4],
            visited: false,
        }
    }

    pub fn has_wall(&self, side: Side) -> bool {
        self.walls[side.index()]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    cols: i32,
    rows: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(cols: i32, rows: i32) -> Self {
        let mut cells = Vec::with_capacity((cols.max(0) * rows.max(0)) as usize);
        for j in 0..rows {
            for i in 0..cols {
                cells.push(Cell::new(i, j));
            }
        }
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn index_of(&self, i: i32, j: i32) -> Option<usize> {
        if i < 0 || j < 0 || i >= self.cols || j >= self.rows {
            return None;
        }
        Some((i + j * self.cols) as usize)
    }

    pub fn cell_at(&self, i: i32, j: i32) -> Option<&Cell> {
        self.index_of(i, j).and_then(|idx| self.cells.get(idx))
    }

    pub fn cell_at_mut(&mut self, i: i32, j: i32) -> Option<&mut Cell> {
        let idx = self.index_of(i, j)?;
        self.cells.get_mut(idx)
    }

    pub fn neighbor(&self, i: i32, j: i32, side: Side) -> Option<(i32, i32)> {
        self.index_of(i, j)?;
        let (dx, dy) = side.offset();
        let (ni, nj) = (i + dx, j + dy);
        self.index_of(ni, nj).map(|_| (ni, nj))
    }

    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.walls = [true; 4];
            cell.visited = false;
        }
    }

    pub fn remove_wall(&mut self, i: i32, j: i32, side: Side) -> bool {
        let Some((ni, nj)) = self.neighbor(i, j, side) else {
            return false;
        };
        self.set_shared_wall(i, j, ni, nj, side, false);
        true
    }

    /// Inverts every wall of `(i, j)` that it shares with a neighbour,
    /// mirroring each change onto the neighbour. Perimeter walls stay.
    pub fn toggle_walls(&mut self, i: i32, j: i32) {
        for side in Side::ALL {
            let Some((ni, nj)) = self.neighbor(i, j, side) else {
                continue;
            };
            let present = self
                .cell_at(i, j)
                .map(|cell| cell.has_wall(side))
                .unwrap_or(true);
            self.set_shared_wall(i, j, ni, nj, side, !present);
        }
    }

    fn set_shared_wall(&mut self, i: i32, j: i32, ni: i32, nj: i32, side: Side, present: bool) {
        if let Some(cell) = self.cell_at_mut(i, j) {
            cell.walls[side.index()] = present;
        }
        if let Some(other) = self.cell_at_mut(ni, nj) {
            other.walls[side.opposite().index()] = present;
        }
    }

    pub fn blocks(&self, i: i32, j: i32, side: Side) -> bool {
        self.cell_at(i, j)
            .map(|cell| cell.has_wall(side))
            .unwrap_or(true)
    }

    pub fn is_perimeter(&self, i: i32, j: i32, side: Side) -> bool {
        self.neighbor(i, j, side).is_none()
    }

    pub fn passage_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| {
                [Side::Right, Side::Bottom]
                    .into_iter()
                    .filter(|side| {
                        self.neighbor(cell.i, cell.j, *side).is_some() && !cell.has_wall(*side)
                    })
                    .count()
            })
            .sum()
    }

    pub fn walls_are_symmetric(&self) -> bool {
        self.cells.iter().all(|cell| {
            Side::ALL.into_iter().all(|side| {
                match self
                    .neighbor(cell.i, cell.j, side)
                    .and_then(|(ni, nj)| self.cell_at(ni, nj))
                {
                    Some(other) => cell.has_wall(side) == other.has_wall(side.opposite()),
                    None => true,
                }
            })
        })
    }

    pub fn reachable_from(&self, i: i32, j: i32) -> HashSet<(i32, i32)> {
        let mut out = HashSet::new();
        if self.index_of(i, j).is_none() {
            return out;
        }
        let mut queue = VecDeque::new();
        out.insert((i, j));
        queue.push_back((i, j));

        while let Some((ci, cj)) = queue.pop_front() {
            for side in Side::ALL {
                if self.blocks(ci, cj, side) {
                    continue;
                }
                let Some(next) = self.neighbor(ci, cj, side) else {
                    continue;
                };
                if out.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    pub fn path_between(&self, from: (i32, i32), to: (i32, i32)) -> Option<Vec<(i32, i32)>> {
        let start = self.index_of(from.0, from.1)?;
        let goal = self.index_of(to.0, to.1)?;
        let mut came_from: Vec<Option<usize>> = vec![None; self.cells.len()];
        let mut seen = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();
        seen[start] = true;
        queue.push_back(from);

        while let Some((ci, cj)) = queue.pop_front() {
            if (ci, cj) == to {
                break;
            }
            let Some(current) = self.index_of(ci, cj) else {
                continue;
            };
            for side in Side::ALL {
                if self.blocks(ci, cj, side) {
                    continue;
                }
                let Some((ni, nj)) = self.neighbor(ci, cj, side) else {
                    continue;
                };
                let Some(next) = self.index_of(ni, nj) else {
                    continue;
                };
                if !seen[next] {
                    seen[next] = true;
                    came_from[next] = Some(current);
                    queue.push_back((ni, nj));
                }
            }
        }

        if !seen[goal] {
            return None;
        }
        let mut path = Vec::new();
        let mut cursor = Some(goal);
        while let Some(idx) = cursor {
            let cell = &self.cells[idx];
            path.push((cell.i, cell.j));
            cursor = came_from[idx];
        }
        path.reverse();
        Some(path)
    }

    pub fn wall_flags(&self) -> Vec<[bool; 4]> {
        self.cells.iter().map(|cell| cell.walls).collect()
    }
}

pub fn cell_of_point(x: f32, y: f32, cell_size: f32) -> (i32, i32) {
    ((x / cell_size).floor() as i32, (y / cell_size).floor() as i32)
}

pub fn cell_center(i: i32, j: i32, cell_size: f32) -> (f32, f32) {
    (
        i as f32 * cell_size + cell_size / 2.0,
        j as f32 * cell_size + cell_size / 2.0,
    )
}
