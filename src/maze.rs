use crate::grid::{Grid, Side};
use crate::rng::Rng;

/// Carves a perfect maze into `grid` with a randomized depth-first
/// backtracker starting at (0, 0). Previous walls and visit marks are
/// discarded first. Returns the number of passages carved, which is always
/// `cols * rows - 1` on a non-empty grid.
pub fn generate_maze(grid: &mut Grid, rng: &mut Rng) -> usize {
    grid.reset();
    let Some(start) = grid.cell_at_mut(0, 0) else {
        return 0;
    };
    start.visited = true;

    let mut current = (0, 0);
    let mut stack = vec![current];
    let mut carved = 0;

    while !stack.is_empty() {
        let candidates = unvisited_neighbors(grid, current.0, current.1);
        if let Some(&(side, next)) = rng.pick(&candidates) {
            if let Some(cell) = grid.cell_at_mut(next.0, next.1) {
                cell.visited = true;
            }
            stack.push(current);
            grid.remove_wall(current.0, current.1, side);
            carved += 1;
            current = next;
        } else if let Some(previous) = stack.pop() {
            current = previous;
        }
    }
    carved
}

fn unvisited_neighbors(grid: &Grid, i: i32, j: i32) -> Vec<(Side, (i32, i32))> {
    Side::ALL
        .into_iter()
        .filter_map(|side| {
            let (ni, nj) = grid.neighbor(i, j, side)?;
            let cell = grid.cell_at(ni, nj)?;
            (!cell.visited).then_some((side, (ni, nj)))
        })
        .collect()
}
