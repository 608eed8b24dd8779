use crate::grid::{cell_of_point, Grid, Side};
use crate::player::Player;
use crate::types::Axis;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveOutcome {
    pub moved_x: bool,
    pub moved_y: bool,
    pub blocked_x: bool,
    pub blocked_y: bool,
    pub jumped_x: bool,
    pub jumped_y: bool,
}

impl MoveOutcome {
    pub fn jumps(&self) -> impl Iterator<Item = Axis> {
        [
            self.jumped_x.then_some(Axis::Horizontal),
            self.jumped_y.then_some(Axis::Vertical),
        ]
        .into_iter()
        .flatten()
    }
}

enum AxisResult {
    Idle,
    Open,
    Jumped,
    Blocked,
}

/// Applies `(dx, dy)` pixels, checking both axes against the walls of the
/// cell the player stood in before the move. A present wall blocks its axis
/// unless a jump charge is spent, in which case the delta goes through;
/// perimeter walls always block. Callers keep each delta below the cell size.
pub fn resolve_move(
    grid: &Grid,
    cell_size: f32,
    player: &mut Player,
    dx: f32,
    dy: f32,
) -> MoveOutcome {
    let mut outcome = MoveOutcome::default();
    let (ci, cj) = cell_of_point(player.x, player.y, cell_size);

    let x_side = if dx > 0.0 { Side::Right } else { Side::Left };
    match check_axis(grid, player, ci, cj, dx, x_side) {
        AxisResult::Idle => {}
        AxisResult::Open => outcome.moved_x = true,
        AxisResult::Jumped => {
            outcome.moved_x = true;
            outcome.jumped_x = true;
        }
        AxisResult::Blocked => outcome.blocked_x = true,
    }
    if outcome.moved_x {
        player.x += dx;
    }

    let y_side = if dy > 0.0 { Side::Bottom } else { Side::Top };
    match check_axis(grid, player, ci, cj, dy, y_side) {
        AxisResult::Idle => {}
        AxisResult::Open => outcome.moved_y = true,
        AxisResult::Jumped => {
            outcome.moved_y = true;
            outcome.jumped_y = true;
        }
        AxisResult::Blocked => outcome.blocked_y = true,
    }
    if outcome.moved_y {
        player.y += dy;
    }

    outcome
}

fn check_axis(
    grid: &Grid,
    player: &mut Player,
    ci: i32,
    cj: i32,
    delta: f32,
    side: Side,
) -> AxisResult {
    if delta == 0.0 {
        return AxisResult::Idle;
    }
    if !grid.blocks(ci, cj, side) {
        return AxisResult::Open;
    }
    if player.jump_charges > 0 && !grid.is_perimeter(ci, cj, side) {
        player.jump_charges -= 1;
        return AxisResult::Jumped;
    }
    AxisResult::Blocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::maze::generate_maze;
    use crate::rng::Rng;

    const CELL: f32 = 30.0;

    fn player_at(x: f32, y: f32) -> Player {
        let mut player = Player::spawn(&SessionConfig::default());
        player.x = x;
        player.y = y;
        player
    }

    #[test]
    fn moving_left_from_origin_hits_the_boundary() {
        let mut grid = Grid::new(20, 20);
        generate_maze(&mut grid, &mut Rng::new(1));
        let mut player = player_at(15.0, 15.0);

        let outcome = resolve_move(&grid, CELL, &mut player, -2.0, 0.0);
        assert_eq!(player.x, 15.0);
        assert!(outcome.blocked_x);
        assert!(!outcome.moved_x);
    }

    #[test]
    fn open_passage_applies_full_delta() {
        let mut grid = Grid::new(3, 3);
        grid.remove_wall(0, 0, Side::Right);
        let mut player = player_at(15.0, 15.0);

        let outcome = resolve_move(&grid, CELL, &mut player, 4.0, 0.0);
        assert_eq!(player.x, 19.0);
        assert!(outcome.moved_x);
    }

    #[test]
    fn wall_present_blocks_axis_without_charge() {
        let mut grid = Grid::new(3, 3);
        let mut rng = Rng::new(8);
        generate_maze(&mut grid, &mut rng);
        for cell in grid.cells() {
            let (x, y) = crate::grid::cell_center(cell.i, cell.j, CELL);
            for (dx, dy, side) in [
                (2.0, 0.0, Side::Right),
                (-2.0, 0.0, Side::Left),
                (0.0, 2.0, Side::Bottom),
                (0.0, -2.0, Side::Top),
            ] {
                let mut player = player_at(x, y);
                resolve_move(&grid, CELL, &mut player, dx, dy);
                if cell.has_wall(side) {
                    assert_eq!((player.x, player.y), (x, y));
                } else {
                    assert_eq!((player.x, player.y), (x + dx, y + dy));
                }
            }
        }
    }

    #[test]
    fn jump_charge_lets_the_delta_through_an_interior_wall() {
        let grid = Grid::new(3, 3);
        let mut player = player_at(15.0, 15.0);
        player.jump_charges = 1;

        let outcome = resolve_move(&grid, CELL, &mut player, 3.0, 0.0);
        assert_eq!(player.x, 18.0);
        assert!(outcome.jumped_x);
        assert!(outcome.moved_x);
        assert_eq!(player.jump_charges, 0);

        let outcome = resolve_move(&grid, CELL, &mut player, 3.0, 0.0);
        assert_eq!(player.x, 18.0);
        assert!(outcome.blocked_x);
    }

    #[test]
    fn both_axes_are_checked_against_the_starting_cell() {
        let mut grid = Grid::new(3, 3);
        grid.remove_wall(0, 0, Side::Bottom);
        let mut player = player_at(28.0, 15.0);
        player.jump_charges = 1;

        let outcome = resolve_move(&grid, CELL, &mut player, 3.0, 2.0);
        assert_eq!((player.x, player.y), (31.0, 17.0));
        assert!(outcome.jumped_x);
        assert!(outcome.moved_y);
        assert_eq!(outcome.jumps().collect::<Vec<_>>(), vec![Axis::Horizontal]);
    }

    #[test]
    fn perimeter_is_not_jumpable() {
        let grid = Grid::new(3, 3);
        let mut player = player_at(15.0, 15.0);
        player.jump_charges = 2;

        let outcome = resolve_move(&grid, CELL, &mut player, 0.0, -3.0);
        assert_eq!(player.y, 15.0);
        assert!(outcome.blocked_y);
        assert_eq!(player.jump_charges, 2);
    }

    #[test]
    fn blocked_axis_still_lets_the_other_slide() {
        let mut grid = Grid::new(3, 3);
        grid.remove_wall(0, 0, Side::Bottom);
        let mut player = player_at(15.0, 15.0);

        let outcome = resolve_move(&grid, CELL, &mut player, 2.0, 2.0);
        assert_eq!((player.x, player.y), (15.0, 17.0));
        assert!(outcome.blocked_x);
        assert!(outcome.moved_y);
        assert_eq!(outcome.jumps().count(), 0);
    }
}
