#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! World-state model and successor generation for Maze Pursuit.
//!
//! [`WorldState`] is the unit of search: a value-semantics snapshot of the
//! maze grid, the pursued agent, every pursuer, and the score/lives tally.
//! [`apply_action`] advances a snapshot by one agent's one action and always
//! returns a fresh value, so search trees may branch from the same parent
//! repeatedly without aliasing.

use maze_pursuit_core::{Action, CellCoord, GridError, Tile};

/// Score awarded when the pursued agent consumes a pellet.
pub const PELLET_REWARD: i64 = 10;

/// Score awarded when the pursued agent consumes an energizer.
pub const ENERGIZER_REWARD: i64 = 50;

/// Rectangular maze of tiles stored in dense row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    columns: u32,
    rows: u32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid from ordered rows of tiles.
    ///
    /// Rejects grids with zero rows or zero columns and grids whose rows
    /// disagree on length, so downstream indexing never observes a malformed
    /// shape.
    pub fn from_rows(rows: Vec<Vec<Tile>>) -> Result<Self, GridError> {
        let row_count = rows.len();
        let column_count = rows.first().map_or(0, Vec::len);
        if row_count == 0 || column_count == 0 {
            return Err(GridError::Empty);
        }

        let mut tiles = Vec::with_capacity(row_count * column_count);
        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != column_count {
                return Err(GridError::Ragged {
                    row: row_index,
                    length: row.len(),
                    expected: column_count,
                });
            }
            tiles.extend(row);
        }

        let columns = u32::try_from(column_count).map_err(|_| GridError::Empty)?;
        let rows = u32::try_from(row_count).map_err(|_| GridError::Empty)?;
        Ok(Self {
            columns,
            rows,
            tiles,
        })
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Tile stored at the provided cell, if it lies within bounds.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Reports whether the cell lies within bounds and holds a traversable
    /// tile. This is the only traversability check the engine performs.
    #[must_use]
    pub fn is_traversable(&self, cell: CellCoord) -> bool {
        self.tile(cell).is_some_and(Tile::is_traversable)
    }

    /// Clamps a signed column/row pair into the grid's coordinate range.
    #[must_use]
    pub fn clamp(&self, column: i64, row: i64) -> CellCoord {
        let max_column = i64::from(self.columns.saturating_sub(1));
        let max_row = i64::from(self.rows.saturating_sub(1));
        let column = column.clamp(0, max_column);
        let row = row.clamp(0, max_row);
        CellCoord::new(column as u32, row as u32)
    }

    pub(crate) fn set_tile(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.tiles.get_mut(index) {
                *slot = tile;
            }
        }
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() < self.columns && cell.row() < self.rows {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Agent slot within the fixed turn order of a search.
///
/// Slot 0 is the pursued agent; slot `i >= 1` is pursuer `i - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Agent {
    /// The pursued agent, the maximizer in adversarial search.
    Pursued,
    /// A pursuer by zero-based roster index, a minimizer.
    Pursuer(usize),
}

/// Immutable snapshot of the maze and every agent, used as the unit of
/// search. Constructed fresh from live game data at the start of a search
/// call and discarded with the rest of the tree afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldState {
    grid: Grid,
    pursued: CellCoord,
    pursuers: Vec<CellCoord>,
    score: i64,
    lives: u32,
}

impl WorldState {
    /// Creates a snapshot from the provided grid and agent positions.
    #[must_use]
    pub fn new(
        grid: Grid,
        pursued: CellCoord,
        pursuers: Vec<CellCoord>,
        score: i64,
        lives: u32,
    ) -> Self {
        Self {
            grid,
            pursued,
            pursuers,
            score,
            lives,
        }
    }

    /// Maze grid captured by the snapshot.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Cell occupied by the pursued agent.
    #[must_use]
    pub const fn pursued(&self) -> CellCoord {
        self.pursued
    }

    /// Cells occupied by the pursuers in roster order.
    #[must_use]
    pub fn pursuers(&self) -> &[CellCoord] {
        &self.pursuers
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> i64 {
        self.score
    }

    /// Remaining lives.
    #[must_use]
    pub const fn lives(&self) -> u32 {
        self.lives
    }
}

/// Advances a snapshot by one agent's one action, returning a new value.
///
/// A destination outside the grid or on a non-traversable tile leaves the
/// acting agent in place; the result is still a fresh snapshot. Only the
/// pursued agent consumes tiles: stepping onto a pellet or energizer rewrites
/// that cell to [`Tile::Empty`] on the copy and adds the fixed reward.
/// Pursuer moves never modify the grid or score. The input snapshot is never
/// mutated.
#[must_use]
pub fn apply_action(state: &WorldState, agent: Agent, action: Action) -> WorldState {
    let mut next = state.clone();

    let origin = match agent {
        Agent::Pursued => next.pursued,
        Agent::Pursuer(index) => match next.pursuers.get(index) {
            Some(cell) => *cell,
            None => return next,
        },
    };

    let Some(destination) = origin.offset_by(action.offset()) else {
        return next;
    };

    if !next.grid.is_traversable(destination) {
        return next;
    }

    match agent {
        Agent::Pursued => {
            next.pursued = destination;
            match next.grid.tile(destination) {
                Some(Tile::Pellet) => {
                    next.grid.set_tile(destination, Tile::Empty);
                    next.score += PELLET_REWARD;
                }
                Some(Tile::Energizer) => {
                    next.grid.set_tile(destination, Tile::Empty);
                    next.score += ENERGIZER_REWARD;
                }
                _ => {}
            }
        }
        Agent::Pursuer(index) => {
            next.pursuers[index] = destination;
        }
    }

    next
}

/// Query functions that provide read-only access to snapshots and grids.
pub mod query {
    use super::{Grid, WorldState};
    use maze_pursuit_core::{Action, CellCoord, Tile};

    /// Stepping actions whose destination is traversable from the cell, in
    /// the fixed east, south, west, north order. `Wait` is never listed; it
    /// is the caller's fallback when the result is empty.
    #[must_use]
    pub fn legal_actions(grid: &Grid, cell: CellCoord) -> Vec<Action> {
        Action::STEPS
            .iter()
            .copied()
            .filter(|action| {
                cell.offset_by(action.offset())
                    .is_some_and(|destination| grid.is_traversable(destination))
            })
            .collect()
    }

    /// Number of pellet and energizer tiles still on the grid.
    #[must_use]
    pub fn remaining_pellets(grid: &Grid) -> usize {
        all_cells(grid)
            .filter(|cell| is_consumable(grid, *cell))
            .count()
    }

    /// Manhattan distance from the cell to the nearest remaining pellet or
    /// energizer, or `None` once the grid is bare.
    #[must_use]
    pub fn nearest_pellet_distance(grid: &Grid, cell: CellCoord) -> Option<u32> {
        all_cells(grid)
            .filter(|candidate| is_consumable(grid, *candidate))
            .map(|candidate| cell.manhattan_distance(candidate))
            .min()
    }

    /// Reports whether the snapshot is terminal for adversarial search:
    /// every pellet consumed, or the pursued agent sharing a cell with any
    /// pursuer.
    #[must_use]
    pub fn is_terminal(state: &WorldState) -> bool {
        if state
            .pursuers()
            .iter()
            .any(|pursuer| *pursuer == state.pursued())
        {
            return true;
        }
        remaining_pellets(state.grid()) == 0
    }

    fn is_consumable(grid: &Grid, cell: CellCoord) -> bool {
        matches!(grid.tile(cell), Some(Tile::Pellet | Tile::Energizer))
    }

    fn all_cells(grid: &Grid) -> impl Iterator<Item = CellCoord> + '_ {
        (0..grid.rows())
            .flat_map(move |row| (0..grid.columns()).map(move |column| CellCoord::new(column, row)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_pursuit_core::{Direction, GridError, WallKind};

    fn open_grid(columns: u32, rows: u32) -> Grid {
        let row: Vec<Tile> = (0..columns).map(|_| Tile::Empty).collect();
        Grid::from_rows((0..rows).map(|_| row.clone()).collect()).expect("valid grid")
    }

    fn grid_with(tiles: &[(CellCoord, Tile)], columns: u32, rows: u32) -> Grid {
        let mut grid = open_grid(columns, rows);
        for (cell, tile) in tiles {
            grid.set_tile(*cell, *tile);
        }
        grid
    }

    #[test]
    fn from_rows_rejects_empty_grids() {
        assert_eq!(Grid::from_rows(Vec::new()), Err(GridError::Empty));
        assert_eq!(Grid::from_rows(vec![Vec::new()]), Err(GridError::Empty));
    }

    #[test]
    fn from_rows_rejects_ragged_rows() {
        let rows = vec![vec![Tile::Empty, Tile::Empty], vec![Tile::Empty]];
        assert_eq!(
            Grid::from_rows(rows),
            Err(GridError::Ragged {
                row: 1,
                length: 1,
                expected: 2,
            })
        );
    }

    #[test]
    fn traversability_combines_bounds_and_classifier() {
        let wall = CellCoord::new(1, 1);
        let grid = grid_with(&[(wall, Tile::Wall(WallKind::Horizontal))], 3, 3);

        assert!(grid.is_traversable(CellCoord::new(0, 0)));
        assert!(!grid.is_traversable(wall));
        assert!(!grid.is_traversable(CellCoord::new(3, 0)));
        assert!(!grid.is_traversable(CellCoord::new(0, 3)));
    }

    #[test]
    fn clamp_pins_signed_coordinates_to_bounds() {
        let grid = open_grid(5, 4);
        assert_eq!(grid.clamp(-3, -1), CellCoord::new(0, 0));
        assert_eq!(grid.clamp(9, 9), CellCoord::new(4, 3));
        assert_eq!(grid.clamp(2, 2), CellCoord::new(2, 2));
    }

    #[test]
    fn apply_action_never_mutates_its_input() {
        let pellet = CellCoord::new(1, 0);
        let grid = grid_with(&[(pellet, Tile::Pellet)], 3, 3);
        let state = WorldState::new(grid, CellCoord::new(0, 0), vec![CellCoord::new(2, 2)], 0, 3);

        let east = apply_action(&state, Agent::Pursued, Action::Step(Direction::East));
        let south = apply_action(&state, Agent::Pursued, Action::Step(Direction::South));

        assert_eq!(state.pursued(), CellCoord::new(0, 0));
        assert_eq!(state.score(), 0);
        assert_eq!(state.grid().tile(pellet), Some(Tile::Pellet));
        assert_eq!(east.pursued(), pellet);
        assert_eq!(east.score(), PELLET_REWARD);
        assert_eq!(east.grid().tile(pellet), Some(Tile::Empty));
        assert_eq!(south.pursued(), CellCoord::new(0, 1));
        assert_eq!(south.score(), 0);
    }

    #[test]
    fn pursued_consumes_energizer_for_larger_reward() {
        let energizer = CellCoord::new(0, 1);
        let grid = grid_with(&[(energizer, Tile::Energizer)], 2, 2);
        let state = WorldState::new(grid, CellCoord::new(0, 0), Vec::new(), 5, 3);

        let next = apply_action(&state, Agent::Pursued, Action::Step(Direction::South));

        assert_eq!(next.score(), 5 + ENERGIZER_REWARD);
        assert_eq!(next.grid().tile(energizer), Some(Tile::Empty));
    }

    #[test]
    fn blocked_destination_is_a_positional_no_op() {
        let wall = CellCoord::new(1, 0);
        let grid = grid_with(&[(wall, Tile::Wall(WallKind::Vertical))], 3, 1);
        let state = WorldState::new(grid, CellCoord::new(0, 0), Vec::new(), 0, 3);

        let next = apply_action(&state, Agent::Pursued, Action::Step(Direction::East));

        assert_eq!(next.pursued(), CellCoord::new(0, 0));
        assert_eq!(next, state);
    }

    #[test]
    fn pursuer_moves_leave_grid_and_score_untouched() {
        let pellet = CellCoord::new(1, 1);
        let grid = grid_with(&[(pellet, Tile::Pellet)], 3, 3);
        let state = WorldState::new(grid, CellCoord::new(0, 0), vec![CellCoord::new(1, 0)], 0, 3);

        let next = apply_action(&state, Agent::Pursuer(0), Action::Step(Direction::South));

        assert_eq!(next.pursuers(), &[pellet]);
        assert_eq!(next.score(), 0);
        assert_eq!(next.grid().tile(pellet), Some(Tile::Pellet));
    }

    #[test]
    fn unknown_pursuer_index_returns_unchanged_copy() {
        let state = WorldState::new(open_grid(2, 2), CellCoord::new(0, 0), Vec::new(), 0, 3);
        let next = apply_action(&state, Agent::Pursuer(4), Action::Step(Direction::East));
        assert_eq!(next, state);
    }

    #[test]
    fn legal_actions_follow_expansion_order() {
        let wall = CellCoord::new(1, 0);
        let grid = grid_with(&[(wall, Tile::Wall(WallKind::CornerNw))], 3, 3);

        let actions = query::legal_actions(&grid, CellCoord::new(0, 0));

        assert_eq!(actions, vec![Action::Step(Direction::South)]);
        let open = query::legal_actions(&grid, CellCoord::new(1, 1));
        assert_eq!(
            open,
            vec![
                Action::Step(Direction::East),
                Action::Step(Direction::South),
                Action::Step(Direction::West),
            ]
        );
    }

    #[test]
    fn terminal_requires_bare_grid_or_collision() {
        let pellet = CellCoord::new(2, 2);
        let grid = grid_with(&[(pellet, Tile::Pellet)], 3, 3);
        let live = WorldState::new(
            grid.clone(),
            CellCoord::new(0, 0),
            vec![CellCoord::new(2, 0)],
            0,
            3,
        );
        assert!(!query::is_terminal(&live));

        let caught = WorldState::new(
            grid,
            CellCoord::new(2, 0),
            vec![CellCoord::new(2, 0)],
            0,
            3,
        );
        assert!(query::is_terminal(&caught));

        let cleared = WorldState::new(
            open_grid(3, 3),
            CellCoord::new(0, 0),
            vec![CellCoord::new(2, 0)],
            0,
            3,
        );
        assert!(query::is_terminal(&cleared));
    }

    #[test]
    fn nearest_pellet_distance_scans_consumables() {
        let grid = grid_with(
            &[
                (CellCoord::new(2, 2), Tile::Pellet),
                (CellCoord::new(0, 3), Tile::Energizer),
            ],
            4,
            4,
        );

        assert_eq!(
            query::nearest_pellet_distance(&grid, CellCoord::new(0, 0)),
            Some(3)
        );
        assert_eq!(query::remaining_pellets(&grid), 2);
        assert_eq!(
            query::nearest_pellet_distance(&open_grid(2, 2), CellCoord::new(0, 0)),
            None
        );
    }
}
