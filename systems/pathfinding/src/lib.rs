#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Interchangeable grid-pathfinding strategies for pursuer steering.
//!
//! All three strategies share one contract: explore the 4-connected
//! neighborhood in the fixed east, south, west, north order, reject
//! non-traversable neighbors, never expand a cell twice, and return the
//! route start to goal inclusive or `None` when the goal is unreachable.
//! Repeated runs over the same inputs are deterministic.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use maze_pursuit_core::{Action, CellCoord, Route, StrategyKind};
use maze_pursuit_world::Grid;

/// Runs the selected strategy against the provided grid.
#[must_use]
pub fn find_route(
    kind: StrategyKind,
    start: CellCoord,
    goal: CellCoord,
    grid: &Grid,
) -> Option<Route> {
    match kind {
        StrategyKind::BreadthFirst => breadth_first(start, goal, grid),
        StrategyKind::DepthFirst => depth_first(start, goal, grid),
        StrategyKind::AStar => a_star(start, goal, grid),
    }
}

/// Breadth-first search. The returned route has the minimum number of steps
/// whenever any route exists.
#[must_use]
pub fn breadth_first(start: CellCoord, goal: CellCoord, grid: &Grid) -> Option<Route> {
    let mut workspace = Workspace::new(start, goal, grid)?;
    if let Some(route) = workspace.trivial.take() {
        return Some(route);
    }

    let mut frontier = VecDeque::new();
    frontier.push_back(start);

    while let Some(cell) = frontier.pop_front() {
        if cell == goal {
            return workspace.rebuild();
        }
        for neighbor in neighbors(grid, cell) {
            if workspace.visit(neighbor, cell) {
                frontier.push_back(neighbor);
            }
        }
    }

    None
}

/// Depth-first search. Returns some route when one exists, with no length
/// guarantee; used where deliberately sub-optimal pursuit is wanted.
#[must_use]
pub fn depth_first(start: CellCoord, goal: CellCoord, grid: &Grid) -> Option<Route> {
    let mut workspace = Workspace::new(start, goal, grid)?;
    if let Some(route) = workspace.trivial.take() {
        return Some(route);
    }

    let mut frontier = vec![start];

    while let Some(cell) = frontier.pop() {
        if cell == goal {
            return workspace.rebuild();
        }
        for neighbor in neighbors(grid, cell) {
            if workspace.visit(neighbor, cell) {
                frontier.push(neighbor);
            }
        }
    }

    None
}

/// A* search ordered by steps-so-far plus Manhattan distance to the goal.
///
/// Manhattan distance never overestimates the true remaining cost on an
/// unweighted 4-connected grid, so the returned route length matches
/// breadth-first search. Equal priorities resolve by insertion order.
#[must_use]
pub fn a_star(start: CellCoord, goal: CellCoord, grid: &Grid) -> Option<Route> {
    let mut workspace = Workspace::new(start, goal, grid)?;
    if let Some(route) = workspace.trivial.take() {
        return Some(route);
    }

    let cell_count = workspace.parents.len();
    let mut best_cost = vec![u32::MAX; cell_count];
    let mut expanded = vec![false; cell_count];
    let mut sequence: u64 = 0;
    let mut open = BinaryHeap::new();

    let start_index = workspace.index(start)?;
    best_cost[start_index] = 0;
    open.push(OpenNode {
        priority: start.manhattan_distance(goal),
        sequence,
        cell: start,
    });

    while let Some(node) = open.pop() {
        let Some(cell_index) = workspace.index(node.cell) else {
            continue;
        };
        if expanded[cell_index] {
            continue;
        }
        expanded[cell_index] = true;

        if node.cell == goal {
            return workspace.rebuild();
        }

        let step_cost = best_cost[cell_index].saturating_add(1);
        for neighbor in neighbors(grid, node.cell) {
            let Some(neighbor_index) = workspace.index(neighbor) else {
                continue;
            };
            if expanded[neighbor_index] || step_cost >= best_cost[neighbor_index] {
                continue;
            }
            best_cost[neighbor_index] = step_cost;
            workspace.parents[neighbor_index] = Some(node.cell);
            sequence += 1;
            open.push(OpenNode {
                priority: step_cost.saturating_add(neighbor.manhattan_distance(goal)),
                sequence,
                cell: neighbor,
            });
        }
    }

    None
}

/// Dense row-major search scratch shared by all three strategies.
struct Workspace {
    columns: usize,
    rows: usize,
    visited: Vec<bool>,
    parents: Vec<Option<CellCoord>>,
    start: CellCoord,
    goal: CellCoord,
    trivial: Option<Route>,
}

impl Workspace {
    fn new(start: CellCoord, goal: CellCoord, grid: &Grid) -> Option<Self> {
        let columns = usize::try_from(grid.columns()).ok()?;
        let rows = usize::try_from(grid.rows()).ok()?;
        let cell_count = columns.checked_mul(rows)?;

        let mut workspace = Self {
            columns,
            rows,
            visited: vec![false; cell_count],
            parents: vec![None; cell_count],
            start,
            goal,
            trivial: None,
        };

        if start == goal {
            workspace.trivial = Some(Route::new(vec![start]));
            return Some(workspace);
        }

        let start_index = workspace.index(start)?;
        workspace.visited[start_index] = true;
        Some(workspace)
    }

    /// Marks the neighbor visited with the provided parent; false when the
    /// neighbor was already claimed or lies outside the buffers.
    fn visit(&mut self, neighbor: CellCoord, parent: CellCoord) -> bool {
        let Some(index) = self.index(neighbor) else {
            return false;
        };
        if self.visited[index] {
            return false;
        }
        self.visited[index] = true;
        self.parents[index] = Some(parent);
        true
    }

    fn rebuild(&self) -> Option<Route> {
        let mut cells = vec![self.goal];
        let mut cursor = self.goal;
        while cursor != self.start {
            let index = self.index(cursor)?;
            cursor = self.parents[index]?;
            cells.push(cursor);
        }
        cells.reverse();
        Some(Route::new(cells))
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        if column < self.columns && row < self.rows {
            row.checked_mul(self.columns)?.checked_add(column)
        } else {
            None
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct OpenNode {
    priority: u32,
    sequence: u64,
    cell: CellCoord,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse both keys for min ordering.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn neighbors(grid: &Grid, cell: CellCoord) -> impl Iterator<Item = CellCoord> + '_ {
    Action::STEPS.iter().filter_map(move |action| {
        cell.offset_by(action.offset())
            .filter(|neighbor| grid.is_traversable(*neighbor))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_pursuit_core::{Tile, WallKind};
    use maze_pursuit_world::Grid;

    fn open_grid(columns: u32, rows: u32) -> Grid {
        let row: Vec<Tile> = (0..columns).map(|_| Tile::Empty).collect();
        Grid::from_rows((0..rows).map(|_| row.clone()).collect()).expect("valid grid")
    }

    fn walled_grid() -> Grid {
        // 5x3 with a vertical wall through column 2, open only at row 2.
        let wall = Tile::Wall(WallKind::Vertical);
        Grid::from_rows(vec![
            vec![Tile::Empty, Tile::Empty, wall, Tile::Empty, Tile::Empty],
            vec![Tile::Empty, Tile::Empty, wall, Tile::Empty, Tile::Empty],
            vec![Tile::Empty, Tile::Empty, Tile::Empty, Tile::Empty, Tile::Empty],
        ])
        .expect("valid grid")
    }

    fn sealed_grid() -> Grid {
        // Column 1 fully walled; cells east of it are unreachable from (0,0).
        let wall = Tile::Wall(WallKind::Vertical);
        Grid::from_rows(vec![
            vec![Tile::Empty, wall, Tile::Empty],
            vec![Tile::Empty, wall, Tile::Empty],
        ])
        .expect("valid grid")
    }

    fn assert_contiguous(route: &Route, grid: &Grid) {
        for pair in route.cells().windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
            assert!(grid.is_traversable(pair[1]));
        }
    }

    #[test]
    fn breadth_first_route_is_manhattan_optimal_on_open_grid() {
        let grid = open_grid(3, 3);
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(2, 2);

        let route = breadth_first(start, goal, &grid).expect("reachable");

        assert_eq!(route.len(), 5);
        assert_eq!(
            route.cells(),
            &[
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(2, 0),
                CellCoord::new(2, 1),
                CellCoord::new(2, 2),
            ]
        );
    }

    #[test]
    fn breadth_first_and_a_star_agree_on_route_length() {
        let grid = walled_grid();
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(4, 0);

        let bfs = breadth_first(start, goal, &grid).expect("reachable");
        let astar = a_star(start, goal, &grid).expect("reachable");

        assert_eq!(bfs.len(), astar.len());
        assert_eq!(bfs.len(), 9);
        assert_contiguous(&bfs, &grid);
        assert_contiguous(&astar, &grid);
    }

    #[test]
    fn open_grid_lengths_equal_manhattan_distance() {
        let grid = open_grid(6, 5);
        let start = CellCoord::new(1, 4);
        for goal in [
            CellCoord::new(5, 0),
            CellCoord::new(0, 0),
            CellCoord::new(4, 4),
        ] {
            let expected = start.manhattan_distance(goal) as usize + 1;
            let bfs = breadth_first(start, goal, &grid).expect("reachable");
            let astar = a_star(start, goal, &grid).expect("reachable");
            assert_eq!(bfs.len(), expected);
            assert_eq!(astar.len(), expected);
        }
    }

    #[test]
    fn all_strategies_agree_on_reachability() {
        let grid = walled_grid();
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(4, 1);

        let bfs = breadth_first(start, goal, &grid);
        let dfs = depth_first(start, goal, &grid);
        let astar = a_star(start, goal, &grid);

        assert!(bfs.is_some());
        assert!(dfs.is_some());
        assert!(astar.is_some());
        assert_contiguous(&dfs.expect("route"), &grid);
    }

    #[test]
    fn all_strategies_agree_on_unreachability() {
        let grid = sealed_grid();
        let start = CellCoord::new(0, 0);
        let goal = CellCoord::new(2, 1);

        assert!(breadth_first(start, goal, &grid).is_none());
        assert!(depth_first(start, goal, &grid).is_none());
        assert!(a_star(start, goal, &grid).is_none());
    }

    #[test]
    fn goal_on_wall_is_unreachable() {
        let grid = walled_grid();
        let wall_cell = CellCoord::new(2, 0);

        for kind in [
            StrategyKind::BreadthFirst,
            StrategyKind::DepthFirst,
            StrategyKind::AStar,
        ] {
            assert!(find_route(kind, CellCoord::new(0, 0), wall_cell, &grid).is_none());
        }
    }

    #[test]
    fn start_equal_to_goal_yields_single_cell_route() {
        let grid = open_grid(2, 2);
        let cell = CellCoord::new(1, 1);

        for kind in [
            StrategyKind::BreadthFirst,
            StrategyKind::DepthFirst,
            StrategyKind::AStar,
        ] {
            let route = find_route(kind, cell, cell, &grid).expect("trivial route");
            assert_eq!(route.cells(), &[cell]);
        }
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let grid = walled_grid();
        let start = CellCoord::new(0, 2);
        let goal = CellCoord::new(4, 0);

        for kind in [
            StrategyKind::BreadthFirst,
            StrategyKind::DepthFirst,
            StrategyKind::AStar,
        ] {
            let first = find_route(kind, start, goal, &grid);
            let second = find_route(kind, start, goal, &grid);
            assert_eq!(first, second);
        }
    }
}
