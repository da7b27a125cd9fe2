#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Pursuit engine.
//!
//! This crate defines the value types that connect the authoritative world,
//! the pure decision systems, and the adapters that drive them. Systems read
//! immutable snapshots built from these types and respond with intents; the
//! adapter that owns the tick loop applies those intents. Nothing in this
//! crate performs I/O or holds mutable state.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Applies a signed column/row delta, yielding `None` when the result
    /// would leave the non-negative coordinate space.
    #[must_use]
    pub fn offset_by(self, delta: (i64, i64)) -> Option<CellCoord> {
        let column = i64::from(self.column).checked_add(delta.0)?;
        let row = i64::from(self.row).checked_add(delta.1)?;
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        Some(Self { column, row })
    }
}

/// Cardinal movement directions available to agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Unit column/row delta produced by one step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }
}

/// Single-tick intent of one agent: step into a neighboring cell or hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step one cell in the wrapped direction.
    Step(Direction),
    /// Remain in place for the tick.
    Wait,
}

impl Action {
    /// The four stepping actions in the fixed expansion order east, south,
    /// west, north. Neighbor generation and legal-action enumeration iterate
    /// this array so ties resolve reproducibly across runs.
    pub const STEPS: [Action; 4] = [
        Action::Step(Direction::East),
        Action::Step(Direction::South),
        Action::Step(Direction::West),
        Action::Step(Direction::North),
    ];

    /// Column/row delta applied by the action; `Wait` maps to zero.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Step(direction) => direction.offset(),
            Self::Wait => (0, 0),
        }
    }
}

/// Shape variants for non-traversable wall tiles.
///
/// The variants carry the numeric map interchange codes 3 through 8; the
/// engine never distinguishes between them beyond "blocking".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallKind {
    /// Horizontal wall segment.
    Horizontal,
    /// Vertical wall segment.
    Vertical,
    /// Corner piece opening toward the south-east.
    CornerNw,
    /// Corner piece opening toward the south-west.
    CornerNe,
    /// Corner piece opening toward the north-east.
    CornerSw,
    /// Corner piece opening toward the north-west.
    CornerSe,
}

/// Contents of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Open floor with nothing to consume.
    Empty,
    /// Floor holding a pellet worth a small reward.
    Pellet,
    /// Floor holding an energizer worth a larger reward.
    Energizer,
    /// Blocking wall segment.
    Wall(WallKind),
    /// Door into the pursuer home; open for traversal, never consumed.
    Gate,
}

impl Tile {
    /// Reports whether agents may occupy the tile.
    ///
    /// Exactly `Empty`, `Pellet`, `Energizer`, and `Gate` are traversable;
    /// every wall variant blocks. All movement and search code routes through
    /// this predicate so the partition is defined once.
    #[must_use]
    pub const fn is_traversable(self) -> bool {
        matches!(self, Self::Empty | Self::Pellet | Self::Energizer | Self::Gate)
    }

    /// Decodes the numeric map interchange code used by maze suppliers.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Tile> {
        match code {
            0 => Some(Self::Empty),
            1 => Some(Self::Pellet),
            2 => Some(Self::Energizer),
            3 => Some(Self::Wall(WallKind::Horizontal)),
            4 => Some(Self::Wall(WallKind::Vertical)),
            5 => Some(Self::Wall(WallKind::CornerNw)),
            6 => Some(Self::Wall(WallKind::CornerNe)),
            7 => Some(Self::Wall(WallKind::CornerSw)),
            8 => Some(Self::Wall(WallKind::CornerSe)),
            9 => Some(Self::Gate),
            _ => None,
        }
    }

    /// Numeric map interchange code for the tile.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Pellet => 1,
            Self::Energizer => 2,
            Self::Wall(WallKind::Horizontal) => 3,
            Self::Wall(WallKind::Vertical) => 4,
            Self::Wall(WallKind::CornerNw) => 5,
            Self::Wall(WallKind::CornerNe) => 6,
            Self::Wall(WallKind::CornerSw) => 7,
            Self::Wall(WallKind::CornerSe) => 8,
            Self::Gate => 9,
        }
    }
}

/// Ordered sequence of cells from a start to a goal under 4-connected
/// movement, both endpoints inclusive. Never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    cells: Vec<CellCoord>,
}

impl Route {
    /// Creates a route from the provided ordered cells.
    #[must_use]
    pub fn new(cells: Vec<CellCoord>) -> Self {
        Self { cells }
    }

    /// Cells that make up the route, start first.
    #[must_use]
    pub fn cells(&self) -> &[CellCoord] {
        &self.cells
    }

    /// Number of cells in the route, endpoints included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the route holds no cells at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// First cell after the start, if the route advances anywhere.
    #[must_use]
    pub fn first_hop(&self) -> Option<CellCoord> {
        self.cells.get(1).copied()
    }
}

/// Unique identifier assigned to a pursuer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct PursuerId(u32);

impl PursuerId {
    /// Creates a new pursuer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Targeting personality assigned to a pursuer for chase-mode pursuit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    /// Targets the pursued agent's cell directly.
    Direct,
    /// Targets a cell several tiles ahead of the pursued agent's facing.
    Lookahead,
    /// Targets the reflection of the pursued agent through the direct
    /// pursuer's cell.
    Ambush,
    /// Targets the pursued agent while far away, its retreat corner once
    /// close.
    Skittish,
}

/// Strategic mode governing a pursuer's targeting rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuerMode {
    /// Actively pursuing the pursued agent per personality rule.
    Chase,
    /// Withdrawing toward the personality's fixed corner.
    Scatter,
    /// Wandering randomly while the power signal is active.
    Frightened,
    /// Heading back to the home cell after being captured.
    Returning,
}

/// Externally supplied power-mode signal sampled once per tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerPulse {
    active: bool,
    remaining: Duration,
}

impl PowerPulse {
    /// Creates a new power pulse sample.
    #[must_use]
    pub const fn new(active: bool, remaining: Duration) -> Self {
        Self { active, remaining }
    }

    /// A pulse describing an inactive power mode.
    #[must_use]
    pub const fn inactive() -> Self {
        Self::new(false, Duration::ZERO)
    }

    /// Reports whether power mode is currently asserted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Remaining power-mode duration reported by the supplier.
    #[must_use]
    pub const fn remaining(&self) -> Duration {
        self.remaining
    }
}

/// Movement intent produced for one pursuer on a cadence tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PursuerStep {
    /// Identifier of the pursuer that should advance.
    pub id: PursuerId,
    /// Cell the pursuer occupies when the step was planned.
    pub from: CellCoord,
    /// Destination cell for the step.
    pub to: CellCoord,
}

/// Pathfinding strategy selector resolved once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyKind {
    /// FIFO frontier; minimal step count when a route exists.
    BreadthFirst,
    /// LIFO frontier; some route, not necessarily shortest.
    DepthFirst,
    /// Priority frontier ordered by steps plus Manhattan distance.
    AStar,
}

/// Adversarial agent selector for the pursued agent, resolved once at
/// construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// One-ply greedy agent scoring immediate successors.
    Reflex,
    /// Depth-limited minimax over the full agent turn order.
    Minimax {
        /// Number of full turn cycles to search.
        depth: u32,
    },
    /// Depth-limited minimax with alpha-beta pruning.
    AlphaBeta {
        /// Number of full turn cycles to search.
        depth: u32,
    },
}

/// Reasons a grid value may be rejected at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The grid held zero rows or zero columns.
    #[error("grid must contain at least one row and one column")]
    Empty,
    /// A row's length differed from the first row's length.
    #[error("grid row {row} holds {length} tiles, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Number of tiles found in the offending row.
        length: usize,
        /// Number of tiles every row must hold.
        expected: usize,
    },
}

/// Reasons an agent configuration may be rejected at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum ConfigError {
    /// The requested search depth was below the minimum of one ply.
    #[error("search depth must be at least 1")]
    DepthTooShallow,
    /// The requested search depth would exceed the recursion budget.
    #[error("search depth {depth} exceeds the supported maximum {max}")]
    DepthTooDeep {
        /// Depth requested by the caller.
        depth: u32,
        /// Largest depth the agent accepts.
        max: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::{Action, AgentKind, CellCoord, Direction, Personality, StrategyKind, Tile};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn offset_by_rejects_negative_coordinates() {
        let origin = CellCoord::new(0, 0);
        assert_eq!(origin.offset_by((-1, 0)), None);
        assert_eq!(origin.offset_by((0, -1)), None);
        assert_eq!(origin.offset_by((2, 3)), Some(CellCoord::new(2, 3)));
    }

    #[test]
    fn step_actions_expand_east_south_west_north() {
        let offsets: Vec<(i64, i64)> = Action::STEPS.iter().map(|action| action.offset()).collect();
        assert_eq!(offsets, vec![(1, 0), (0, 1), (-1, 0), (0, -1)]);
    }

    #[test]
    fn wait_has_zero_offset() {
        assert_eq!(Action::Wait.offset(), (0, 0));
    }

    #[test]
    fn traversable_partition_matches_tile_codes() {
        for code in 0..=9u8 {
            let tile = Tile::from_code(code).expect("codes 0..=9 are defined");
            let expected = matches!(code, 0 | 1 | 2 | 9);
            assert_eq!(tile.is_traversable(), expected, "code {code}");
            assert_eq!(tile.code(), code);
        }
        assert_eq!(Tile::from_code(10), None);
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(7, 12));
    }

    #[test]
    fn tile_round_trips_through_bincode() {
        for code in 0..=9u8 {
            assert_round_trip(&Tile::from_code(code).expect("defined code"));
        }
    }

    #[test]
    fn action_round_trips_through_bincode() {
        assert_round_trip(&Action::Step(Direction::North));
        assert_round_trip(&Action::Wait);
    }

    #[test]
    fn selector_enums_round_trip_through_bincode() {
        assert_round_trip(&StrategyKind::AStar);
        assert_round_trip(&AgentKind::AlphaBeta { depth: 3 });
        assert_round_trip(&Personality::Skittish);
    }
}
