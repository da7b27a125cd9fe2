#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed behavior state machine that assigns each pursuer a strategic mode
//! and turns its current target into a single-cell step.
//!
//! One [`Behavior`] instance drives every pursuer: the chase/scatter
//! alternation runs on one shared clock, while Frightened and Returning are
//! tracked per pursuer and always take precedence. On each movement cadence
//! tick the system recomputes per-personality targets, asks the configured
//! pathfinding strategy for a route, and emits one [`PursuerStep`] intent
//! per pursuer. The system never mutates positions itself.

use std::num::NonZeroU32;
use std::time::Duration;

use maze_pursuit_core::{
    CellCoord, Direction, Personality, PowerPulse, PursuerId, PursuerMode, PursuerStep,
    StrategyKind,
};
use maze_pursuit_system_pathfinding::find_route;
use maze_pursuit_world::{query, Grid};
use sha2::{Digest, Sha256};

const RNG_STREAM_WANDER: &str = "pursuer-wander";

/// Configuration parameters required to construct the behavior system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    strategy: StrategyKind,
    chase_duration: Duration,
    scatter_duration: Duration,
    step_cadence: NonZeroU32,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration.
    ///
    /// `step_cadence` is the number of ticks between step recomputations;
    /// movement is rate-limited, not per-tick.
    #[must_use]
    pub const fn new(
        strategy: StrategyKind,
        chase_duration: Duration,
        scatter_duration: Duration,
        step_cadence: NonZeroU32,
        rng_seed: u64,
    ) -> Self {
        Self {
            strategy,
            chase_duration,
            scatter_duration,
            step_cadence,
            rng_seed,
        }
    }
}

/// Construction-time description of one pursuer.
#[derive(Clone, Copy, Debug)]
pub struct PursuerSetup {
    /// Identifier the behavior system reports steps under.
    pub id: PursuerId,
    /// Targeting personality evaluated in chase and scatter.
    pub personality: Personality,
    /// Home cell a captured pursuer returns to.
    pub home: CellCoord,
}

/// Per-identity targeting constants.
///
/// The rule shapes are fixed per personality; the corner coordinates, the
/// lookahead length, and the skittish threshold are data that callers may
/// recalibrate for a particular maze.
#[derive(Clone, Copy, Debug)]
pub struct TargetRules {
    direct_scatter: CellCoord,
    lookahead_scatter: CellCoord,
    ambush_scatter: CellCoord,
    skittish_scatter: CellCoord,
    skittish_retreat: CellCoord,
    lookahead_tiles: u32,
    skittish_threshold: u32,
}

impl TargetRules {
    /// Creates fully custom targeting rules.
    #[must_use]
    pub const fn new(
        direct_scatter: CellCoord,
        lookahead_scatter: CellCoord,
        ambush_scatter: CellCoord,
        skittish_scatter: CellCoord,
        skittish_retreat: CellCoord,
        lookahead_tiles: u32,
        skittish_threshold: u32,
    ) -> Self {
        Self {
            direct_scatter,
            lookahead_scatter,
            ambush_scatter,
            skittish_scatter,
            skittish_retreat,
            lookahead_tiles,
            skittish_threshold,
        }
    }

    /// Derives the canonical corner assignment from the grid dimensions:
    /// direct top-right, lookahead top-left, ambush bottom-right, skittish
    /// bottom-left, with a four-tile lookahead and a skittish threshold of
    /// eight.
    #[must_use]
    pub fn for_grid(grid: &Grid) -> Self {
        let right = i64::from(grid.columns()) - 2;
        let bottom = i64::from(grid.rows()) - 2;
        Self::new(
            grid.clamp(right, 1),
            grid.clamp(1, 1),
            grid.clamp(right, bottom),
            grid.clamp(1, bottom),
            grid.clamp(1, bottom),
            4,
            8,
        )
    }

    fn scatter_target(&self, personality: Personality) -> CellCoord {
        match personality {
            Personality::Direct => self.direct_scatter,
            Personality::Lookahead => self.lookahead_scatter,
            Personality::Ambush => self.ambush_scatter,
            Personality::Skittish => self.skittish_scatter,
        }
    }
}

/// Read-only snapshot of everything the behavior system needs for one tick.
///
/// Pursuer cells appear in roster order; every pursuer's step planned from
/// one view reflects the same snapshot of the pursued agent's position.
#[derive(Clone, Copy, Debug)]
pub struct PursuitView<'a> {
    grid: &'a Grid,
    pursued: CellCoord,
    facing: Direction,
    pursuer_cells: &'a [CellCoord],
}

impl<'a> PursuitView<'a> {
    /// Captures a new view over the provided snapshot data.
    #[must_use]
    pub fn new(
        grid: &'a Grid,
        pursued: CellCoord,
        facing: Direction,
        pursuer_cells: &'a [CellCoord],
    ) -> Self {
        Self {
            grid,
            pursued,
            facing,
            pursuer_cells,
        }
    }

    /// Maze grid the pursuers move through.
    #[must_use]
    pub fn grid(&self) -> &'a Grid {
        self.grid
    }

    /// Cell occupied by the pursued agent this tick.
    #[must_use]
    pub const fn pursued(&self) -> CellCoord {
        self.pursued
    }

    /// Facing direction of the pursued agent this tick.
    #[must_use]
    pub const fn facing(&self) -> Direction {
        self.facing
    }

    /// Pursuer cells in roster order.
    #[must_use]
    pub fn pursuer_cells(&self) -> &'a [CellCoord] {
        self.pursuer_cells
    }
}

#[derive(Debug)]
struct Slot {
    id: PursuerId,
    personality: Personality,
    home: CellCoord,
    mode: PursuerMode,
    power_immune: bool,
    rng: SplitMix64,
    last_cell: Option<CellCoord>,
}

/// Pursuer behavior state machine.
#[derive(Debug)]
pub struct Behavior {
    config: Config,
    rules: TargetRules,
    slots: Vec<Slot>,
    clock_phase: PursuerMode,
    clock_elapsed: Duration,
    power_was_active: bool,
    tick_index: u64,
}

impl Behavior {
    /// Creates the behavior system for the provided roster.
    ///
    /// Every pursuer receives its own wander stream derived from the
    /// configured seed, so runs with equal seeds replay identically.
    #[must_use]
    pub fn new(config: Config, rules: TargetRules, roster: &[PursuerSetup]) -> Self {
        let slots = roster
            .iter()
            .map(|setup| Slot {
                id: setup.id,
                personality: setup.personality,
                home: setup.home,
                mode: PursuerMode::Chase,
                power_immune: false,
                rng: SplitMix64::new(derive_wander_seed(config.rng_seed, setup.id)),
                last_cell: None,
            })
            .collect();

        Self {
            config,
            rules,
            slots,
            clock_phase: PursuerMode::Chase,
            clock_elapsed: Duration::ZERO,
            power_was_active: false,
            tick_index: 0,
        }
    }

    /// Current mode of the identified pursuer, if it is on the roster.
    #[must_use]
    pub fn mode(&self, id: PursuerId) -> Option<PursuerMode> {
        self.slots
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| slot.mode)
    }

    /// Advances timers and modes by one tick and, on cadence ticks, appends
    /// one step intent per pursuer to `out`.
    ///
    /// `captures` lists pursuers the pursued agent caught while they were
    /// Frightened since the previous call; capture events for pursuers in
    /// any other mode are ignored.
    pub fn handle(
        &mut self,
        dt: Duration,
        view: &PursuitView<'_>,
        power: PowerPulse,
        captures: &[PursuerId],
        out: &mut Vec<PursuerStep>,
    ) {
        self.tick_index = self.tick_index.saturating_add(1);
        self.advance_clock(dt, power);
        self.apply_captures(captures);
        self.refresh_modes(view, power);

        if self.tick_index % u64::from(self.config.step_cadence.get()) != 0 {
            return;
        }
        self.plan_steps(view, out);
    }

    fn advance_clock(&mut self, dt: Duration, power: PowerPulse) {
        if power.is_active() {
            // The alternation pauses while the signal is asserted.
            self.power_was_active = true;
            return;
        }

        if self.power_was_active {
            // Signal cleared: frightened pursuers resume in chase.
            self.power_was_active = false;
            self.clock_phase = PursuerMode::Chase;
            self.clock_elapsed = Duration::ZERO;
            return;
        }

        self.clock_elapsed = self.clock_elapsed.saturating_add(dt);
        let (limit, next) = match self.clock_phase {
            PursuerMode::Chase => (self.config.chase_duration, PursuerMode::Scatter),
            _ => (self.config.scatter_duration, PursuerMode::Chase),
        };
        if self.clock_elapsed > limit {
            self.clock_phase = next;
            self.clock_elapsed = Duration::ZERO;
        }
    }

    fn apply_captures(&mut self, captures: &[PursuerId]) {
        for id in captures {
            if let Some(slot) = self.slots.iter_mut().find(|slot| slot.id == *id) {
                if slot.mode == PursuerMode::Frightened {
                    slot.mode = PursuerMode::Returning;
                    slot.power_immune = true;
                }
            }
        }
    }

    fn refresh_modes(&mut self, view: &PursuitView<'_>, power: PowerPulse) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if !power.is_active() {
                slot.power_immune = false;
            }

            match slot.mode {
                PursuerMode::Returning => {
                    // Returning ignores the shared clock until the pursuer
                    // stands on its home cell; it then resumes in chase and
                    // cannot re-enter frightened within the same pulse.
                    let cell = view.pursuer_cells().get(index).copied();
                    if cell == Some(slot.home) {
                        slot.mode = PursuerMode::Chase;
                    }
                }
                _ => {
                    if power.is_active() {
                        slot.mode = if slot.power_immune {
                            PursuerMode::Chase
                        } else {
                            PursuerMode::Frightened
                        };
                    } else {
                        slot.mode = self.clock_phase;
                    }
                }
            }
        }
    }

    fn plan_steps(&mut self, view: &PursuitView<'_>, out: &mut Vec<PursuerStep>) {
        let direct_cell = direct_pursuer_cell(&self.slots, view);
        let strategy = self.config.strategy;
        let rules = self.rules;

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(current) = view.pursuer_cells().get(index).copied() else {
                continue;
            };

            let next = if slot.mode == PursuerMode::Frightened {
                wander(slot, view.grid(), current)
            } else {
                let (column, row) = resolve_target(slot, current, view, &rules, direct_cell);
                let target = view.grid().clamp(column, row);
                match find_route(strategy, current, target, view.grid()) {
                    Some(route) if route.len() >= 2 => route.first_hop(),
                    _ => random_legal_neighbor(slot, view.grid(), current),
                }
            };

            if let Some(to) = next {
                if to != current {
                    slot.last_cell = Some(current);
                    out.push(PursuerStep {
                        id: slot.id,
                        from: current,
                        to,
                    });
                }
            }
        }
    }
}

/// Chase/scatter/returning target in signed coordinates, clamped by the
/// caller.
fn resolve_target(
    slot: &Slot,
    current: CellCoord,
    view: &PursuitView<'_>,
    rules: &TargetRules,
    direct_cell: Option<CellCoord>,
) -> (i64, i64) {
    let pursued = view.pursued();
    let pursued_signed = (i64::from(pursued.column()), i64::from(pursued.row()));

    match slot.mode {
        PursuerMode::Returning => (i64::from(slot.home.column()), i64::from(slot.home.row())),
        PursuerMode::Scatter => {
            let corner = rules.scatter_target(slot.personality);
            (i64::from(corner.column()), i64::from(corner.row()))
        }
        _ => match slot.personality {
            Personality::Direct => pursued_signed,
            Personality::Lookahead => {
                let (dx, dy) = view.facing().offset();
                let reach = i64::from(rules.lookahead_tiles);
                (pursued_signed.0 + dx * reach, pursued_signed.1 + dy * reach)
            }
            Personality::Ambush => {
                // Reflect the pursued agent through the direct pursuer.
                let anchor = direct_cell.unwrap_or(pursued);
                (
                    pursued_signed.0 * 2 - i64::from(anchor.column()),
                    pursued_signed.1 * 2 - i64::from(anchor.row()),
                )
            }
            Personality::Skittish => {
                if current.manhattan_distance(pursued) > rules.skittish_threshold {
                    pursued_signed
                } else {
                    let corner = rules.skittish_retreat;
                    (i64::from(corner.column()), i64::from(corner.row()))
                }
            }
        },
    }
}

fn direct_pursuer_cell(slots: &[Slot], view: &PursuitView<'_>) -> Option<CellCoord> {
    slots
        .iter()
        .position(|slot| slot.personality == Personality::Direct)
        .and_then(|index| view.pursuer_cells().get(index).copied())
}

/// Frightened wander: a random legal neighbor, preferring cells other than
/// the one just vacated.
fn wander(slot: &mut Slot, grid: &Grid, current: CellCoord) -> Option<CellCoord> {
    let legal = legal_neighbors(grid, current);
    if legal.is_empty() {
        return None;
    }
    let fresh: Vec<CellCoord> = legal
        .iter()
        .copied()
        .filter(|cell| Some(*cell) != slot.last_cell)
        .collect();
    let pool = if fresh.is_empty() { &legal } else { &fresh };
    Some(pool[slot.rng.next_index(pool.len())])
}

fn random_legal_neighbor(slot: &mut Slot, grid: &Grid, current: CellCoord) -> Option<CellCoord> {
    let legal = legal_neighbors(grid, current);
    if legal.is_empty() {
        return None;
    }
    Some(legal[slot.rng.next_index(legal.len())])
}

fn legal_neighbors(grid: &Grid, cell: CellCoord) -> Vec<CellCoord> {
    query::legal_actions(grid, cell)
        .into_iter()
        .filter_map(|action| cell.offset_by(action.offset()))
        .collect()
}

fn derive_wander_seed(base: u64, id: PursuerId) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(RNG_STREAM_WANDER.as_bytes());
    hasher.update(id.get().to_le_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 8] = digest[0..8].try_into().expect("sha256 digest slice length");
    u64::from_le_bytes(bytes)
}

#[derive(Debug)]
struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e3779b97f4a7c15 } else { seed };
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e3779b97f4a7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
        z ^ (z >> 31)
    }

    fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "next_index requires a non-empty pool");
        (self.next_u64() % len as u64) as usize
    }
}
