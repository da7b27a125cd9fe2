#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Maze Pursuit round.
//!
//! This binary owns everything the decision engine treats as external: the
//! maze supplier, the tick loop, the power-mode and capture signals, and the
//! fallback boundary around the pursued agent's decision. The engine crates
//! stay pure; all orchestration lives here.

mod maze;

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use maze_pursuit_core::{
    Action, AgentKind, CellCoord, Direction, PowerPulse, PursuerId, PursuerMode, StrategyKind,
};
use maze_pursuit_system_behavior::{
    Behavior, Config as BehaviorConfig, PursuerSetup, PursuitView, TargetRules,
};
use maze_pursuit_system_search::{fallback_action, PursuedAgent};
use maze_pursuit_world::{apply_action, query, Agent, WorldState, ENERGIZER_REWARD};

const TICK: Duration = Duration::from_millis(250);
const POWER_DURATION: Duration = Duration::from_secs(8);
const CAPTURE_REWARD: i64 = 200;
const STARTING_LIVES: u32 = 3;

/// Headless driver for the Maze Pursuit decision engine.
#[derive(Debug, Parser)]
#[command(name = "maze-pursuit")]
struct Cli {
    /// Pathfinding strategy steering the pursuers.
    #[arg(long, value_enum, default_value = "bfs")]
    strategy: StrategyArg,

    /// Adversarial agent choosing the pursued agent's moves.
    #[arg(long, value_enum, default_value = "alpha-beta")]
    agent: AgentArg,

    /// Search depth in full turn cycles for the minimax family.
    #[arg(long, default_value_t = 2)]
    depth: u32,

    /// Number of simulation ticks to run before stopping.
    #[arg(long, default_value_t = 240)]
    ticks: u64,

    /// Seed for the pursuer wander streams.
    #[arg(long, default_value_t = 0x00c0_ffee)]
    seed: u64,

    /// Ticks between pursuer step recomputations.
    #[arg(long, default_value_t = NonZeroU32::MIN)]
    cadence: NonZeroU32,

    /// Chase phase duration in seconds.
    #[arg(long, default_value_t = 20)]
    chase_secs: u64,

    /// Scatter phase duration in seconds.
    #[arg(long, default_value_t = 7)]
    scatter_secs: u64,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StrategyArg {
    /// Breadth-first search.
    Bfs,
    /// Depth-first search.
    Dfs,
    /// A* with the Manhattan heuristic.
    Astar,
}

impl StrategyArg {
    fn into_kind(self) -> StrategyKind {
        match self {
            Self::Bfs => StrategyKind::BreadthFirst,
            Self::Dfs => StrategyKind::DepthFirst,
            Self::Astar => StrategyKind::AStar,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AgentArg {
    /// One-ply greedy agent.
    Reflex,
    /// Depth-limited minimax.
    Minimax,
    /// Depth-limited minimax with pruning.
    AlphaBeta,
}

impl AgentArg {
    fn into_kind(self, depth: u32) -> AgentKind {
        match self {
            Self::Reflex => AgentKind::Reflex,
            Self::Minimax => AgentKind::Minimax { depth },
            Self::AlphaBeta => AgentKind::AlphaBeta { depth },
        }
    }
}

/// Entry point for the Maze Pursuit command-line driver.
fn main() -> Result<()> {
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<()> {
    let parsed = maze::parse(maze::DEMO_MAZE).context("demo maze failed to parse")?;
    let agent = PursuedAgent::new(cli.agent.into_kind(cli.depth))
        .context("rejected agent configuration")?;

    let roster: Vec<PursuerSetup> = parsed
        .pursuer_spawns
        .iter()
        .enumerate()
        .map(|(index, (personality, cell))| PursuerSetup {
            id: PursuerId::new(index as u32),
            personality: *personality,
            home: *cell,
        })
        .collect();
    let mut behavior = Behavior::new(
        BehaviorConfig::new(
            cli.strategy.into_kind(),
            Duration::from_secs(cli.chase_secs),
            Duration::from_secs(cli.scatter_secs),
            cli.cadence,
            cli.seed,
        ),
        TargetRules::for_grid(&parsed.grid),
        &roster,
    );

    let pursued_spawn = parsed.pursued_spawn;
    let pursuer_spawns: Vec<CellCoord> = parsed
        .pursuer_spawns
        .iter()
        .map(|(_, cell)| *cell)
        .collect();

    let mut state = WorldState::new(
        parsed.grid,
        pursued_spawn,
        pursuer_spawns.clone(),
        0,
        STARTING_LIVES,
    );
    let mut facing = Direction::East;
    let mut capture_bonus: i64 = 0;
    let mut power_remaining = Duration::ZERO;
    let mut pending_captures: Vec<PursuerId> = Vec::new();
    let mut outcome = "time limit reached";

    for tick in 1..=cli.ticks {
        let action = resolve_pursued_action(&agent, &state);
        let moved = apply_action(&state, Agent::Pursued, action);
        if let Action::Step(direction) = action {
            if moved.pursued() != state.pursued() {
                facing = direction;
            }
        }
        if moved.score() - state.score() >= ENERGIZER_REWARD {
            power_remaining = POWER_DURATION;
        }
        state = moved;

        let power = PowerPulse::new(!power_remaining.is_zero(), power_remaining);
        let captures = std::mem::take(&mut pending_captures);

        let mut steps = Vec::new();
        {
            let view = PursuitView::new(state.grid(), state.pursued(), facing, state.pursuers());
            behavior.handle(TICK, &view, power, &captures, &mut steps);
        }
        for step in &steps {
            let index = step.id.get() as usize;
            if let Some(direction) = direction_between(step.from, step.to) {
                state = apply_action(&state, Agent::Pursuer(index), Action::Step(direction));
            }
        }

        match resolve_collisions(&behavior, &state, &mut pending_captures) {
            Collision::Deadly => {
                pending_captures.clear();
                power_remaining = Duration::ZERO;
                facing = Direction::East;
                let lives = state.lives().saturating_sub(1);
                println!("tick {tick:>3} caught: {lives} lives remain");
                state = WorldState::new(
                    state.grid().clone(),
                    pursued_spawn,
                    pursuer_spawns.clone(),
                    state.score(),
                    lives,
                );
                if lives == 0 {
                    outcome = "defeated";
                    break;
                }
                continue;
            }
            Collision::Captured(count) => {
                capture_bonus += CAPTURE_REWARD * count;
            }
            Collision::None => {}
        }

        power_remaining = power_remaining.saturating_sub(TICK);

        println!(
            "tick {tick:>3} action {action:?} pursued ({:>2},{:>2}) score {:>5} lives {} modes {}",
            state.pursued().column(),
            state.pursued().row(),
            state.score() + capture_bonus,
            state.lives(),
            mode_summary(&behavior, &roster),
        );

        if query::remaining_pellets(state.grid()) == 0 {
            outcome = "maze cleared";
            break;
        }
    }

    println!(
        "{outcome}: final score {} with {} lives left",
        state.score() + capture_bonus,
        state.lives()
    );
    Ok(())
}

/// Boundary guard around the pursued agent's decision.
///
/// The tick never fails on a decision: an action that is not legal in the
/// current snapshot is replaced with the first legal action, falling back to
/// `Wait` when nothing is legal.
fn resolve_pursued_action(agent: &PursuedAgent, state: &WorldState) -> Action {
    let action = agent.choose_action(state);
    if action == Action::Wait {
        return action;
    }
    let legal = query::legal_actions(state.grid(), state.pursued());
    if legal.contains(&action) {
        action
    } else {
        fallback_action(state)
    }
}

enum Collision {
    None,
    Captured(i64),
    Deadly,
}

/// Classifies end-of-tick overlaps between the pursued agent and pursuers.
///
/// Frightened pursuers sharing the pursued agent's cell become capture
/// events delivered on the next tick; a chase or scatter pursuer on that
/// cell is deadly. Returning pursuers pass through harmlessly.
fn resolve_collisions(
    behavior: &Behavior,
    state: &WorldState,
    pending: &mut Vec<PursuerId>,
) -> Collision {
    let mut captured = 0;
    for (index, cell) in state.pursuers().iter().enumerate() {
        if *cell != state.pursued() {
            continue;
        }
        let id = PursuerId::new(index as u32);
        match behavior.mode(id) {
            Some(PursuerMode::Frightened) => {
                if !pending.contains(&id) {
                    pending.push(id);
                    captured += 1;
                }
            }
            Some(PursuerMode::Returning) | None => {}
            Some(_) => return Collision::Deadly,
        }
    }
    if captured > 0 {
        Collision::Captured(captured)
    } else {
        Collision::None
    }
}

fn mode_summary(behavior: &Behavior, roster: &[PursuerSetup]) -> String {
    let glyphs: Vec<&str> = roster
        .iter()
        .map(|setup| match behavior.mode(setup.id) {
            Some(PursuerMode::Chase) => "C",
            Some(PursuerMode::Scatter) => "S",
            Some(PursuerMode::Frightened) => "F",
            Some(PursuerMode::Returning) => "R",
            None => "?",
        })
        .collect();
    glyphs.join("")
}

fn direction_between(from: CellCoord, to: CellCoord) -> Option<Direction> {
    let column_diff = from.column().abs_diff(to.column());
    let row_diff = from.row().abs_diff(to.row());
    if column_diff + row_diff != 1 {
        return None;
    }

    if column_diff == 1 {
        if to.column() > from.column() {
            Some(Direction::East)
        } else {
            Some(Direction::West)
        }
    } else if to.row() > from.row() {
        Some(Direction::South)
    } else {
        Some(Direction::North)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_pursuit_core::Tile;
    use maze_pursuit_world::Grid;

    fn open_grid(columns: u32, rows: u32) -> Grid {
        let row: Vec<Tile> = (0..columns).map(|_| Tile::Empty).collect();
        Grid::from_rows((0..rows).map(|_| row.clone()).collect()).expect("valid grid")
    }

    #[test]
    fn direction_between_neighbors() {
        let origin = CellCoord::new(3, 3);
        assert_eq!(
            direction_between(origin, CellCoord::new(3, 2)),
            Some(Direction::North)
        );
        assert_eq!(
            direction_between(origin, CellCoord::new(4, 3)),
            Some(Direction::East)
        );
        assert_eq!(
            direction_between(origin, CellCoord::new(3, 4)),
            Some(Direction::South)
        );
        assert_eq!(
            direction_between(origin, CellCoord::new(2, 3)),
            Some(Direction::West)
        );
        assert_eq!(direction_between(origin, origin), None);
        assert_eq!(direction_between(origin, CellCoord::new(5, 3)), None);
    }

    #[test]
    fn boundary_accepts_legal_decisions_and_replaces_illegal_ones() {
        let agent = PursuedAgent::new(AgentKind::Reflex).expect("valid agent");
        let grid = open_grid(3, 3);
        let state = WorldState::new(grid, CellCoord::new(1, 1), Vec::new(), 0, STARTING_LIVES);

        let action = resolve_pursued_action(&agent, &state);
        assert!(query::legal_actions(state.grid(), state.pursued()).contains(&action));
    }

    #[test]
    fn selector_arguments_map_onto_engine_kinds() {
        assert_eq!(StrategyArg::Bfs.into_kind(), StrategyKind::BreadthFirst);
        assert_eq!(StrategyArg::Dfs.into_kind(), StrategyKind::DepthFirst);
        assert_eq!(StrategyArg::Astar.into_kind(), StrategyKind::AStar);
        assert_eq!(AgentArg::Reflex.into_kind(9), AgentKind::Reflex);
        assert_eq!(
            AgentArg::AlphaBeta.into_kind(3),
            AgentKind::AlphaBeta { depth: 3 }
        );
    }

    #[test]
    fn unknown_depth_fails_fast_at_construction() {
        assert!(PursuedAgent::new(AgentArg::Minimax.into_kind(0)).is_err());
    }
}
