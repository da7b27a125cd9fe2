#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adversarial search agents that choose the pursued agent's move.
//!
//! All three agents consume the same immutable [`WorldState`] snapshot and
//! the shared evaluation function. The turn order cycles through
//! `1 + pursuer_count` agents: slot 0 maximizes, every pursuer slot
//! minimizes, and one unit of depth is consumed after the last pursuer has
//! moved.

use maze_pursuit_core::{Action, AgentKind, ConfigError};
use maze_pursuit_world::{apply_action, query, Agent, WorldState};

/// Largest accepted search depth.
///
/// Each unit of depth recurses through one full agent cycle, so the
/// worst-case recursion depth is `depth * (1 + pursuer_count)` stack frames.
/// Construction rejects anything deeper to keep that bound small.
pub const MAX_SEARCH_DEPTH: u32 = 16;

const PELLET_DISTANCE_WEIGHT: i64 = 2;
const PURSUER_DISTANCE_WEIGHT: i64 = 3;
const ADJACENT_PURSUER_PENALTY: i64 = 1000;
const NO_PURSUER_DISTANCE: i64 = 999;

/// Heuristic scalar score of a snapshot, higher favoring the pursued agent.
///
/// Combines the raw score, a penalty growing with the distance to the
/// nearest remaining pellet, the pursuer-proximity term (a large fixed
/// penalty when a pursuer is adjacent or closer, otherwise a bonus
/// proportional to the distance), and a penalty proportional to the pellets
/// still on the grid. Serves as the leaf estimate for depth-limited search
/// and as the whole policy for the reflex agent.
#[must_use]
pub fn evaluate(state: &WorldState) -> i64 {
    let pursued = state.pursued();

    let pellet_distance = query::nearest_pellet_distance(state.grid(), pursued)
        .map_or(0, i64::from);
    let pursuer_distance = state
        .pursuers()
        .iter()
        .map(|pursuer| i64::from(pursued.manhattan_distance(*pursuer)))
        .min()
        .unwrap_or(NO_PURSUER_DISTANCE);
    let remaining = query::remaining_pellets(state.grid());

    let mut value = state.score();
    value -= pellet_distance * PELLET_DISTANCE_WEIGHT;
    if pursuer_distance <= 1 {
        value -= ADJACENT_PURSUER_PENALTY;
    } else {
        value += pursuer_distance * PURSUER_DISTANCE_WEIGHT;
    }
    value -= i64::try_from(remaining).unwrap_or(i64::MAX);
    value
}

/// First legal action for the pursued agent, `Wait` when no step is legal.
///
/// This is the boundary fallback policy: an orchestrating loop that cannot
/// accept an agent's decision substitutes this value instead of failing the
/// tick.
#[must_use]
pub fn fallback_action(state: &WorldState) -> Action {
    query::legal_actions(state.grid(), state.pursued())
        .first()
        .copied()
        .unwrap_or(Action::Wait)
}

/// Pursued-agent decision maker resolved once at construction.
#[derive(Clone, Copy, Debug)]
pub enum PursuedAgent {
    /// One-ply greedy agent.
    Reflex(Reflex),
    /// Depth-limited minimax agent.
    Minimax(Minimax),
    /// Depth-limited alpha-beta agent.
    AlphaBeta(AlphaBeta),
}

impl PursuedAgent {
    /// Builds the agent selected by the configuration.
    ///
    /// Fails fast on an out-of-range depth; no default is ever substituted.
    pub fn new(kind: AgentKind) -> Result<Self, ConfigError> {
        match kind {
            AgentKind::Reflex => Ok(Self::Reflex(Reflex)),
            AgentKind::Minimax { depth } => Minimax::new(depth).map(Self::Minimax),
            AgentKind::AlphaBeta { depth } => AlphaBeta::new(depth).map(Self::AlphaBeta),
        }
    }

    /// Chooses the pursued agent's next action for the snapshot.
    #[must_use]
    pub fn choose_action(&self, state: &WorldState) -> Action {
        match self {
            Self::Reflex(agent) => agent.choose_action(state),
            Self::Minimax(agent) => agent.choose_action(state),
            Self::AlphaBeta(agent) => agent.choose_action(state),
        }
    }
}

/// Greedy agent scoring each one-step successor with [`evaluate`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Reflex;

impl Reflex {
    /// Returns the legal action whose successor evaluates highest; ties
    /// resolve to the first action seen, `Wait` when nothing is legal.
    #[must_use]
    pub fn choose_action(&self, state: &WorldState) -> Action {
        let mut best_value = i64::MIN;
        let mut best_action = Action::Wait;

        for action in query::legal_actions(state.grid(), state.pursued()) {
            let successor = apply_action(state, Agent::Pursued, action);
            let value = evaluate(&successor);
            if value > best_value {
                best_value = value;
                best_action = action;
            }
        }

        best_action
    }
}

/// Depth-limited minimax over the full agent turn order.
#[derive(Clone, Copy, Debug)]
pub struct Minimax {
    depth: u32,
}

impl Minimax {
    /// Creates a minimax agent searching the given number of full cycles.
    pub fn new(depth: u32) -> Result<Self, ConfigError> {
        validate_depth(depth)?;
        Ok(Self { depth })
    }

    /// Returns the legal action with the highest minimax value; ties resolve
    /// to the first action seen, `Wait` when nothing is legal.
    #[must_use]
    pub fn choose_action(&self, state: &WorldState) -> Action {
        let mut best_value = i64::MIN;
        let mut best_action = Action::Wait;

        for action in query::legal_actions(state.grid(), state.pursued()) {
            let successor = apply_action(state, Agent::Pursued, action);
            let value = if state.pursuers().is_empty() {
                self.max_value(&successor, self.depth)
            } else {
                self.min_value(&successor, self.depth, 0)
            };
            if value > best_value {
                best_value = value;
                best_action = action;
            }
        }

        best_action
    }

    fn max_value(&self, state: &WorldState, depth: u32) -> i64 {
        if depth == 0 || query::is_terminal(state) {
            return evaluate(state);
        }

        let actions = query::legal_actions(state.grid(), state.pursued());
        if actions.is_empty() {
            return evaluate(state);
        }

        let mut best = i64::MIN;
        for action in actions {
            let successor = apply_action(state, Agent::Pursued, action);
            let value = if state.pursuers().is_empty() {
                self.max_value(&successor, depth - 1)
            } else {
                self.min_value(&successor, depth, 0)
            };
            best = best.max(value);
        }
        best
    }

    fn min_value(&self, state: &WorldState, depth: u32, pursuer: usize) -> i64 {
        if depth == 0 || query::is_terminal(state) {
            return evaluate(state);
        }

        let actions = pursuer_actions(state, pursuer);
        let last_pursuer = pursuer + 1 == state.pursuers().len();

        let mut worst = i64::MAX;
        for action in actions {
            let successor = apply_action(state, Agent::Pursuer(pursuer), action);
            let value = if last_pursuer {
                self.max_value(&successor, depth - 1)
            } else {
                self.min_value(&successor, depth, pursuer + 1)
            };
            worst = worst.min(value);
        }
        worst
    }
}

/// Depth-limited minimax with alpha-beta pruning.
///
/// Explores the identical game tree as [`Minimax`] with identical terminal
/// and leaf semantics; pruning changes only the visit order and cost, never
/// the value of the selected action.
#[derive(Clone, Copy, Debug)]
pub struct AlphaBeta {
    depth: u32,
}

impl AlphaBeta {
    /// Creates an alpha-beta agent searching the given number of full cycles.
    pub fn new(depth: u32) -> Result<Self, ConfigError> {
        validate_depth(depth)?;
        Ok(Self { depth })
    }

    /// Returns a legal action whose minimax value matches the unpruned
    /// search; ties resolve to the first action seen, `Wait` when nothing is
    /// legal.
    #[must_use]
    pub fn choose_action(&self, state: &WorldState) -> Action {
        let mut best_value = i64::MIN;
        let mut best_action = Action::Wait;
        let mut alpha = i64::MIN;
        let beta = i64::MAX;

        for action in query::legal_actions(state.grid(), state.pursued()) {
            let successor = apply_action(state, Agent::Pursued, action);
            let value = if state.pursuers().is_empty() {
                self.max_value(&successor, self.depth, alpha, beta)
            } else {
                self.min_value(&successor, self.depth, 0, alpha, beta)
            };
            if value > best_value {
                best_value = value;
                best_action = action;
            }
            alpha = alpha.max(value);
        }

        best_action
    }

    fn max_value(&self, state: &WorldState, depth: u32, mut alpha: i64, beta: i64) -> i64 {
        if depth == 0 || query::is_terminal(state) {
            return evaluate(state);
        }

        let actions = query::legal_actions(state.grid(), state.pursued());
        if actions.is_empty() {
            return evaluate(state);
        }

        let mut best = i64::MIN;
        for action in actions {
            let successor = apply_action(state, Agent::Pursued, action);
            let value = if state.pursuers().is_empty() {
                self.max_value(&successor, depth - 1, alpha, beta)
            } else {
                self.min_value(&successor, depth, 0, alpha, beta)
            };
            best = best.max(value);
            if best >= beta {
                return best;
            }
            alpha = alpha.max(best);
        }
        best
    }

    fn min_value(
        &self,
        state: &WorldState,
        depth: u32,
        pursuer: usize,
        alpha: i64,
        mut beta: i64,
    ) -> i64 {
        if depth == 0 || query::is_terminal(state) {
            return evaluate(state);
        }

        let actions = pursuer_actions(state, pursuer);
        let last_pursuer = pursuer + 1 == state.pursuers().len();

        let mut worst = i64::MAX;
        for action in actions {
            let successor = apply_action(state, Agent::Pursuer(pursuer), action);
            let value = if last_pursuer {
                self.max_value(&successor, depth - 1, alpha, beta)
            } else {
                self.min_value(&successor, depth, pursuer + 1, alpha, beta)
            };
            worst = worst.min(value);
            if worst <= alpha {
                return worst;
            }
            beta = beta.min(worst);
        }
        worst
    }
}

/// Legal actions for the pursuer slot; a cornered pursuer is forced to
/// `Wait` so the search continues through it.
fn pursuer_actions(state: &WorldState, pursuer: usize) -> Vec<Action> {
    let actions = state
        .pursuers()
        .get(pursuer)
        .map(|cell| query::legal_actions(state.grid(), *cell))
        .unwrap_or_default();
    if actions.is_empty() {
        vec![Action::Wait]
    } else {
        actions
    }
}

fn validate_depth(depth: u32) -> Result<(), ConfigError> {
    if depth == 0 {
        return Err(ConfigError::DepthTooShallow);
    }
    if depth > MAX_SEARCH_DEPTH {
        return Err(ConfigError::DepthTooDeep {
            depth,
            max: MAX_SEARCH_DEPTH,
        });
    }
    Ok(())
}
