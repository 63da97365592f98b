//! Best-first carpool search.
//!
//! The search pops the cheapest node from the frontier, finalizes it and
//! relaxes its edges, Dijkstra-style. It is not a single-goal search:
//!
//! - The primary criterion is the number of people left without a car. The
//!   search tracks the fewest seen so far and collects the first nodes it
//!   finalizes at that level as candidate arrangements. Whenever a node
//!   places more people, the candidates are thrown away and nodes that lag
//!   too far behind are forgotten.
//! - Within a level, cumulative cost decides: cheaper nodes are finalized,
//!   and therefore collected, first.
//! - Once enough candidates are collected and one of them places everyone,
//!   the search stops instead of enumerating every equally good arrangement.
//!
//! Memory is bounded twice: by that pruning, and by halving the frontier
//! whenever it reaches its maximum size.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, trace};

use crate::domain::{Arrangement, ArrangementNames, Roster};

use super::config::PlannerConfig;
use super::cost::CostModel;
use super::frontier::Frontier;
use super::node::{Edge, Node};
use super::progress::{ProgressSink, ProgressUpdate, Throttle};

/// Name given to the snapshot sent with progress updates.
const PROGRESS_SNAPSHOT_NAME: &str = "Exploring";

/// Error from carpool search.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PlannerError {
    /// The search reached a state that should be impossible
    #[error("internal planner error: {0}")]
    Internal(String),
}

/// Counters describing a finished search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchStats {
    /// Nodes finalized.
    pub nodes_explored: usize,

    /// Edges considered.
    pub edges_relaxed: usize,

    /// Times the frontier was cut in half.
    pub truncations: usize,

    /// Times lagging nodes were pruned after an improvement.
    pub prunes: usize,

    /// Largest frontier seen.
    pub peak_frontier: usize,

    /// Wall-clock time spent searching.
    pub elapsed_ms: u64,
}

/// Result of a search that ran to completion.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Best arrangements, best first.
    pub arrangements: Vec<Arrangement>,

    /// Fewest people left without a car in any arrangement found.
    pub min_unassigned: usize,

    /// Whether the whole reachable state space was explored.
    pub exhausted: bool,

    pub stats: SearchStats,
}

/// How a search ended.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// The search stopped on its own, with enough arrangements or none left to try.
    Finished(SearchResult),

    /// The progress sink reported that nobody wants the result.
    Cancelled,
}

impl SearchOutcome {
    /// Returns the result, if the search was not cancelled.
    pub fn finished(self) -> Option<SearchResult> {
        match self {
            SearchOutcome::Finished(result) => Some(result),
            SearchOutcome::Cancelled => None,
        }
    }
}

/// What happened during a single step of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Keep going.
    Continue,

    /// Enough arrangements have been collected.
    Stopped,

    /// The frontier is empty.
    Exhausted,

    Cancelled,
}

/// State of one search invocation.
///
/// Nothing is shared between sessions: create one per request, run it, and
/// drop it.
pub struct SearchSession<'a, S: ProgressSink> {
    roster: &'a Roster,
    config: &'a PlannerConfig,
    model: CostModel<'a>,
    sink: S,
    names: ArrangementNames,

    /// Best known cumulative cost of nodes not yet finalized.
    costs: HashMap<Rc<Node>, f64>,
    visited: HashSet<Rc<Node>>,
    frontier: Frontier,

    min_unassigned: usize,
    solutions: Vec<Rc<Node>>,

    throttle: Throttle,
    stats: SearchStats,
    started: Instant,
}

impl<'a, S: ProgressSink> SearchSession<'a, S> {
    /// Create a session with the root node already queued.
    pub fn new(roster: &'a Roster, config: &'a PlannerConfig, sink: S) -> Self {
        let root = Rc::new(Node::root());
        let mut costs = HashMap::new();
        costs.insert(Rc::clone(&root), 0.0);
        let mut frontier = Frontier::new();
        frontier.push(0.0, root);

        Self {
            roster,
            config,
            model: CostModel::new(&config.cost_equivalents, roster),
            sink,
            names: ArrangementNames::default(),
            costs,
            visited: HashSet::new(),
            frontier,
            min_unassigned: usize::MAX,
            solutions: Vec::new(),
            throttle: Throttle::new(config.progress_interval()),
            stats: SearchStats::default(),
            started: Instant::now(),
        }
    }

    /// Use `names` to name the resulting arrangements.
    pub fn with_names(mut self, names: ArrangementNames) -> Self {
        self.names = names;
        self
    }

    /// Run the search to completion.
    pub fn run(mut self) -> Result<SearchOutcome, PlannerError> {
        info!(
            people = self.roster.len(),
            max_queue_size = self.config.max_queue_size,
            "Starting carpool search"
        );

        let exhausted = loop {
            match self.step() {
                Step::Continue => {}
                Step::Stopped => break false,
                Step::Exhausted => break true,
                Step::Cancelled => {
                    debug!(
                        nodes_explored = self.stats.nodes_explored,
                        "Carpool search cancelled"
                    );
                    return Ok(SearchOutcome::Cancelled);
                }
            }
        };

        self.finish(exhausted).map(SearchOutcome::Finished)
    }

    /// Finalize the cheapest frontier node and relax its edges.
    pub(crate) fn step(&mut self) -> Step {
        if self.sink.is_cancelled() {
            return Step::Cancelled;
        }

        let Some((cost, node)) = self.frontier.pop() else {
            return Step::Exhausted;
        };

        // Stale entry left behind by a cheaper path
        if self.visited.contains(&node) {
            return Step::Continue;
        }

        self.costs.remove(&node);
        self.visited.insert(Rc::clone(&node));
        self.stats.nodes_explored += 1;

        let unassigned = node.num_unassigned(self.roster);
        trace!(%node, cost, unassigned, "Expanding node");

        if unassigned < self.min_unassigned {
            self.min_unassigned = unassigned;
            self.solutions.clear();
            self.prune();
        }

        if unassigned == self.min_unassigned && self.solutions.len() < self.config.num_arrangements
        {
            self.solutions.push(Rc::clone(&node));
        }

        if self.solutions.len() >= self.config.num_arrangements
            && self.solutions.iter().any(|n| n.is_done(self.roster))
        {
            return Step::Stopped;
        }

        for edge in node.edges(self.roster, &self.model) {
            self.relax(cost, edge);
        }

        Step::Continue
    }

    fn relax(&mut self, cost: f64, edge: Edge) {
        self.stats.edges_relaxed += 1;

        let new_cost = cost + edge.cost;
        let target = Rc::new(edge.target);

        let improves = !self.visited.contains(&target)
            && self
                .costs
                .get(&target)
                .is_none_or(|&known| new_cost < known);

        if improves {
            self.costs.insert(Rc::clone(&target), new_cost);
            if self.frontier.len() >= self.config.max_queue_size {
                self.truncate_frontier();
            }
            self.frontier.push(new_cost, Rc::clone(&target));
            self.stats.peak_frontier = self.stats.peak_frontier.max(self.frontier.len());
        }

        self.report_progress(&target);
    }

    /// Forget nodes that leave too many people behind the current best.
    fn prune(&mut self) {
        let limit = self
            .min_unassigned
            .saturating_add(self.config.num_people_to_unassign_in_search_of_better_result);
        let roster = self.roster;
        let keep = |node: &Node| node.num_unassigned(roster) <= limit;

        let before = self.frontier.len() + self.visited.len();
        self.frontier.retain(keep);
        self.visited.retain(|n| keep(n.as_ref()));
        self.costs.retain(|n, _| keep(n.as_ref()));
        self.stats.prunes += 1;

        debug!(
            min_unassigned = self.min_unassigned,
            limit,
            forgotten = before - (self.frontier.len() + self.visited.len()),
            "Fewer people unassigned, pruned lagging nodes"
        );
    }

    fn truncate_frontier(&mut self) {
        let dropped = self.frontier.truncate_to_cheaper_half();
        self.stats.truncations += 1;

        // Let dropped nodes be rediscovered if their best path went with them
        for (cost, node) in &dropped {
            if self.costs.get(node) == Some(cost) {
                self.costs.remove(node);
            }
        }

        debug!(
            dropped = dropped.len(),
            kept = self.frontier.len(),
            "Frontier full, dropped the more expensive half"
        );
    }

    fn report_progress(&mut self, latest: &Node) {
        if !self.throttle.ready() {
            return;
        }
        self.sink.progress(ProgressUpdate {
            num_arrangements_discovered: self.frontier.len(),
            num_arrangements_explored: self.stats.nodes_explored,
            latest_arrangement_explored: latest
                .to_arrangement(PROGRESS_SNAPSHOT_NAME, self.roster),
        });
    }

    fn finish(mut self, exhausted: bool) -> Result<SearchResult, PlannerError> {
        for node in &self.solutions {
            self.check_solution(node)?;
        }

        let arrangements = self
            .solutions
            .iter()
            .map(|node| node.to_arrangement(self.names.next_name(), self.roster))
            .collect();

        self.stats.elapsed_ms = saturating_millis(self.started.elapsed());
        info!(
            arrangements = self.solutions.len(),
            min_unassigned = self.min_unassigned,
            exhausted,
            nodes_explored = self.stats.nodes_explored,
            edges_relaxed = self.stats.edges_relaxed,
            truncations = self.stats.truncations,
            peak_frontier = self.stats.peak_frontier,
            elapsed_ms = self.stats.elapsed_ms,
            "Carpool search complete"
        );

        Ok(SearchResult {
            arrangements,
            min_unassigned: self.min_unassigned,
            exhausted,
            stats: self.stats,
        })
    }

    fn check_solution(&self, node: &Node) -> Result<(), PlannerError> {
        for car in node.cars() {
            if car.occupants().iter().any(|&p| p >= self.roster.len()) {
                return Err(PlannerError::Internal(format!(
                    "{node} refers to someone outside the roster"
                )));
            }
            if car.len() > self.roster[car.driver()].max_passengers as usize {
                return Err(PlannerError::Internal(format!(
                    "{node} puts too many people in {}'s car",
                    self.roster[car.driver()].id
                )));
            }
        }
        if node.is_done(self.roster) && !node.covers(self.roster) {
            return Err(PlannerError::Internal(format!(
                "{node} is complete but does not place everyone exactly once"
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    #[cfg(test)]
    pub(crate) fn visited(&self) -> impl Iterator<Item = &Node> + '_ {
        self.visited.iter().map(|n| n.as_ref())
    }

    #[cfg(test)]
    pub(crate) fn min_unassigned(&self) -> usize {
        self.min_unassigned
    }

    #[cfg(test)]
    pub(crate) fn solutions(&self) -> impl Iterator<Item = &Node> + '_ {
        self.solutions.iter().map(|n| n.as_ref())
    }

    #[cfg(test)]
    pub(crate) fn frontier_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.frontier.nodes()
    }
}

fn saturating_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Run a search over `roster`, naming results with `names`.
pub fn plan_carpools<S: ProgressSink>(
    roster: &Roster,
    config: &PlannerConfig,
    names: ArrangementNames,
    sink: S,
) -> Result<SearchOutcome, PlannerError> {
    SearchSession::new(roster, config, sink)
        .with_names(names)
        .run()
}
