//! Generic best-first (A*) graph search.
//!
//! The graph is never materialised: a [`SearchSpace`] supplies neighbours,
//! edge costs and the heuristic on demand. Nodes move `unseen → open →
//! closed`; a closed node is never reopened, which assumes edge costs are
//! non-negative.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
    fmt,
    hash::Hash,
    marker::PhantomData,
};

use ordered_float::OrderedFloat;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// The graph an [`AStar`] search runs over.
pub trait SearchSpace {
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// Estimated remaining cost from `node` to `goal`.
    fn heuristic(&self, node: Self::Node, goal: Self::Node) -> f64;

    /// Cost of the edge `from → to`. `to` is always one of
    /// `self.neighbors(from)`.
    fn edge_cost(&self, from: Self::Node, to: Self::Node) -> f64;

    fn neighbors(&self, node: Self::Node) -> Vec<Self::Node>;

    fn is_goal(&self, node: Self::Node, goal: Self::Node) -> bool {
        node == goal
    }
}

/// A [`SearchSpace`] made of four closures.
pub struct FnSpace<T, H, C, N, G> {
    pub heuristic: H,
    pub edge_cost: C,
    pub neighbors: N,
    pub is_goal: G,
    _node: PhantomData<fn(T) -> T>,
}

impl<T, H, C, N, G> FnSpace<T, H, C, N, G>
where
    H: Fn(T, T) -> f64,
    C: Fn(T, T) -> f64,
    N: Fn(T) -> Vec<T>,
    G: Fn(T, T) -> bool,
{
    pub fn new(heuristic: H, edge_cost: C, neighbors: N, is_goal: G) -> Self {
        Self {
            heuristic,
            edge_cost,
            neighbors,
            is_goal,
            _node: PhantomData,
        }
    }
}

impl<T, H, C, N, G> SearchSpace for FnSpace<T, H, C, N, G>
where
    T: Copy + Eq + Hash + fmt::Debug,
    H: Fn(T, T) -> f64,
    C: Fn(T, T) -> f64,
    N: Fn(T) -> Vec<T>,
    G: Fn(T, T) -> bool,
{
    type Node = T;

    fn heuristic(&self, node: T, goal: T) -> f64 {
        (self.heuristic)(node, goal)
    }

    fn edge_cost(&self, from: T, to: T) -> f64 {
        (self.edge_cost)(from, to)
    }

    fn neighbors(&self, node: T) -> Vec<T> {
        (self.neighbors)(node)
    }

    fn is_goal(&self, node: T, goal: T) -> bool {
        (self.is_goal)(node, goal)
    }
}

/// Result of a search that ran to completion.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchOutcome<N> {
    /// Nodes from start to goal, or empty if the goal is unreachable.
    pub path: Vec<N>,
    /// Sum of edge costs along `path`.
    pub cost: f64,
    /// Number of nodes closed.
    pub expanded: usize,
}

impl<N> SearchOutcome<N> {
    pub fn is_found(&self) -> bool {
        !self.path.is_empty()
    }
}

#[derive(Clone, Debug)]
struct SearchNode<N> {
    g_score: f64,
    f_score: f64,
    closed: bool,
    in_open_set: bool,
    /// Sequence number of this node's live entry in the open queue.
    open_seq: u64,
    came_from: Option<N>,
}

impl<N> Default for SearchNode<N> {
    fn default() -> Self {
        Self {
            g_score: f64::INFINITY,
            f_score: f64::INFINITY,
            closed: false,
            in_open_set: false,
            open_seq: 0,
            came_from: None,
        }
    }
}

/// Open-queue entry. Ordered so the heap pops the lowest `f_score`
/// first, then the earliest inserted.
struct OpenEntry<N> {
    f_score: OrderedFloat<f64>,
    seq: u64,
    node: N,
}

impl<N> PartialEq for OpenEntry<N> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<N> Eq for OpenEntry<N> {}

impl<N> PartialOrd for OpenEntry<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<N> Ord for OpenEntry<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        (other.f_score, other.seq).cmp(&(self.f_score, self.seq))
    }
}

/// A* search driver.
#[derive(Copy, Clone, Debug, Default)]
pub struct AStar {
    max_expansions: Option<usize>,
}

impl AStar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give up with [`Error::SearchBudgetExhausted`] after closing this
    /// many nodes. `None` means unbounded.
    #[must_use]
    pub fn max_expansions(mut self, limit: Option<usize>) -> Self {
        self.max_expansions = limit;
        self
    }

    pub fn run<S: SearchSpace>(
        &self,
        space: &S,
        start: S::Node,
        goal: S::Node,
    ) -> Result<SearchOutcome<S::Node>> {
        if space.is_goal(start, goal) {
            return Ok(SearchOutcome {
                path: vec![start],
                cost: 0.0,
                expanded: 0,
            });
        }

        let mut nodes: HashMap<S::Node, SearchNode<S::Node>> = HashMap::new();
        let mut open = BinaryHeap::new();
        let mut seq = 0;
        let mut expanded = 0;

        let start_f = space.heuristic(start, goal);
        nodes.insert(
            start,
            SearchNode {
                g_score: 0.0,
                f_score: start_f,
                in_open_set: true,
                ..SearchNode::default()
            },
        );
        open.push(OpenEntry {
            f_score: OrderedFloat(start_f),
            seq,
            node: start,
        });

        while let Some(OpenEntry {
            seq: entry_seq,
            node: current,
            ..
        }) = open.pop()
        {
            let entry = nodes.entry(current).or_default();
            // Superseded by a cheaper re-insertion.
            if entry.closed || !entry.in_open_set || entry.open_seq != entry_seq {
                continue;
            }
            let current_g = entry.g_score;

            if space.is_goal(current, goal) {
                let path = reconstruct_path(&nodes, current);
                debug!(
                    start = ?start,
                    goal = ?goal,
                    hops = path.len() - 1,
                    cost = current_g,
                    expanded,
                    "found path"
                );
                return Ok(SearchOutcome {
                    path,
                    cost: current_g,
                    expanded,
                });
            }

            if self.max_expansions.is_some_and(|limit| expanded >= limit) {
                debug!(start = ?start, goal = ?goal, expanded, "search budget exhausted");
                return Err(Error::SearchBudgetExhausted { expanded });
            }

            entry.in_open_set = false;
            entry.closed = true;
            expanded += 1;

            let neighbors = space.neighbors(current);
            trace!(
                node = ?current,
                g = current_g,
                neighbors = neighbors.len(),
                open = open.len(),
                "expanding"
            );

            for neighbor in neighbors {
                let node = nodes.entry(neighbor).or_default();
                if node.closed {
                    continue;
                }
                let tentative_g = current_g + space.edge_cost(current, neighbor);
                if tentative_g >= node.g_score {
                    continue;
                }

                seq += 1;
                node.came_from = Some(current);
                node.g_score = tentative_g;
                node.f_score = tentative_g + space.heuristic(neighbor, goal);
                node.in_open_set = true;
                node.open_seq = seq;
                open.push(OpenEntry {
                    f_score: OrderedFloat(node.f_score),
                    seq,
                    node: neighbor,
                });
            }
        }

        debug!(start = ?start, goal = ?goal, expanded, "no path");
        Ok(SearchOutcome {
            path: Vec::new(),
            cost: f64::INFINITY,
            expanded,
        })
    }
}

fn reconstruct_path<N: Copy + Eq + Hash>(nodes: &HashMap<N, SearchNode<N>>, last: N) -> Vec<N> {
    let mut path = vec![last];
    let mut current = last;
    while let Some(prev) = nodes.get(&current).and_then(|node| node.came_from) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}
