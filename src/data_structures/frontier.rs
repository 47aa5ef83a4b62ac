use std::collections::VecDeque;
use std::fmt::Debug;

use derive_more::Display;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::space::State;

/// Frontier Node
///
/// Something waiting in the Frontier that knows which State it stands for.
pub trait FrontierNode: Debug {
    type State: State;

    fn state(&self) -> Self::State;
}

/// Removal order of a Frontier.
///
/// This is the only difference between depth-first and breadth-first search.
#[derive(Copy, Clone, Debug, Default, Display, PartialEq, Eq, Hash)]
pub enum FrontierPolicy {
    /// Last-in-first-out. Yields depth-first search.
    #[default]
    #[display("Stack")]
    Stack,
    /// First-in-first-out. Yields breadth-first search.
    #[display("Queue")]
    Queue,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrontierError {
    #[error("Empty frontier")]
    Empty,
}

/// The nodes discovered but not yet expanded.
///
/// Nodes are kept in insertion order and removed from either end depending on
/// the `FrontierPolicy`. A count of the pending nodes for each State answers
/// `contains_state()` without scanning.
///
/// The Frontier does not de-duplicate States, callers decide whether adding an
/// already pending State makes sense.
#[derive(Debug)]
pub struct Frontier<N>
where
    N: FrontierNode,
{
    policy: FrontierPolicy,
    nodes: VecDeque<N>,
    pending: FxHashMap<N::State, usize>,
}

impl<N> Frontier<N>
where
    N: FrontierNode,
{
    pub fn new(policy: FrontierPolicy) -> Self {
        Self {
            policy,
            nodes: VecDeque::new(),
            pending: FxHashMap::default(),
        }
    }

    pub fn policy(&self) -> FrontierPolicy {
        self.policy
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn add(&mut self, node: N) {
        *self.pending.entry(node.state()).or_default() += 1;
        self.nodes.push_back(node);
    }

    pub fn contains_state(&self, s: &N::State) -> bool {
        self.pending.contains_key(s)
    }

    /// Removes the next node according to the policy.
    pub fn remove(&mut self) -> Result<N, FrontierError> {
        let node = match self.policy {
            FrontierPolicy::Stack => self.nodes.pop_back(),
            FrontierPolicy::Queue => self.nodes.pop_front(),
        }
        .ok_or(FrontierError::Empty)?;

        let s = node.state();
        match self.pending.get_mut(&s) {
            Some(count) if *count > 1 => *count -= 1,
            Some(_) => {
                self.pending.remove(&s);
            }
            None => unreachable!("Removed a node whose State was not pending"),
        }

        Ok(node)
    }

    /// Pending States, in insertion order.
    pub fn states(&self) -> impl Iterator<Item = N::State> + '_ {
        self.nodes.iter().map(|n| n.state())
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.pending.clear();
    }
}
