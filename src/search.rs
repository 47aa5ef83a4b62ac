use std::fmt::Debug;

use nonmax::NonMaxUsize;

use crate::data_structures::frontier::FrontierNode;
use crate::space::Action;
use crate::space::Path;
use crate::space::State;

/// A reference to a `SearchTreeNode<St, A>`.
///
/// An index into the `SearchTree` arena. `NonMaxUsize` lets
/// `Option<SearchTreeIndex>` be as wide as a `usize`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchTreeIndex {
    index: NonMaxUsize,
}

impl SearchTreeIndex {
    #[inline(always)]
    fn get(&self) -> usize {
        self.index.get()
    }
}

/// A node in the Search Tree.
///
/// Nodes never change after being created. Their parent is always created
/// before them, so the tree can't have cycles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchTreeNode<St, A>
where
    St: State,
    A: Action,
{
    pub(crate) parent: Option<(SearchTreeIndex, A)>,
    pub(crate) state: St,
}

impl<St, A> SearchTreeNode<St, A>
where
    St: State,
    A: Action,
{
    pub fn new_root(s: St) -> Self {
        Self {
            parent: None,
            state: s,
        }
    }
    pub fn new(s: St, parent: SearchTreeIndex, a: A) -> Self {
        Self {
            parent: Some((parent, a)),
            state: s,
        }
    }

    pub fn state(&self) -> &St {
        &self.state
    }
    /// The action that reached this node. `None` on roots.
    pub fn action(&self) -> Option<A> {
        self.parent.map(|(_p, a)| a)
    }
    pub fn parent(&self) -> Option<SearchTreeIndex> {
        self.parent.map(|(p, _a)| p)
    }
}

/// A node waiting in the Frontier.
///
/// Carries its State so the Frontier can track it without looking into the
/// Search Tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OpenNode<St: State> {
    pub state: St,
    pub node_index: SearchTreeIndex,
}

impl<St: State> FrontierNode for OpenNode<St> {
    type State = St;

    #[inline(always)]
    fn state(&self) -> St {
        self.state
    }
}

/// All the Search Nodes of a single search.
///
/// An append-only arena, dropped as a whole once the search is over.
pub struct SearchTree<St, A>
where
    St: State,
    A: Action,
{
    nodes: Vec<SearchTreeNode<St, A>>,
}

impl<St, A> SearchTree<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: vec![] }
    }

    #[inline(always)]
    pub fn push(&mut self, node: SearchTreeNode<St, A>) -> SearchTreeIndex {
        debug_assert!(node.parent().is_none_or(|p| p.get() < self.nodes.len()));

        // SAFETY: `SearchTreeNode` holds at least a `SearchTreeIndex`, so it
        // is never zero-sized and a `Vec` of them never holds more than
        // `isize::MAX` elements. The length is below `usize::MAX`.
        let index = unsafe { NonMaxUsize::new_unchecked(self.nodes.len()) };
        self.nodes.push(node);
        SearchTreeIndex { index }
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Reconstructs the Path from the root to a node.
    #[must_use]
    pub fn path(&self, mut node_index: SearchTreeIndex) -> Path<St, A> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("PathReconstruction");

        let mut steps = vec![];
        while let Some((parent_index, a)) = self[node_index].parent {
            steps.push((a, self[node_index].state));
            debug_assert!(parent_index.get() < node_index.get());
            node_index = parent_index;
        }

        Path::from_reversed_steps(self[node_index].state, steps)
    }
}

impl<St, A> Default for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, A> std::ops::Index<SearchTreeIndex> for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    type Output = SearchTreeNode<St, A>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.get()]
    }
}

impl<St, A> std::fmt::Debug for SearchTree<St, A>
where
    St: State,
    A: Action,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}
