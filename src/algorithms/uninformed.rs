//! Uninformed search: depth-first and breadth-first.
//!
//! Both strategies share a single traversal loop and only differ on the
//! `FrontierPolicy` used to pick the next node to expand.

use std::marker::PhantomData;

use derive_more::Display;
use rustc_hash::FxHashSet;
use size::Size;
use thiserror::Error;
use thousands::Separable;

use crate::data_structures::frontier::Frontier;
use crate::data_structures::frontier::FrontierError;
use crate::data_structures::frontier::FrontierPolicy;
use crate::problem::Problem;
use crate::search::OpenNode;
use crate::search::SearchTree;
use crate::search::SearchTreeNode;
use crate::space::Action;
use crate::space::Path;
use crate::space::Space;
use crate::space::State;

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum SearchStatus {
    /// Not started yet.
    Ready,
    Running,
    /// The goal was reached, the solution is available.
    Solved,
    /// The frontier ran out before reaching the goal.
    Unsolvable,
    /// Hit the expansion limit.
    Aborted,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("No solution after exploring {explored} states")]
    NoSolution { explored: usize },
    #[error("Search aborted after exploring {explored} states (limit: {limit})")]
    Aborted { explored: usize, limit: usize },
    #[error("Frontier error: {0}")]
    Frontier(#[from] FrontierError),
}

/// Uninformed search for single-start, single-goal Problems.
///
/// Every call to `solve()` starts from scratch, after which the explored set,
/// the counters and the solution of that run remain available for
/// inspection.
#[derive(Debug)]
pub struct UninformedSearch<'p, P, Sp, St, A>
where
    P: Problem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    problem: &'p P,
    /// Expansions allowed before giving up. Unlimited if `None`.
    max_expansions: Option<usize>,

    /// All the Search Nodes created so far. Parents always come first.
    search_tree: SearchTree<St, A>,
    /// Discovered nodes that are waiting to be expanded.
    frontier: Frontier<OpenNode<St>>,
    /// States that were already expanded.
    ///
    /// ```pseudocode
    /// for s in self.frontier.states():
    ///   assert(s not in self.explored)
    /// ```
    explored: FxHashSet<St>,
    /// Number of nodes removed from the frontier, including the goal.
    num_explored: usize,

    solution: Option<Path<St, A>>,
    status: SearchStatus,

    _phantom_space: PhantomData<Sp>,
}

impl<'p, P, Sp, St, A> UninformedSearch<'p, P, Sp, St, A>
where
    P: Problem<Sp, St, A>,
    Sp: Space<St, A>,
    St: State,
    A: Action,
{
    #[must_use]
    pub fn new(problem: &'p P, policy: FrontierPolicy) -> Self {
        Self {
            problem,
            max_expansions: None,
            search_tree: SearchTree::new(),
            frontier: Frontier::new(policy),
            explored: FxHashSet::default(),
            num_explored: 0,
            solution: None,
            status: SearchStatus::Ready,
            _phantom_space: PhantomData,
        }
    }

    /// Depth-first search.
    #[must_use]
    pub fn dfs(problem: &'p P) -> Self {
        Self::new(problem, FrontierPolicy::Stack)
    }

    /// Breadth-first search.
    #[must_use]
    pub fn bfs(problem: &'p P) -> Self {
        Self::new(problem, FrontierPolicy::Queue)
    }

    /// Gives up with `SearchError::Aborted` once `limit` nodes were expanded
    /// without reaching the goal.
    #[must_use]
    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    fn reset(&mut self) {
        self.search_tree.clear();
        self.frontier.clear();
        self.explored.clear();
        self.num_explored = 0;
        self.solution = None;
        self.status = SearchStatus::Ready;
    }

    /// Runs the search until the goal is found or the frontier is exhausted.
    pub fn solve(&mut self) -> Result<&Path<St, A>, SearchError> {
        #[cfg(feature = "coz_profile")]
        coz::scope!("Solve");

        self.reset();

        let start = self.problem.start();
        let root = self.search_tree.push(SearchTreeNode::new_root(start));
        self.frontier.add(OpenNode {
            state: start,
            node_index: root,
        });
        self.status = SearchStatus::Running;
        log::debug!(
            "Searching from {start} to {} with a {} frontier",
            self.problem.goal(),
            self.frontier.policy()
        );

        loop {
            self.verify_search();

            if self.frontier.is_empty() {
                self.status = SearchStatus::Unsolvable;
                log::debug!("No solution after exploring {} states", self.num_explored);
                return Err(SearchError::NoSolution {
                    explored: self.num_explored,
                });
            }
            if let Some(limit) = self.max_expansions {
                if self.num_explored >= limit {
                    self.status = SearchStatus::Aborted;
                    log::warn!("Search aborted after exploring {} states", self.num_explored);
                    return Err(SearchError::Aborted {
                        explored: self.num_explored,
                        limit,
                    });
                }
            }

            #[cfg(feature = "coz_profile")]
            coz::scope!("NodeExpansion");

            let OpenNode { state, node_index } = self.frontier.remove()?;
            self.num_explored += 1;
            log::trace!("Expanding {state}");

            if self.problem.is_goal(&state) {
                #[cfg(feature = "coz_profile")]
                coz::progress!("GoalFound");

                let path = self.search_tree.path(node_index);
                debug_assert!(self.problem.space().valid_path(&path));
                self.status = SearchStatus::Solved;
                log::debug!(
                    "Found {path} after exploring {} states",
                    self.num_explored
                );
                return Ok(&*self.solution.insert(path));
            }

            self.explored.insert(state);

            for (a, s) in self.problem.space().neighbours(&state) {
                if self.explored.contains(&s) || self.frontier.contains_state(&s) {
                    continue;
                }
                let child = self.search_tree.push(SearchTreeNode::new(s, node_index, a));
                self.frontier.add(OpenNode {
                    state: s,
                    node_index: child,
                });
            }
        }
    }

    pub fn policy(&self) -> FrontierPolicy {
        self.frontier.policy()
    }
    pub fn status(&self) -> SearchStatus {
        self.status
    }
    /// The solution found by the last `solve()`, if it succeeded.
    pub fn solution(&self) -> Option<&Path<St, A>> {
        self.solution.as_ref()
    }
    /// Nodes removed from the frontier during the last `solve()`.
    pub fn num_explored(&self) -> usize {
        self.num_explored
    }
    /// States expanded during the last `solve()`. Doesn't include the goal.
    pub fn explored(&self) -> &FxHashSet<St> {
        &self.explored
    }
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }
    pub fn nodes_len(&self) -> usize {
        self.search_tree.len()
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    fn verify_search(&self) {
        // All good... (hopefully)
    }
    #[inline(always)]
    #[cfg(feature = "verify")]
    fn verify_search(&self) {
        for s in self.frontier.states() {
            debug_assert!(!self.explored.contains(&s), "{s} is both open and explored");
        }
        debug_assert!(self.explored.len() <= self.num_explored);
        debug_assert!(self.frontier.len() <= self.search_tree.len());
        if let Some(size) = self.problem.space().size() {
            debug_assert!(self.num_explored <= size);
        }
    }

    pub fn write_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use std::mem::size_of;

        writeln!(out, "Search stats ({}, {}):", self.policy(), self.status)?;
        writeln!(
            out,
            "  - Explored states: {}",
            self.num_explored.separate_with_commas()
        )?;
        if let Some(path) = &self.solution {
            writeln!(
                out,
                "  - Solution length: {}",
                path.len().separate_with_commas()
            )?;
        }

        let l = self.search_tree.len();
        let s = size_of::<SearchTreeNode<St, A>>();
        writeln!(
            out,
            "  - |Nodes|:    {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let l = self.frontier.len();
        let s = size_of::<OpenNode<St>>();
        writeln!(
            out,
            "  - |Frontier|: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        let l = self.explored.len();
        let s = size_of::<St>();
        writeln!(
            out,
            "  - |Explored|: {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use indoc::indoc;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;

    use crate::problems::maze_2d::Maze2DAction;
    use crate::problems::maze_2d::Maze2DProblem;
    use crate::problems::maze_2d::Maze2DSpace;
    use crate::problems::maze_2d::Maze2DState;

    type Maze2DSearch<'p> =
        UninformedSearch<'p, Maze2DProblem, Maze2DSpace, Maze2DState, Maze2DAction>;

    const POLICIES: [FrontierPolicy; 2] = [FrontierPolicy::Stack, FrontierPolicy::Queue];

    fn is_adjacent(a: &Maze2DState, b: &Maze2DState) -> bool {
        a.row().abs_diff(b.row()) + a.col().abs_diff(b.col()) == 1
    }

    /// Checks the properties every solution must have.
    fn check_solution(problem: &Maze2DProblem, search: &Maze2DSearch) {
        let path = search.solution().unwrap();
        let space = problem.space();

        assert!(space.valid_path(path));
        assert_eq!(path.start, Some(problem.start()));
        assert_eq!(path.end, Some(problem.goal()));

        let mut prev = problem.start();
        for s in path.cells() {
            assert!(is_adjacent(&prev, &s), "{prev} -> {s}");
            assert!(!space.is_wall(&s));
            prev = s;
        }

        let (height, width) = space.dimensions();
        assert!(path.len() <= search.num_explored());
        assert!(search.num_explored() <= height * width);
    }

    /// Shortest path length, computed on a plain distance table.
    fn shortest_distance(problem: &Maze2DProblem) -> Option<usize> {
        let space = problem.space();
        let mut distance = rustc_hash::FxHashMap::default();
        let mut queue = std::collections::VecDeque::new();
        distance.insert(problem.start(), 0usize);
        queue.push_back(problem.start());

        while let Some(s) = queue.pop_front() {
            let d = distance[&s];
            if s == problem.goal() {
                return Some(d);
            }
            for (_a, n) in space.neighbours(&s) {
                if !distance.contains_key(&n) {
                    distance.insert(n, d + 1);
                    queue.push_back(n);
                }
            }
        }
        None
    }

    const OPEN_MAZE: &str = indoc! {"
        ##########
        #A       #
        # ###### #
        #      # #
        ###### # #
        #B       #
        ##########
    "};

    #[test]
    fn solves_with_both_policies() {
        let problem = Maze2DProblem::try_from(OPEN_MAZE).unwrap();

        for policy in POLICIES {
            let mut search = Maze2DSearch::new(&problem, policy);
            assert_eq!(search.status(), SearchStatus::Ready);

            let path = search.solve().unwrap().clone();
            assert_eq!(search.status(), SearchStatus::Solved);
            assert_eq!(search.solution(), Some(&path));
            check_solution(&problem, &search);

            // First step is one move away from the start.
            let first = path.cells().next().unwrap();
            assert!(problem.space().neighbours(&problem.start()).iter().any(|(_a, s)| *s == first));
        }
    }

    #[test]
    fn bfs_finds_shortest_path() {
        let problem = Maze2DProblem::try_from(OPEN_MAZE).unwrap();
        let mut search = Maze2DSearch::bfs(&problem);

        let path = search.solve().unwrap();
        assert_eq!(Some(path.len()), shortest_distance(&problem));
        assert_eq!(path.len(), 14);
    }

    #[test]
    fn policy_changes_traversal_order() {
        let problem = Maze2DProblem::try_from("   \n A \nB  ").unwrap();

        // Right is pushed last, so the stack goes right first and gets back
        // to the left side later.
        let mut dfs = Maze2DSearch::dfs(&problem);
        let actions: Vec<Maze2DAction> = dfs.solve().unwrap().actions().collect();
        assert_eq!(actions, vec![Maze2DAction::Left, Maze2DAction::Down]);
        assert_eq!(dfs.num_explored(), 6);

        // The queue expands by distance and reaches B through (2,1) first.
        let mut bfs = Maze2DSearch::bfs(&problem);
        let actions: Vec<Maze2DAction> = bfs.solve().unwrap().actions().collect();
        assert_eq!(actions, vec![Maze2DAction::Down, Maze2DAction::Left]);
        assert_eq!(bfs.num_explored(), 8);
    }

    #[test]
    fn small_maze_explicit_traversal() {
        // A at (0,0); (0,1) is the only way out.
        let problem = Maze2DProblem::try_from("A  \n### \n  B").unwrap();

        let mut search = Maze2DSearch::bfs(&problem);
        let path = search.solve().unwrap();
        assert_eq!(
            path.steps,
            vec![
                (Maze2DAction::Right, Maze2DState::new(0, 1)),
                (Maze2DAction::Right, Maze2DState::new(0, 2)),
                (Maze2DAction::Right, Maze2DState::new(0, 3)),
                (Maze2DAction::Down, Maze2DState::new(1, 3)),
                (Maze2DAction::Down, Maze2DState::new(2, 3)),
                (Maze2DAction::Left, Maze2DState::new(2, 2)),
            ]
        );
        // Every free cell but (2,0) and (2,1) is reached before the goal.
        assert_eq!(search.num_explored(), 7);

        let mut search = Maze2DSearch::dfs(&problem);
        assert_eq!(search.solve().unwrap().len(), 6);
        assert_eq!(search.num_explored(), 7);
    }

    #[test]
    fn walled_off_goal_has_no_solution() {
        let problem = Maze2DProblem::try_from(indoc! {"
            A#
            ## B
        "})
        .unwrap();

        for policy in POLICIES {
            let mut search = Maze2DSearch::new(&problem, policy);
            assert_eq!(
                search.solve(),
                Err(SearchError::NoSolution { explored: 1 })
            );
            assert_eq!(search.status(), SearchStatus::Unsolvable);
            assert_eq!(search.num_explored(), 1);
            assert!(search.solution().is_none());
        }
    }

    #[test]
    fn no_solution_explores_the_whole_component() {
        let problem = Maze2DProblem::try_from(indoc! {"
               #
            A  #
               #
            ####
            B
        "})
        .unwrap();

        for policy in POLICIES {
            let mut search = Maze2DSearch::new(&problem, policy);
            assert!(matches!(
                search.solve(),
                Err(SearchError::NoSolution { explored: 9 })
            ));
            assert_eq!(search.explored().len(), 9);
            assert_eq!(search.frontier_len(), 0);
        }
    }

    #[test]
    fn solving_twice_is_deterministic() {
        let problem = Maze2DProblem::try_from(OPEN_MAZE).unwrap();

        for policy in POLICIES {
            let mut search = Maze2DSearch::new(&problem, policy);
            let first = search.solve().unwrap().clone();
            let first_explored = search.num_explored();
            let second = search.solve().unwrap().clone();

            assert_eq!(first, second);
            assert_eq!(first_explored, search.num_explored());

            let mut other = Maze2DSearch::new(&problem, policy);
            assert_eq!(other.solve().unwrap(), &first);
        }
    }

    #[test]
    fn start_next_to_goal() {
        let problem = Maze2DProblem::try_from("AB").unwrap();

        for policy in POLICIES {
            let mut search = Maze2DSearch::new(&problem, policy);
            let path = search.solve().unwrap();
            assert_eq!(path.steps, vec![(Maze2DAction::Right, Maze2DState::new(0, 1))]);
            assert_eq!(search.num_explored(), 2);
        }
    }

    #[test]
    fn expansion_limit_aborts() {
        let problem = Maze2DProblem::try_from(OPEN_MAZE).unwrap();
        let mut search = Maze2DSearch::bfs(&problem).with_max_expansions(3);

        assert_eq!(
            search.solve(),
            Err(SearchError::Aborted {
                explored: 3,
                limit: 3
            })
        );
        assert_eq!(search.status(), SearchStatus::Aborted);
        assert!(search.solution().is_none());

        // A generous limit doesn't get in the way.
        let mut search = Maze2DSearch::bfs(&problem).with_max_expansions(1_000);
        assert!(search.solve().is_ok());
    }

    #[test]
    fn random_mazes() {
        for seed in 0..200 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let problem = Maze2DProblem::new_random(&mut rng, 15, 20, 0.3).unwrap();
            let shortest = shortest_distance(&problem);

            let mut bfs = Maze2DSearch::bfs(&problem);
            let mut dfs = Maze2DSearch::dfs(&problem);
            match shortest {
                Some(d) => {
                    assert_eq!(bfs.solve().unwrap().len(), d, "seed {seed}");
                    check_solution(&problem, &bfs);
                    assert!(dfs.solve().unwrap().len() >= d, "seed {seed}");
                    check_solution(&problem, &dfs);
                }
                None => {
                    assert!(matches!(bfs.solve(), Err(SearchError::NoSolution { .. })));
                    assert!(matches!(dfs.solve(), Err(SearchError::NoSolution { .. })));
                    // Both explore the start's whole component.
                    assert_eq!(bfs.num_explored(), dfs.num_explored());
                }
            }
        }
    }

    #[test]
    fn stats_are_written() {
        let problem = Maze2DProblem::try_from(OPEN_MAZE).unwrap();
        let mut search = Maze2DSearch::bfs(&problem);
        search.solve().unwrap();

        let mut out = vec![];
        search.write_stats(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Queue"));
        assert!(out.contains("Solved"));
        assert!(out.contains(&format!("Explored states: {}", search.num_explored())));
        assert!(out.contains("Solution length: 14"));
    }
}
