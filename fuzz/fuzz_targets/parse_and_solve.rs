#![no_main]

use libfuzzer_sys::fuzz_target;

use maze::algorithms::uninformed::SearchError;
use maze::algorithms::uninformed::UninformedSearch;
use maze::data_structures::frontier::FrontierPolicy;
use maze::problem::Problem;
use maze::problems::maze_2d::Maze2DAction;
use maze::problems::maze_2d::Maze2DProblem;
use maze::problems::maze_2d::Maze2DSpace;
use maze::problems::maze_2d::Maze2DState;
use maze::space::Space;

fuzz_target!(|data: &str| {
    let Ok(problem) = Maze2DProblem::try_from(data) else {
        return;
    };

    let mut lengths = vec![];
    for policy in [FrontierPolicy::Stack, FrontierPolicy::Queue] {
        let mut search =
            UninformedSearch::<Maze2DProblem, Maze2DSpace, Maze2DState, Maze2DAction>::new(
                &problem, policy,
            );
        match search.solve() {
            Ok(path) => {
                assert!(problem.space().valid_path(path));
                assert_eq!(path.end, Some(problem.goal()));
                lengths.push(path.len());
            }
            Err(SearchError::NoSolution { .. }) => {}
            Err(e) => panic!("Unexpected search error: {e}"),
        }
    }

    // BFS never loses against DFS.
    if let &[dfs, bfs] = lengths.as_slice() {
        assert!(bfs <= dfs);
    }
});
