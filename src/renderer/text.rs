use rustc_hash::FxHashSet;

use crate::problem::Problem;
use crate::problems::maze_2d::Maze2DAction;
use crate::problems::maze_2d::Maze2DCell;
use crate::problems::maze_2d::Maze2DProblem;
use crate::problems::maze_2d::Maze2DState;
use crate::space::Path;

const SOLUTION_CELL: char = '*';

/// Text view of a maze, optionally highlighting a solution with `*`.
#[derive(Debug)]
pub struct TextRender<'a> {
    problem: &'a Maze2DProblem,
    solution: Option<&'a Path<Maze2DState, Maze2DAction>>,
}

impl<'a> TextRender<'a> {
    pub fn new(problem: &'a Maze2DProblem) -> Self {
        Self {
            problem,
            solution: None,
        }
    }

    pub fn with_solution(mut self, solution: Option<&'a Path<Maze2DState, Maze2DAction>>) -> Self {
        self.solution = solution;
        self
    }
}

impl std::fmt::Display for TextRender<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let solution: FxHashSet<Maze2DState> = self
            .solution
            .map(|p| p.cells().collect())
            .unwrap_or_default();
        let space = self.problem.space();
        let (height, width) = space.dimensions();

        for row in 0..height {
            for col in 0..width {
                let s = Maze2DState::new_from_small_usize(row, col);

                if space.is_wall(&s) {
                    write!(f, "{}", Maze2DCell::Wall)?;
                } else if s == self.problem.start() {
                    write!(f, "A")?;
                } else if s == self.problem.goal() {
                    write!(f, "B")?;
                } else if solution.contains(&s) {
                    write!(f, "{SOLUTION_CELL}")?;
                } else {
                    write!(f, "{}", Maze2DCell::Empty)?;
                }
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
