use derive_more::Display;
use thiserror::Error;

use crate::problem::Problem;
use crate::renderer::text::TextRender;
use crate::space::Action;
use crate::space::Neighbours;
use crate::space::Space;
use crate::space::State;

const RANDOM_STATE_MAX_TRIES: usize = 10_000;

pub type Coord = u32;

/// A cell position, as `(row, col)`.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[display("({row},{col})")]
pub struct Maze2DState {
    pub(crate) row: Coord,
    pub(crate) col: Coord,
}

impl Maze2DState {
    pub fn new(row: Coord, col: Coord) -> Maze2DState {
        Maze2DState { row, col }
    }
    pub(crate) fn new_from_small_usize(row: usize, col: usize) -> Maze2DState {
        debug_assert!(row < Coord::MAX as usize);
        debug_assert!(col < Coord::MAX as usize);

        Maze2DState {
            row: row as Coord,
            col: col as Coord,
        }
    }
    /// Whether every cell of a `max_row x max_col` map has a representable
    /// State, leaving `Coord::MAX` free to signal underflows.
    pub(crate) fn safe_dimensions(max_row: usize, max_col: usize) -> bool {
        (max_row < Coord::MAX as usize) && (max_col < Coord::MAX as usize)
    }

    #[inline(always)]
    pub fn row(&self) -> usize {
        self.row as usize
    }
    #[inline(always)]
    pub fn col(&self) -> usize {
        self.col as usize
    }
}
impl State for Maze2DState {}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum Maze2DAction {
    #[display("↑")]
    Up = 0, // row--
    #[display("↓")]
    Down = 1, // row++
    #[display("←")]
    Left = 2, // col--
    #[display("→")]
    Right = 3, // col++
}
impl Action for Maze2DAction {}

impl Maze2DAction {
    /// All actions, in expansion order.
    pub const ALL: [Maze2DAction; 4] = [
        Maze2DAction::Up,
        Maze2DAction::Down,
        Maze2DAction::Left,
        Maze2DAction::Right,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Maze2DAction::Up => "up",
            Maze2DAction::Down => "down",
            Maze2DAction::Left => "left",
            Maze2DAction::Right => "right",
        }
    }

    /// `(row, col)` offsets, to be applied with wrapping arithmetic.
    #[inline(always)]
    fn delta(&self) -> (Coord, Coord) {
        let prev = Coord::MAX;
        let same: Coord = 0;
        let next: Coord = 1;

        #[rustfmt::skip]
        let d = match self {
            Maze2DAction::Up    => (prev, same),
            Maze2DAction::Down  => (next, same),
            Maze2DAction::Left  => (same, prev),
            Maze2DAction::Right => (same, next),
        };
        d
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Maze2DCell {
    #[display(" ")]
    Empty,
    #[display("█")]
    Wall,
}

impl std::convert::From<char> for Maze2DCell {
    /// Anything but a space is a wall.
    fn from(ch: char) -> Self {
        match ch {
            ' ' => Maze2DCell::Empty,
            _ => Maze2DCell::Wall,
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Maze2DSpace {
    pub(crate) map: Vec<Vec<Maze2DCell>>,
}

impl Maze2DSpace {
    /// Builds a Space out of rows of cells.
    ///
    /// Short rows are padded with empty cells up to the widest row.
    pub fn new_from_map(mut map: Vec<Vec<Maze2DCell>>) -> Self {
        let width = map.iter().map(Vec::len).max().unwrap_or(0);
        for row in &mut map {
            row.resize(width, Maze2DCell::Empty);
        }
        Self { map }
    }
    pub(crate) fn new_empty_with_dimensions(height: usize, width: usize) -> Self {
        Self {
            map: vec![vec![Maze2DCell::Empty; width]; height],
        }
    }

    /// `(height, width)`
    pub fn dimensions(&self) -> (usize, usize) {
        match self.map.first() {
            Some(row) => (self.map.len(), row.len()),
            None => (0, 0),
        }
    }
    pub fn height(&self) -> usize {
        self.dimensions().0
    }
    pub fn width(&self) -> usize {
        self.dimensions().1
    }

    #[inline(always)]
    fn at(&self, state: &Maze2DState) -> Maze2DCell {
        debug_assert!(self.valid(state));
        self.map[state.row()][state.col()]
    }

    /// Whether the cell is a wall. Cells outside the map are not walls.
    pub fn is_wall(&self, state: &Maze2DState) -> bool {
        self.valid(state) && self.at(state) == Maze2DCell::Wall
    }

    pub(crate) fn set(&mut self, state: &Maze2DState, cell: Maze2DCell) {
        debug_assert!(self.valid(state));
        self.map[state.row()][state.col()] = cell;
    }

    fn random_position<R: rand::Rng>(&self, r: &mut R) -> Option<Maze2DState> {
        let (height, width) = self.dimensions();
        if height == 0 || width == 0 {
            return None;
        }
        Some(Maze2DState::new_from_small_usize(
            r.random_range(0..height),
            r.random_range(0..width),
        ))
    }
}

impl Space<Maze2DState, Maze2DAction> for Maze2DSpace {
    #[inline(always)]
    fn apply(&self, state: &Maze2DState, action: &Maze2DAction) -> Option<Maze2DState> {
        let (dr, dc) = action.delta();
        let s = Maze2DState {
            row: state.row.wrapping_add(dr),
            col: state.col.wrapping_add(dc),
        };
        (self.valid(&s) && self.at(&s) == Maze2DCell::Empty).then_some(s)
    }

    #[inline(always)]
    fn valid(&self, state: &Maze2DState) -> bool {
        let (height, width) = self.dimensions();
        state.row() < height && state.col() < width
    }

    /// Gets the free orthogonal neighbours of a given position.
    ///
    /// They come in `Maze2DAction::ALL` order.
    ///
    /// NOTE: These states can only be used with the current Maze
    fn neighbours(&self, state: &Maze2DState) -> Neighbours<Maze2DState, Maze2DAction> {
        let mut v = Neighbours::<Maze2DState, Maze2DAction>::new();
        for action in Maze2DAction::ALL {
            if let Some(s) = self.apply(state, &action) {
                v.push((action, s));
            }
        }
        v
    }

    fn size(&self) -> Option<usize> {
        let (height, width) = self.dimensions();
        Some(height * width)
    }
}

impl std::fmt::Display for Maze2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        for line in &self.map {
            for cell in line {
                write!(f, "{cell}")?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Maze2DSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (height, width) = self.dimensions();
        write!(f, "Maze2D({height}x{width})")
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq)]
pub enum Maze2DProblemCell {
    Cell(Maze2DCell),
    #[display("A")]
    Start,
    #[display("B")]
    Goal,
}

impl std::convert::From<char> for Maze2DProblemCell {
    fn from(ch: char) -> Self {
        match ch {
            'A' => Maze2DProblemCell::Start,
            'B' => Maze2DProblemCell::Goal,
            ch => Maze2DProblemCell::Cell(Maze2DCell::from(ch)),
        }
    }
}

#[derive(Debug, Error)]
pub enum Maze2DProblemParseError {
    #[error("Maze must have exactly one start point ('A'), found none")]
    MissingStart,
    #[error("Maze must have exactly one start point ('A'), found {count}")]
    MultipleStarts { count: usize },
    #[error("Maze must have exactly one goal ('B'), found none")]
    MissingGoal,
    #[error("Maze must have exactly one goal ('B'), found {count}")]
    MultipleGoals { count: usize },
    #[error("Maze is too large ({height}x{width})")]
    TooLarge { height: usize, width: usize },
    #[error("I/O error when loading '{}': {e}", .p.display())]
    IOError {
        p: std::path::PathBuf,
        e: std::io::Error,
    },
}

impl Maze2DProblemParseError {
    /// Whether the input was readable but did not describe a valid maze.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Maze2DProblemParseError::IOError { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze2DProblem {
    space: Maze2DSpace,
    start: Maze2DState,
    goal: Maze2DState,
}

impl Maze2DProblem {
    /// Builds a Problem, as long as `start` and `goal` are free cells.
    pub fn new(space: Maze2DSpace, start: Maze2DState, goal: Maze2DState) -> Option<Self> {
        for s in [start, goal] {
            if !space.valid(&s) || space.is_wall(&s) {
                return None;
            }
        }
        Some(Self { space, start, goal })
    }

    /// Generates a random maze with walls placed with probability
    /// `wall_ratio`, and distinct start and goal cells.
    ///
    /// Nothing guarantees the goal is reachable.
    pub fn new_random<R: rand::Rng>(
        r: &mut R,
        height: usize,
        width: usize,
        wall_ratio: f64,
    ) -> Option<Maze2DProblem> {
        if height.saturating_mul(width) < 2 || !Maze2DState::safe_dimensions(height, width) {
            return None;
        }
        let wall_ratio = wall_ratio.clamp(0.0, 1.0);

        let map = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| {
                        if r.random_bool(wall_ratio) {
                            Maze2DCell::Wall
                        } else {
                            Maze2DCell::Empty
                        }
                    })
                    .collect()
            })
            .collect();
        let mut space = Maze2DSpace::new_from_map(map);

        let start = space.random_position(r)?;
        let mut goal = None;
        for _tries in 0..RANDOM_STATE_MAX_TRIES {
            let s = space.random_position(r)?;
            if s != start {
                goal = Some(s);
                break;
            }
        }
        let goal = goal?;

        space.set(&start, Maze2DCell::Empty);
        space.set(&goal, Maze2DCell::Empty);
        Maze2DProblem::new(space, start, goal)
    }
}

impl Problem<Maze2DSpace, Maze2DState, Maze2DAction> for Maze2DProblem {
    fn space(&self) -> &Maze2DSpace {
        &self.space
    }
    fn start(&self) -> Maze2DState {
        self.start
    }
    fn goal(&self) -> Maze2DState {
        self.goal
    }
}

impl std::convert::TryFrom<&str> for Maze2DProblem {
    type Error = Maze2DProblemParseError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        match s.matches('A').count() {
            0 => return Err(Maze2DProblemParseError::MissingStart),
            1 => {}
            count => return Err(Maze2DProblemParseError::MultipleStarts { count }),
        }
        match s.matches('B').count() {
            0 => return Err(Maze2DProblemParseError::MissingGoal),
            1 => {}
            count => return Err(Maze2DProblemParseError::MultipleGoals { count }),
        }

        let lines: Vec<&str> = s.lines().collect();
        let height = lines.len();
        let width = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        if !Maze2DState::safe_dimensions(height, width) {
            return Err(Maze2DProblemParseError::TooLarge { height, width });
        }

        // Columns past the end of a short line stay empty.
        let mut space = Maze2DSpace::new_empty_with_dimensions(height, width);
        let mut start = None;
        let mut goal = None;

        for (row, line) in lines.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                let s = Maze2DState::new_from_small_usize(row, col);
                let cell = match Maze2DProblemCell::from(ch) {
                    Maze2DProblemCell::Start => {
                        start = Some(s);
                        Maze2DCell::Empty
                    }
                    Maze2DProblemCell::Goal => {
                        goal = Some(s);
                        Maze2DCell::Empty
                    }
                    Maze2DProblemCell::Cell(c) => c,
                };
                space.set(&s, cell);
            }
        }

        match (start, goal) {
            (Some(start), Some(goal)) => Ok(Maze2DProblem { space, start, goal }),
            (None, _) => Err(Maze2DProblemParseError::MissingStart),
            (_, None) => Err(Maze2DProblemParseError::MissingGoal),
        }
    }
}

impl std::convert::TryFrom<&std::path::Path> for Maze2DProblem {
    type Error = Maze2DProblemParseError;

    fn try_from(p: &std::path::Path) -> Result<Self, Self::Error> {
        let contents =
            std::fs::read_to_string(p).map_err(|e| Maze2DProblemParseError::IOError {
                p: p.to_path_buf(),
                e,
            })?;
        log::debug!("Loaded {} bytes from {}", contents.len(), p.display());

        Maze2DProblem::try_from(contents.as_str())
    }
}

impl std::fmt::Display for Maze2DProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", TextRender::new(self))
    }
}
