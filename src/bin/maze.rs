/// Maze solver
///
/// Solves a text maze, prints it before and after solving and draws the
/// solution and explored states into an image.
use std::path::PathBuf;
use std::process::ExitCode;

use anstream::eprintln;
use anstream::println;
use clap::Parser;
use clap::ValueEnum;
use hrsw::Stopwatch;
use human_duration::human_duration;
use owo_colors::OwoColorize;
use thiserror::Error;
use thousands::Separable;

use maze::algorithms::uninformed::SearchError;
use maze::algorithms::uninformed::UninformedSearch;
use maze::data_structures::frontier::FrontierPolicy;
use maze::problems::maze_2d::Maze2DAction;
use maze::problems::maze_2d::Maze2DProblem;
use maze::problems::maze_2d::Maze2DProblemParseError;
use maze::problems::maze_2d::Maze2DSpace;
use maze::problems::maze_2d::Maze2DState;
use maze::renderer::bitmap::ImageRender;
use maze::renderer::bitmap::ImageRenderError;
use maze::renderer::text::TextRender;

#[cfg(all(not(target_env = "msvc"), not(feature = "mem_profile")))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(feature = "mem_profile")]
#[global_allocator]
static GLOBAL: dhat::Alloc = dhat::Alloc;

// Usage errors exit with clap's code, 2.
const EXIT_NO_SOLUTION: u8 = 1;
const EXIT_MALFORMED_MAZE: u8 = 3;
const EXIT_IO: u8 = 4;
const EXIT_ABORTED: u8 = 5;
const EXIT_INTERNAL: u8 = 70;

type Maze2DSearch<'p> =
    UninformedSearch<'p, Maze2DProblem, Maze2DSpace, Maze2DState, Maze2DAction>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Algorithm {
    /// Depth-first search
    Dfs,
    /// Breadth-first search, finds shortest paths
    Bfs,
}

impl From<Algorithm> for FrontierPolicy {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Dfs => FrontierPolicy::Stack,
            Algorithm::Bfs => FrontierPolicy::Queue,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(long_version = maze::build::CLAP_LONG_VERSION)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Maze file. 'A' marks the start, 'B' the goal, ' ' free cells and
    /// anything else walls.
    #[arg()]
    pub maze: PathBuf,

    #[arg(short, long, env = "MAZE_ALGORITHM", value_enum, default_value_t = Algorithm::Dfs)]
    pub algorithm: Algorithm,

    /// Where to draw the solved maze.
    #[arg(short, long, env = "MAZE_IMAGE", default_value = "maze.png")]
    pub image: PathBuf,

    /// Skip drawing the image.
    #[arg(long)]
    pub no_image: bool,

    /// Don't highlight explored states in the image.
    #[arg(long)]
    pub hide_explored: bool,

    /// Give up after expanding this many states.
    #[arg(long, env = "MAZE_MAX_EXPANSIONS")]
    pub max_expansions: Option<usize>,

    /// Print search statistics.
    #[arg(short, long)]
    pub stats: bool,

    #[command(flatten)]
    color: colorchoice_clap::Color,
}

#[derive(Debug, Error)]
enum MazeError {
    #[error("{0}")]
    Parse(#[from] Maze2DProblemParseError),
    #[error("{0}")]
    Search(#[from] SearchError),
    #[error("{0}")]
    Render(#[from] ImageRenderError),
    #[error("I/O error: {0}")]
    IO(#[from] std::io::Error),
}

impl MazeError {
    fn exit_code(&self) -> u8 {
        match self {
            MazeError::Parse(e) if e.is_malformed() => EXIT_MALFORMED_MAZE,
            MazeError::Parse(_) => EXIT_IO,
            MazeError::Search(SearchError::NoSolution { .. }) => EXIT_NO_SOLUTION,
            MazeError::Search(SearchError::Aborted { .. }) => EXIT_ABORTED,
            MazeError::Search(SearchError::Frontier(_)) => EXIT_INTERNAL,
            MazeError::Render(_) | MazeError::IO(_) => EXIT_IO,
        }
    }
}

fn run(args: &Args) -> Result<(), MazeError> {
    let problem = Maze2DProblem::try_from(args.maze.as_path())?;
    println!("Maze:");
    println!();
    println!("{problem}");

    let mut search = Maze2DSearch::new(&problem, args.algorithm.into());
    if let Some(limit) = args.max_expansions {
        search = search.with_max_expansions(limit);
    }

    let mut stopwatch = Stopwatch::new_started();
    let result = search.solve().map(|path| path.len());
    stopwatch.stop();

    println!(
        "States Explored: {}",
        search.num_explored().separate_with_commas().bold()
    );
    println!("Search Time: {}", human_duration(&stopwatch.elapsed()));
    if args.stats {
        search.write_stats(std::io::stdout().lock())?;
    }

    let steps = result?;
    if let Some(path) = search.solution() {
        let actions: Vec<&str> = path.actions().map(|a| a.name()).collect();
        log::debug!("Actions: {}", actions.join(", "));
    }
    println!("Solution ({} steps):", steps.green());
    println!();
    println!(
        "{}",
        TextRender::new(&problem).with_solution(search.solution())
    );

    if !args.no_image {
        ImageRender::new(&problem)
            .with_solution(search.solution())
            .with_explored(search.explored())
            .show_explored(!args.hide_explored)
            .save(&args.image)?;
        println!("Image saved to {}", args.image.display().green());
    }

    Ok(())
}

fn main() -> ExitCode {
    #[cfg(feature = "mem_profile")]
    let _profiler = dhat::Profiler::new_heap();
    #[cfg(feature = "coz_profile")]
    coz::thread_init();

    let args = Args::parse();
    args.color.write_global();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.red());
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use maze::data_structures::frontier::FrontierError;

    #[test]
    fn exit_codes() {
        let malformed: MazeError = Maze2DProblemParseError::MissingStart.into();
        assert_eq!(malformed.exit_code(), EXIT_MALFORMED_MAZE);
        let malformed: MazeError = Maze2DProblemParseError::MultipleGoals { count: 2 }.into();
        assert_eq!(malformed.exit_code(), EXIT_MALFORMED_MAZE);

        let missing_file: MazeError = Maze2DProblemParseError::IOError {
            p: PathBuf::from("missing.txt"),
            e: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .into();
        assert_eq!(missing_file.exit_code(), EXIT_IO);

        let unsaved: MazeError = ImageRenderError::TooLarge {
            height: 1,
            width: 1,
            cell_size: u32::MAX,
        }
        .into();
        assert_eq!(unsaved.exit_code(), EXIT_IO);
        let io: MazeError = std::io::Error::other("broken pipe").into();
        assert_eq!(io.exit_code(), EXIT_IO);

        let no_solution: MazeError = SearchError::NoSolution { explored: 1 }.into();
        assert_eq!(no_solution.exit_code(), EXIT_NO_SOLUTION);
        let aborted: MazeError = SearchError::Aborted {
            explored: 3,
            limit: 3,
        }
        .into();
        assert_eq!(aborted.exit_code(), EXIT_ABORTED);
        let frontier: MazeError = SearchError::from(FrontierError::Empty).into();
        assert_eq!(frontier.exit_code(), EXIT_INTERNAL);
    }

    #[test]
    fn exit_codes_are_distinct() {
        let mut codes = vec![
            0,
            EXIT_NO_SOLUTION,
            2,
            EXIT_MALFORMED_MAZE,
            EXIT_IO,
            EXIT_ABORTED,
            EXIT_INTERNAL,
        ];
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 7);
    }

    #[test]
    fn usage_errors_exit_with_2() {
        let e = Args::try_parse_from(["maze"]).unwrap_err();
        assert_eq!(e.exit_code(), 2);

        let e = Args::try_parse_from(["maze", "a.txt", "b.txt"]).unwrap_err();
        assert_eq!(e.exit_code(), 2);

        let e = Args::try_parse_from(["maze", "a.txt", "--algorithm", "astar"]).unwrap_err();
        assert_eq!(e.exit_code(), 2);
    }

    #[test]
    fn parses_arguments() {
        let args = Args::try_parse_from(["maze", "a.txt", "-a", "bfs", "--no-image"]).unwrap();
        assert_eq!(args.maze, PathBuf::from("a.txt"));
        assert_eq!(FrontierPolicy::from(args.algorithm), FrontierPolicy::Queue);
        assert!(args.no_image);
        assert_eq!(args.max_expansions, None);
    }
}
