use image::Rgba;
use image::RgbaImage;
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::problem::Problem;
use crate::problems::maze_2d::Maze2DAction;
use crate::problems::maze_2d::Maze2DProblem;
use crate::problems::maze_2d::Maze2DState;
use crate::space::Path;

pub const DEFAULT_CELL_SIZE: u32 = 50;
pub const DEFAULT_CELL_BORDER: u32 = 2;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, u8::MAX]);
const WALL: Rgba<u8> = Rgba([40, 40, 40, u8::MAX]);
const START: Rgba<u8> = Rgba([255, 0, 0, u8::MAX]);
const GOAL: Rgba<u8> = Rgba([0, 171, 28, u8::MAX]);
const SOLUTION: Rgba<u8> = Rgba([220, 235, 113, u8::MAX]);
const EXPLORED: Rgba<u8> = Rgba([212, 97, 85, u8::MAX]);
const FREE: Rgba<u8> = Rgba([237, 240, 252, u8::MAX]);

#[derive(Debug, Error)]
pub enum ImageRenderError {
    #[error("Image for a {height}x{width} maze with {cell_size}px cells is too large")]
    TooLarge {
        height: usize,
        width: usize,
        cell_size: u32,
    },
    #[error("Image error when saving '{}': {e}", .p.display())]
    ImageError {
        p: std::path::PathBuf,
        e: image::ImageError,
    },
}

/// Bitmap view of a maze.
///
/// Each cell is a square of `cell_size` pixels, inset by `cell_border` pixels
/// of background. Solution and explored cells are only highlighted when a
/// solution is available.
#[derive(Debug)]
pub struct ImageRender<'a> {
    problem: &'a Maze2DProblem,
    solution: Option<&'a Path<Maze2DState, Maze2DAction>>,
    explored: Option<&'a FxHashSet<Maze2DState>>,
    show_solution: bool,
    show_explored: bool,
    cell_size: u32,
    cell_border: u32,
}

impl<'a> ImageRender<'a> {
    pub fn new(problem: &'a Maze2DProblem) -> Self {
        Self {
            problem,
            solution: None,
            explored: None,
            show_solution: true,
            show_explored: false,
            cell_size: DEFAULT_CELL_SIZE,
            cell_border: DEFAULT_CELL_BORDER,
        }
    }

    pub fn with_solution(mut self, solution: Option<&'a Path<Maze2DState, Maze2DAction>>) -> Self {
        self.solution = solution;
        self
    }
    pub fn with_explored(mut self, explored: &'a FxHashSet<Maze2DState>) -> Self {
        self.explored = Some(explored);
        self
    }
    pub fn show_solution(mut self, show: bool) -> Self {
        self.show_solution = show;
        self
    }
    pub fn show_explored(mut self, show: bool) -> Self {
        self.show_explored = show;
        self
    }

    /// Image dimensions as `(width, height)` in pixels.
    pub fn dimensions(&self) -> Result<(u32, u32), ImageRenderError> {
        let (height, width) = self.problem.space().dimensions();
        let too_large = || ImageRenderError::TooLarge {
            height,
            width,
            cell_size: self.cell_size,
        };
        let px = |cells: usize| {
            u32::try_from(cells)
                .ok()
                .and_then(|cells| cells.checked_mul(self.cell_size))
        };

        Ok((px(width).ok_or_else(too_large)?, px(height).ok_or_else(too_large)?))
    }

    fn colour(&self, s: &Maze2DState, solution: &FxHashSet<Maze2DState>) -> Rgba<u8> {
        let has_solution = self.solution.is_some();

        if self.problem.space().is_wall(s) {
            WALL
        } else if *s == self.problem.start() {
            START
        } else if *s == self.problem.goal() {
            GOAL
        } else if has_solution && self.show_solution && solution.contains(s) {
            SOLUTION
        } else if has_solution
            && self.show_explored
            && self.explored.is_some_and(|explored| explored.contains(s))
        {
            EXPLORED
        } else {
            FREE
        }
    }

    pub fn render(&self) -> Result<RgbaImage, ImageRenderError> {
        let (img_width, img_height) = self.dimensions()?;
        let mut img = RgbaImage::from_pixel(img_width, img_height, BACKGROUND);

        let solution: FxHashSet<Maze2DState> = self
            .solution
            .map(|p| p.cells().collect())
            .unwrap_or_default();
        let (height, width) = self.problem.space().dimensions();
        let size = self.cell_size;
        let border = self.cell_border;

        for row in 0..height {
            for col in 0..width {
                let s = Maze2DState::new_from_small_usize(row, col);
                let fill = self.colour(&s, &solution);

                // Fits in u32 as `dimensions()` succeeded.
                let (x0, y0) = (s.col * size, s.row * size);
                let x_range = (x0 + border)..=(x0 + size).saturating_sub(border);
                let y_range = (y0 + border)..=(y0 + size).saturating_sub(border);
                for y in y_range.clone() {
                    for x in x_range.clone() {
                        if x < img_width && y < img_height {
                            img.put_pixel(x, y, fill);
                        }
                    }
                }
            }
        }

        Ok(img)
    }

    pub fn save(&self, p: &std::path::Path) -> Result<(), ImageRenderError> {
        let img = self.render()?;
        img.save(p).map_err(|e| ImageRenderError::ImageError {
            p: p.to_path_buf(),
            e,
        })?;
        log::debug!("Saved {}x{} image to {}", img.width(), img.height(), p.display());
        Ok(())
    }
}
