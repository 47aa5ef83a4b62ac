//! Renderers for Maze2D problems and their solutions.
//!
//! Renderers only read from the problem and the search results.

pub mod bitmap;
pub mod text;
