//! Data structures supporting the search algorithms.

pub mod frontier;
