//! forcelayout - Force-directed graph layout with animated and batch execution.
//!
//! A graph of sized nodes and weighted edges is relaxed under centering,
//! many-body repulsion and link springs until the simulation cools down. The
//! resulting layout can be streamed frame by frame or rendered once.

pub mod config;
pub mod driver;
pub mod error;
pub mod graph;
pub mod io;
pub mod json_writer;
pub mod simulation;
pub mod snapshot;
pub mod svg_writer;
