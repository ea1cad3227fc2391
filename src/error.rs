//! Setup and configuration errors
//!
//! Every error the engine can produce is raised synchronously before the first
//! tick. Per-tick arithmetic is closed-form and cannot fail.

use thiserror::Error;

/// Why an edge descriptor was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDefect {
    /// Source and target name the same node
    SelfLoop,
    /// Source or target index is not below the node count
    OutOfRange { node_count: usize },
}

impl std::fmt::Display for EdgeDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EdgeDefect::SelfLoop => write!(f, "source and target are the same node"),
            EdgeDefect::OutOfRange { node_count } => {
                write!(f, "index out of range for {node_count} nodes")
            }
        }
    }
}

/// Errors that can occur while setting up a simulation run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// An edge references a missing node or loops back onto its source
    #[error("invalid edge #{index} ({source_index} -> {target_index}): {reason}")]
    InvalidEdge {
        index: usize,
        source_index: usize,
        target_index: usize,
        reason: EdgeDefect,
    },

    /// A graph with at least one node was required
    #[error("graph has no nodes")]
    EmptyGraph,

    /// A configuration option is out of its valid range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for simulation setup
pub type SimulationResult<T> = Result<T, SimulationError>;
