//! Engine input: raw node and edge descriptors
//!
//! Graphs arrive either from a JSON file or from the seeded [`RandomGraph`]
//! generator. Descriptors are plain indices; they are checked and resolved when
//! a simulation is set up.

use std::path::Path;

use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SimulationError, SimulationResult};
use crate::io::{IoError, IoResult};

/// A raw node descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    /// Stable node identity
    pub id: usize,
    /// Scalar used for sizing when rendered
    #[serde(rename = "sizeAttribute", alias = "size")]
    pub size: f64,
    /// Pin the x coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<f64>,
    /// Pin the y coordinate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f64>,
}

impl NodeSpec {
    pub fn new(id: usize, size: f64) -> Self {
        Self {
            id,
            size,
            fx: None,
            fy: None,
        }
    }

    /// Pin this node at `(x, y)`
    pub fn fixed_at(mut self, x: f64, y: f64) -> Self {
        self.fx = Some(x);
        self.fy = Some(y);
        self
    }
}

/// A raw edge descriptor (indices into the node list)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSpec {
    #[serde(rename = "sourceIndex", alias = "source")]
    pub source: usize,
    #[serde(rename = "targetIndex", alias = "target")]
    pub target: usize,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl EdgeSpec {
    pub fn new(source: usize, target: usize, weight: f64) -> Self {
        Self {
            source,
            target,
            weight,
        }
    }
}

/// Complete engine input
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphInput {
    pub nodes: Vec<NodeSpec>,
    #[serde(default, alias = "links")]
    pub edges: Vec<EdgeSpec>,
}

impl GraphInput {
    /// Read a graph from a JSON file
    pub fn load(path: &Path) -> IoResult<Self> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| IoError::Parse(e.to_string()))
    }

    /// Write the graph as pretty-printed JSON
    pub fn save(&self, path: &Path) -> IoResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| IoError::Write(e.to_string()))?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Parameters for generating a random graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RandomGraph {
    pub node_count: usize,
    pub min_node_size: f64,
    pub max_node_size: f64,
    /// Chance that any ordered pair of distinct nodes is linked
    pub link_probability: f64,
    pub seed: u64,
}

impl Default for RandomGraph {
    fn default() -> Self {
        Self {
            node_count: 20,
            min_node_size: 1.0,
            max_node_size: 20.0,
            link_probability: 0.05,
            seed: 0,
        }
    }
}

/// Uniform value in `[min, max)`; returns `min` for an empty range
fn between(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    min + (max - min) * rng.r#gen::<f64>()
}

impl RandomGraph {
    pub fn validate(&self) -> SimulationResult<()> {
        if self.node_count == 0 {
            return Err(SimulationError::EmptyGraph);
        }
        if !(self.min_node_size >= 1.0 && self.min_node_size <= self.max_node_size) {
            return Err(SimulationError::InvalidConfig(format!(
                "node sizes must satisfy 1 <= min <= max (got {}..{})",
                self.min_node_size, self.max_node_size
            )));
        }
        if !(0.0..=1.0).contains(&self.link_probability) {
            return Err(SimulationError::InvalidConfig(format!(
                "linkProbability must be in [0, 1] (got {})",
                self.link_probability
            )));
        }
        Ok(())
    }

    /// Generate nodes with floored random sizes and randomly linked ordered pairs
    pub fn generate(&self) -> SimulationResult<GraphInput> {
        self.validate()?;
        let started = std::time::Instant::now();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);

        let nodes: Vec<NodeSpec> = (0..self.node_count)
            .map(|i| {
                let size = between(&mut rng, self.min_node_size, self.max_node_size).floor();
                NodeSpec::new(i, size)
            })
            .collect();

        let mut edges = Vec::new();
        for i in 0..self.node_count {
            for j in 0..self.node_count {
                if i == j {
                    continue;
                }
                if rng.r#gen::<f64>() < self.link_probability {
                    let cap = nodes[i].size.min(nodes[j].size);
                    let weight = between(&mut rng, 1.0, cap).floor();
                    edges.push(EdgeSpec::new(i, j, weight));
                }
            }
        }

        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "generated random graph"
        );
        Ok(GraphInput { nodes, edges })
    }
}
