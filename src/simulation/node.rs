//! Live node and link state
//!
//! Links hold indices into the node array. The indices are checked once at setup,
//! so force code may index `nodes[link.source]` without further validation.

use crate::config::Vec2;
use crate::error::{EdgeDefect, SimulationError, SimulationResult};
use crate::graph::GraphInput;

const INITIAL_RADIUS: f64 = 10.0;

/// A node with position and velocity for simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node ID (from NodeSpec)
    pub id: usize,
    /// Position in 2D space
    pub x: f64,
    pub y: f64,
    /// Velocity
    pub vx: f64,
    pub vy: f64,
    /// Pinned coordinates; a pinned axis is exempt from integration
    pub fx: Option<f64>,
    pub fy: Option<f64>,
    /// Size attribute for rendering
    pub size: f64,
}

impl Node {
    /// Place the `index`-th node on a phyllotaxis spiral around `center`
    pub fn on_spiral(id: usize, index: usize, size: f64, center: Vec2) -> Self {
        let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        let radius = INITIAL_RADIUS * (0.5 + index as f64).sqrt();
        let angle = index as f64 * golden_angle;

        Self {
            id,
            x: center.x + radius * angle.cos(),
            y: center.y + radius * angle.sin(),
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            size,
        }
    }

    /// Pin the node at `(x, y)`, moving it there immediately
    pub fn fix(&mut self, x: f64, y: f64) {
        self.fx = Some(x);
        self.fy = Some(y);
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Release both pinned axes
    pub fn unfix(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    pub fn is_fixed(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// A link between two distinct nodes (indices into the node array)
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

/// Build live nodes and links from raw descriptors
///
/// Nodes start on a spiral around `center`; pinned coordinates override the
/// spiral position. Fails on the first self-loop or out-of-range edge.
pub fn setup(graph: &GraphInput, center: Vec2) -> SimulationResult<(Vec<Node>, Vec<Link>)> {
    let node_count = graph.nodes.len();

    let links = graph
        .edges
        .iter()
        .enumerate()
        .map(|(index, edge)| {
            let reason = if edge.source >= node_count || edge.target >= node_count {
                Some(EdgeDefect::OutOfRange { node_count })
            } else if edge.source == edge.target {
                Some(EdgeDefect::SelfLoop)
            } else {
                None
            };
            match reason {
                Some(reason) => Err(SimulationError::InvalidEdge {
                    index,
                    source_index: edge.source,
                    target_index: edge.target,
                    reason,
                }),
                None => Ok(Link {
                    source: edge.source,
                    target: edge.target,
                    weight: edge.weight,
                }),
            }
        })
        .collect::<SimulationResult<Vec<_>>>()?;

    let nodes = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let mut node = Node::on_spiral(spec.id, i, spec.size, center);
            if let Some(fx) = spec.fx {
                node.fx = Some(fx);
                node.x = fx;
            }
            if let Some(fy) = spec.fy {
                node.fy = Some(fy);
                node.y = fy;
            }
            node
        })
        .collect();

    Ok((nodes, links))
}
