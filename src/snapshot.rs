//! Engine output handed to renderers
//!
//! A snapshot is an owned copy of the layout, so a renderer never observes
//! node state while a tick is mutating it.

use serde::{Deserialize, Serialize};

use crate::simulation::Simulation;

/// Rendered position of one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: usize,
    pub x: f64,
    pub y: f64,
    #[serde(rename = "sizeAttribute")]
    pub size: f64,
}

/// Rendered endpoints of one edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgePosition {
    pub source_x: f64,
    pub source_y: f64,
    pub target_x: f64,
    pub target_y: f64,
    pub weight: f64,
}

/// Node and edge positions after a given tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSnapshot {
    pub tick: usize,
    pub alpha: f64,
    pub converged: bool,
    pub nodes: Vec<NodePosition>,
    pub edges: Vec<EdgePosition>,
}

impl LayoutSnapshot {
    pub fn capture(simulation: &Simulation) -> Self {
        let nodes = simulation.nodes();

        Self {
            tick: simulation.ticks(),
            alpha: simulation.alpha(),
            converged: simulation.is_converged(),
            nodes: nodes
                .iter()
                .map(|n| NodePosition {
                    id: n.id,
                    x: n.x,
                    y: n.y,
                    size: n.size,
                })
                .collect(),
            edges: simulation
                .links()
                .iter()
                .map(|l| {
                    let (s, t) = (&nodes[l.source], &nodes[l.target]);
                    EdgePosition {
                        source_x: s.x,
                        source_y: s.y,
                        target_x: t.x,
                        target_y: t.y,
                        weight: l.weight,
                    }
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::graph::{EdgeSpec, GraphInput, NodeSpec};

    #[test]
    fn edges_follow_their_nodes() {
        let input = GraphInput {
            nodes: vec![
                NodeSpec::new(10, 2.0).fixed_at(1.0, 2.0),
                NodeSpec::new(11, 3.0).fixed_at(7.0, 8.0),
            ],
            edges: vec![EdgeSpec::new(1, 0, 5.0)],
        };
        let sim = Simulation::new(&input, &SimulationConfig::default()).unwrap();
        let layout = LayoutSnapshot::capture(&sim);

        assert_eq!(layout.tick, 0);
        assert!(!layout.converged);
        assert_eq!(layout.nodes[1].id, 11);
        assert_eq!(
            layout.edges[0],
            EdgePosition {
                source_x: 7.0,
                source_y: 8.0,
                target_x: 1.0,
                target_y: 2.0,
                weight: 5.0,
            }
        );
    }

    #[test]
    fn serializes_with_interface_field_names() {
        let layout = LayoutSnapshot {
            tick: 3,
            alpha: 0.5,
            converged: false,
            nodes: vec![NodePosition {
                id: 0,
                x: 1.5,
                y: -2.0,
                size: 4.0,
            }],
            edges: vec![EdgePosition {
                source_x: 1.5,
                source_y: -2.0,
                target_x: 0.0,
                target_y: 0.25,
                weight: 2.0,
            }],
        };
        insta::assert_snapshot!(serde_json::to_string(&layout).unwrap(), @r#"{"tick":3,"alpha":0.5,"converged":false,"nodes":[{"id":0,"x":1.5,"y":-2.0,"sizeAttribute":4.0}],"edges":[{"sourceX":1.5,"sourceY":-2.0,"targetX":0.0,"targetY":0.25,"weight":2.0}]}"#);
    }
}
