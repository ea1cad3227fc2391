//! The tick loop: forces, integration, alpha decay
//!
//! A simulation is RUNNING while `alpha > alpha_min` and CONVERGED afterwards.
//! Converged is terminal: further ticks change nothing.

use tracing::{debug, trace};

use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::graph::GraphInput;

use super::center::CenterForce;
use super::force::{Force, ForceRegistry};
use super::link::LinkForce;
use super::many_body::ManyBodyForce;
use super::node::{Link, Node, setup};

/// Whether a simulation still has work to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Running,
    Converged,
}

/// A force simulation over one graph
#[derive(Debug)]
pub struct Simulation {
    nodes: Vec<Node>,
    links: Vec<Link>,
    forces: ForceRegistry,
    alpha: f64,
    alpha_min: f64,
    alpha_target: f64,
    alpha_decay: f64,
    velocity_decay: f64,
    ticks: usize,
}

impl Simulation {
    /// Validate `config`, set up the graph and register the default forces
    ///
    /// Forces are registered as "center", "charge", "link", in that order.
    pub fn new(graph: &GraphInput, config: &SimulationConfig) -> SimulationResult<Self> {
        let mut simulation = Self::without_forces(graph, config)?;

        let center = CenterForce::new(config.center_target, config.center_strength);
        let charge = ManyBodyForce::new(config.repulsion_strength, config.seed)
            .with_distance_range(config.distance_min, config.distance_max)
            .with_mode(config.many_body);
        let link = LinkForce::new(
            &simulation.links,
            simulation.nodes.len(),
            config.link_base_length,
            config.link_weight_scaling,
            config.seed.wrapping_add(1),
        );

        simulation.register_force("center", Box::new(center));
        simulation.register_force("charge", Box::new(charge));
        simulation.register_force("link", Box::new(link));
        Ok(simulation)
    }

    /// Validate `config` and set up the graph with an empty force registry
    pub fn without_forces(graph: &GraphInput, config: &SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;
        let (nodes, links) = setup(graph, config.center_target)?;

        Ok(Self {
            nodes,
            links,
            forces: ForceRegistry::new(),
            alpha: 1.0,
            alpha_min: config.alpha_min,
            alpha_target: config.alpha_target,
            alpha_decay: config.alpha_decay,
            velocity_decay: config.velocity_decay,
            ticks: 0,
        })
    }

    /// Register (or replace) a named force; see [`ForceRegistry::register`]
    pub fn register_force(&mut self, name: &str, force: Box<dyn Force>) {
        debug!(force = name, ?force, "registered force");
        self.forces.register(name, force);
    }

    pub fn remove_force(&mut self, name: &str) -> Option<Box<dyn Force>> {
        self.forces.remove(name)
    }

    pub fn forces(&self) -> &ForceRegistry {
        &self.forces
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Mutable node access, e.g. for pinning nodes between ticks
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_min(&self) -> f64 {
        self.alpha_min
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn state(&self) -> SimulationState {
        if self.nodes.is_empty() || self.alpha <= self.alpha_min {
            SimulationState::Converged
        } else {
            SimulationState::Running
        }
    }

    pub fn is_converged(&self) -> bool {
        self.state() == SimulationState::Converged
    }

    /// Run one simulation tick
    pub fn tick(&mut self) -> SimulationState {
        if self.is_converged() {
            return SimulationState::Converged;
        }

        self.forces.apply(&mut self.nodes, self.alpha);

        let retain = 1.0 - self.velocity_decay;
        for node in &mut self.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= retain;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= retain;
                    node.y += node.vy;
                }
            }
        }

        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.ticks += 1;
        trace!(tick = self.ticks, alpha = self.alpha, "tick");

        self.state()
    }
}
