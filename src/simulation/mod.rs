//! Force simulation engine
//!
//! Nodes carry position and velocity. Each tick applies the registered forces
//! to velocities, integrates velocity into position, and decays alpha until it
//! falls to `alpha_min`.

mod center;
mod engine;
mod force;
mod link;
mod many_body;
mod node;
mod quadtree;

pub use center::CenterForce;
pub use engine::{Simulation, SimulationState};
pub use force::{Force, ForceRegistry, Jiggle};
pub use link::LinkForce;
pub use many_body::ManyBodyForce;
pub use node::{Link, Node, setup};
pub use quadtree::{Cell, QuadTree};
