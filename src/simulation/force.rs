//! Force contributors and the registry that applies them
//!
//! A force reads the current positions and velocities and adds to node
//! velocities in place. Positions are only changed by the integrator.

use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::node::Node;

/// A named, stateful contribution to node velocities
pub trait Force: Send + std::fmt::Debug {
    /// Add this force's velocity increment to every affected node
    fn apply(&mut self, nodes: &mut [Node], alpha: f64);
}

/// Tiny deterministic displacement used to separate coincident nodes
#[derive(Debug, Clone)]
pub struct Jiggle(Xoshiro256PlusPlus);

impl Jiggle {
    pub fn new(seed: u64) -> Self {
        Self(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    /// A value in [-5e-7, 5e-7), never exactly zero
    pub fn sample(&mut self) -> f64 {
        let value = (self.0.r#gen::<f64>() - 0.5) * 1e-6;
        if value == 0.0 { 1e-7 } else { value }
    }
}

/// Forces applied in registration order
#[derive(Debug, Default)]
pub struct ForceRegistry {
    forces: Vec<(String, Box<dyn Force>)>,
}

impl ForceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a force under `name`
    ///
    /// Re-registering a name replaces that force but keeps its original slot
    /// in the application order.
    pub fn register(&mut self, name: impl Into<String>, force: Box<dyn Force>) {
        let name = name.into();
        match self.forces.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = force,
            None => self.forces.push((name, force)),
        }
    }

    /// Remove and return the force registered under `name`
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Force>> {
        let pos = self.forces.iter().position(|(n, _)| n == name)?;
        Some(self.forces.remove(pos).1)
    }

    pub fn get(&self, name: &str) -> Option<&dyn Force> {
        self.forces
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f.as_ref())
    }

    /// Registered names in application order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.forces.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.forces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forces.is_empty()
    }

    /// Apply every force once
    pub fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        for (_, force) in &mut self.forces {
            force.apply(nodes, alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Vec2;

    // Adds a constant to vx and records the vx it saw first
    #[derive(Debug)]
    struct Push {
        dv: f64,
        seen: std::sync::Arc<std::sync::Mutex<Vec<f64>>>,
    }

    impl Force for Push {
        fn apply(&mut self, nodes: &mut [Node], _alpha: f64) {
            self.seen.lock().unwrap().push(nodes[0].vx);
            nodes[0].vx += self.dv;
        }
    }

    fn one_node() -> Vec<Node> {
        vec![Node::on_spiral(0, 0, 1.0, Vec2::default())]
    }

    #[test]
    fn applies_in_registration_order() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = ForceRegistry::new();
        registry.register("a", Box::new(Push { dv: 1.0, seen: seen.clone() }));
        registry.register("b", Box::new(Push { dv: 10.0, seen: seen.clone() }));

        let mut nodes = one_node();
        registry.apply(&mut nodes, 1.0);

        assert_eq!(*seen.lock().unwrap(), vec![0.0, 1.0]);
        assert_eq!(nodes[0].vx, 11.0);
    }

    #[test]
    fn reregistering_keeps_slot() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = ForceRegistry::new();
        registry.register("a", Box::new(Push { dv: 1.0, seen: seen.clone() }));
        registry.register("b", Box::new(Push { dv: 1.0, seen: seen.clone() }));
        registry.register("a", Box::new(Push { dv: 5.0, seen: seen.clone() }));

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        let mut nodes = one_node();
        registry.apply(&mut nodes, 1.0);
        assert_eq!(*seen.lock().unwrap(), vec![0.0, 5.0]);
    }

    #[test]
    fn remove_drops_force() {
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut registry = ForceRegistry::new();
        registry.register("a", Box::new(Push { dv: 1.0, seen }));

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn jiggle_is_small_nonzero_and_seeded() {
        let mut a = Jiggle::new(42);
        let mut b = Jiggle::new(42);
        for _ in 0..100 {
            let v = a.sample();
            assert_ne!(v, 0.0);
            assert!(v.abs() <= 5e-7);
            assert_eq!(v, b.sample());
        }
    }
}
