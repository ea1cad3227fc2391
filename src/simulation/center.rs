use crate::config::Vec2;

use super::force::Force;
use super::node::Node;

/// Pulls the centroid of all nodes toward a target point
///
/// Every node receives the same nudge, `(target - centroid) * strength`, so
/// relative positions are untouched. The nudge does not fade with alpha.
#[derive(Debug, Clone)]
pub struct CenterForce {
    pub target: Vec2,
    pub strength: f64,
}

impl CenterForce {
    pub fn new(target: Vec2, strength: f64) -> Self {
        Self { target, strength }
    }
}

impl Force for CenterForce {
    fn apply(&mut self, nodes: &mut [Node], _alpha: f64) {
        if nodes.is_empty() {
            return;
        }

        let n = nodes.len() as f64;
        let (sx, sy) = nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));

        let dx = (self.target.x - sx / n) * self.strength;
        let dy = (self.target.y - sy / n) * self.strength;

        for node in nodes.iter_mut() {
            node.vx += dx;
            node.vy += dy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn node_at(x: f64, y: f64) -> Node {
        let mut node = Node::on_spiral(0, 0, 1.0, Vec2::default());
        node.x = x;
        node.y = y;
        node
    }

    #[test]
    fn nudges_all_nodes_equally_toward_target() {
        let mut nodes = vec![node_at(0.0, 0.0), node_at(10.0, 20.0)];
        let mut force = CenterForce::new(Vec2::new(15.0, 10.0), 0.5);

        force.apply(&mut nodes, 1.0);

        // centroid (5, 10) -> offset (10, 0) -> nudge (5, 0)
        for node in &nodes {
            assert_relative_eq!(node.vx, 5.0);
            assert_relative_eq!(node.vy, 0.0);
        }
    }

    #[test]
    fn ignores_alpha() {
        let mut hot = vec![node_at(4.0, 4.0)];
        let mut cold = hot.clone();
        let mut force = CenterForce::new(Vec2::default(), 0.1);

        force.apply(&mut hot, 1.0);
        force.apply(&mut cold, 0.01);

        assert_eq!(hot[0].vx, cold[0].vx);
        assert_eq!(hot[0].vy, cold[0].vy);
    }

    #[test]
    fn no_nodes_is_a_no_op() {
        let mut force = CenterForce::new(Vec2::default(), 1.0);
        force.apply(&mut [], 1.0);
    }
}
