use crate::config::{ManyBodyMode, Vec2};

use super::force::{Force, Jiggle};
use super::node::Node;
use super::quadtree::QuadTree;

/// Pairwise repulsion between all nodes
///
/// Each pair pushes apart with magnitude `strength * alpha / d²`, where `d` is
/// clamped to at least `distance_min`. Pairs at or beyond `distance_max` are
/// skipped. Coincident nodes are separated along a jiggled direction.
#[derive(Debug, Clone)]
pub struct ManyBodyForce {
    pub strength: f64,
    pub distance_min: f64,
    pub distance_max: Option<f64>,
    pub mode: ManyBodyMode,
    jiggle: Jiggle,
}

impl ManyBodyForce {
    pub fn new(strength: f64, seed: u64) -> Self {
        Self {
            strength,
            distance_min: 1.0,
            distance_max: None,
            mode: ManyBodyMode::Exact,
            jiggle: Jiggle::new(seed),
        }
    }

    pub fn with_distance_range(mut self, min: f64, max: Option<f64>) -> Self {
        self.distance_min = min;
        self.distance_max = max;
        self
    }

    pub fn with_mode(mut self, mode: ManyBodyMode) -> Self {
        self.mode = mode;
        self
    }

    /// Velocity change on a body at distance vector `(dx, dy)` from a source of `weight` bodies
    ///
    /// `(dx, dy)` points from the affected node to the source; the result points away.
    fn push(&self, dx: f64, dy: f64, weight: f64, alpha: f64) -> Option<(f64, f64)> {
        let dist_sq = dx * dx + dy * dy;
        if let Some(max) = self.distance_max {
            if dist_sq >= max * max {
                return None;
            }
        }
        let dist = dist_sq.sqrt();
        let clamped = dist.max(self.distance_min);
        let magnitude = self.strength * weight * alpha / (clamped * clamped);
        Some((-magnitude * dx / dist, -magnitude * dy / dist))
    }

    fn offset(&mut self, from: &Node, to: &Node) -> (f64, f64) {
        let (mut dx, mut dy) = (to.x - from.x, to.y - from.y);
        if dx == 0.0 && dy == 0.0 {
            dx = self.jiggle.sample();
            dy = self.jiggle.sample();
        }
        (dx, dy)
    }

    fn apply_exact(&mut self, nodes: &mut [Node], alpha: f64) {
        let n = nodes.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let (dx, dy) = self.offset(&nodes[i], &nodes[j]);
                let Some((fx, fy)) = self.push(dx, dy, 1.0, alpha) else {
                    continue;
                };

                nodes[i].vx += fx;
                nodes[i].vy += fy;
                nodes[j].vx -= fx;
                nodes[j].vy -= fy;
            }
        }
    }

    fn apply_barnes_hut(&mut self, nodes: &mut [Node], alpha: f64, theta: f64) {
        let points: Vec<Vec2> = nodes.iter().map(|n| Vec2::new(n.x, n.y)).collect();
        let tree = QuadTree::build(&points);
        let theta_sq = theta * theta;

        for i in 0..nodes.len() {
            let (mut dvx, mut dvy) = (0.0, 0.0);
            let mut stack = vec![0];

            while let Some(index) = stack.pop() {
                let cell = tree.cell(index);
                if cell.count == 0 {
                    continue;
                }

                match cell.children {
                    None => {
                        for &j in cell.points.iter().filter(|&&j| j != i) {
                            let (dx, dy) = self.offset(&nodes[i], &nodes[j]);
                            if let Some((fx, fy)) = self.push(dx, dy, 1.0, alpha) {
                                dvx += fx;
                                dvy += fy;
                            }
                        }
                    }
                    Some(children) => {
                        let com = cell.center_of_mass();
                        let (dx, dy) = (com.x - nodes[i].x, com.y - nodes[i].y);
                        let dist_sq = dx * dx + dy * dy;

                        if dist_sq > 0.0 && cell.size * cell.size < theta_sq * dist_sq {
                            if let Some((fx, fy)) = self.push(dx, dy, cell.count as f64, alpha) {
                                dvx += fx;
                                dvy += fy;
                            }
                        } else {
                            stack.extend(children);
                        }
                    }
                }
            }

            nodes[i].vx += dvx;
            nodes[i].vy += dvy;
        }
    }
}

impl Force for ManyBodyForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        match self.mode {
            ManyBodyMode::Exact => self.apply_exact(nodes, alpha),
            ManyBodyMode::BarnesHut { theta } => self.apply_barnes_hut(nodes, alpha, theta),
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

    fn spiral(n: usize) -> Vec<Node> {
        (0..n)
            .map(|i| Node::on_spiral(i, i, 1.0, Vec2::default()))
            .collect()
    }

    #[test]
    fn pair_repels_with_inverse_square() {
        let mut nodes = vec![node_at(0.0, 0.0), node_at(10.0, 0.0)];
        let mut force = ManyBodyForce::new(30.0, 0);

        force.apply(&mut nodes, 0.5);

        // 30 * 0.5 / 100
        assert_relative_eq!(nodes[0].vx, -0.15);
        assert_relative_eq!(nodes[1].vx, 0.15);
        assert_eq!(nodes[0].vy, 0.0);
    }

    #[test]
    fn short_distances_are_clamped() {
        let mut nodes = vec![node_at(0.0, 0.0), node_at(0.5, 0.0)];
        let mut force = ManyBodyForce::new(1.0, 0).with_distance_range(2.0, None);

        force.apply(&mut nodes, 1.0);

        assert_relative_eq!(nodes[1].vx, 0.25);
    }

    #[test]
    fn distance_max_skips_far_pairs() {
        let mut nodes = vec![node_at(0.0, 0.0), node_at(100.0, 0.0)];
        let mut force = ManyBodyForce::new(30.0, 0).with_distance_range(1.0, Some(50.0));

        force.apply(&mut nodes, 1.0);

        assert_eq!(nodes[0].vx, 0.0);
        assert_eq!(nodes[1].vx, 0.0);
    }

    #[test]
    fn single_node_is_unaffected() {
        let mut nodes = vec![node_at(3.0, 4.0)];
        let mut force = ManyBodyForce::new(30.0, 0);
        force.apply(&mut nodes, 1.0);
        assert_eq!((nodes[0].vx, nodes[0].vy), (0.0, 0.0));
    }

    #[test]
    fn coincident_nodes_are_pushed_apart() {
        let mut nodes = vec![node_at(1.0, 1.0), node_at(1.0, 1.0)];
        let mut force = ManyBodyForce::new(30.0, 9);

        force.apply(&mut nodes, 1.0);

        assert!(nodes[0].vx.is_finite() && nodes[0].vy.is_finite());
        assert!(nodes[0].vx != 0.0 || nodes[0].vy != 0.0);
        assert_relative_eq!(nodes[0].vx, -nodes[1].vx);
        assert_relative_eq!(nodes[0].vy, -nodes[1].vy);
    }

    #[test]
    fn total_momentum_is_conserved() {
        let mut nodes = spiral(12);
        let mut force = ManyBodyForce::new(30.0, 0);
        force.apply(&mut nodes, 1.0);

        let (px, py) = nodes
            .iter()
            .fold((0.0, 0.0), |(px, py), n| (px + n.vx, py + n.vy));
        assert!(px.abs() < 1e-12 && py.abs() < 1e-12);
    }

    #[test]
    fn barnes_hut_with_tiny_theta_matches_exact() {
        let mut exact = spiral(40);
        let mut approx_nodes = exact.clone();

        ManyBodyForce::new(30.0, 0).apply(&mut exact, 1.0);
        ManyBodyForce::new(30.0, 0)
            .with_mode(ManyBodyMode::BarnesHut { theta: 1e-9 })
            .apply(&mut approx_nodes, 1.0);

        for (a, b) in exact.iter().zip(&approx_nodes) {
            assert_relative_eq!(a.vx, b.vx, epsilon = 1e-9);
            assert_relative_eq!(a.vy, b.vy, epsilon = 1e-9);
        }
    }

    #[test]
    fn barnes_hut_approximates_exact() {
        let mut exact = spiral(80);
        let mut approx_nodes = exact.clone();

        ManyBodyForce::new(30.0, 0).apply(&mut exact, 1.0);
        ManyBodyForce::new(30.0, 0)
            .with_mode(ManyBodyMode::BarnesHut { theta: 0.5 })
            .apply(&mut approx_nodes, 1.0);

        let largest = exact
            .iter()
            .map(|n| n.vx.hypot(n.vy))
            .fold(0.0_f64, f64::max);
        for (a, b) in exact.iter().zip(&approx_nodes) {
            assert!((a.vx - b.vx).hypot(a.vy - b.vy) < 0.1 * largest);
        }
    }
}
