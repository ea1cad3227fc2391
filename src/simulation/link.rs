use super::force::{Force, Jiggle};
use super::node::{Link, Node};

/// Spring attraction along links
///
/// Each link pulls its endpoints toward a rest length. Per-link strength
/// defaults to `1 / min(degree(source), degree(target))` so hubs are not
/// dragged around by their many neighbours, and the correction is split
/// between the endpoints in proportion to their degrees.
#[derive(Debug, Clone)]
pub struct LinkForce {
    links: Vec<Link>,
    strengths: Vec<f64>,
    distances: Vec<f64>,
    /// Share of each correction taken by the target
    biases: Vec<f64>,
    jiggle: Jiggle,
}

impl LinkForce {
    /// Build the force for `links` over `node_count` nodes
    ///
    /// With `weight_scaling`, a link's rest length is `base_length / sqrt(weight)`.
    pub fn new(
        links: &[Link],
        node_count: usize,
        base_length: f64,
        weight_scaling: bool,
        seed: u64,
    ) -> Self {
        let mut degree = vec![0usize; node_count];
        for link in links {
            degree[link.source] += 1;
            degree[link.target] += 1;
        }

        let strengths = links
            .iter()
            .map(|l| 1.0 / degree[l.source].min(degree[l.target]) as f64)
            .collect();
        let biases = links
            .iter()
            .map(|l| {
                let (s, t) = (degree[l.source] as f64, degree[l.target] as f64);
                s / (s + t)
            })
            .collect();
        let distances = links
            .iter()
            .map(|l| {
                if weight_scaling && l.weight > 0.0 {
                    base_length / l.weight.sqrt()
                } else {
                    base_length
                }
            })
            .collect();

        Self {
            links: links.to_vec(),
            strengths,
            distances,
            biases,
            jiggle: Jiggle::new(seed),
        }
    }

    pub fn strength(&self, link: usize) -> f64 {
        self.strengths[link]
    }

    pub fn distance(&self, link: usize) -> f64 {
        self.distances[link]
    }
}

impl Force for LinkForce {
    fn apply(&mut self, nodes: &mut [Node], alpha: f64) {
        for (i, link) in self.links.iter().enumerate() {
            let (source, target) = (&nodes[link.source], &nodes[link.target]);

            // Predicted positions after this tick's velocity so far
            let mut x = target.x + target.vx - source.x - source.vx;
            let mut y = target.y + target.vy - source.y - source.vy;
            if x == 0.0 {
                x = self.jiggle.sample();
            }
            if y == 0.0 {
                y = self.jiggle.sample();
            }

            let len = (x * x + y * y).sqrt();
            let scale = (len - self.distances[i]) / len * alpha * self.strengths[i];
            x *= scale;
            y *= scale;

            let bias = self.biases[i];
            nodes[link.target].vx -= x * bias;
            nodes[link.target].vy -= y * bias;
            nodes[link.source].vx += x * (1.0 - bias);
            nodes[link.source].vy += y * (1.0 - bias);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Vec2;
    use approx::assert_relative_eq;

    fn node_at(x: f64, y: f64) -> Node {
        let mut node = Node::on_spiral(0, 0, 1.0, Vec2::default());
        node.x = x;
        node.y = y;
        node
    }

    fn link(source: usize, target: usize) -> Link {
        Link {
            source,
            target,
            weight: 1.0,
        }
    }

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let mut nodes = vec![node_at(0.0, 0.0), node_at(100.0, 0.0)];
        let mut force = LinkForce::new(&[link(0, 1)], 2, 30.0, false, 0);

        force.apply(&mut nodes, 1.0);

        // (100 - 30) / 100 * 100 = 70, split evenly
        assert_relative_eq!(nodes[0].vx, 35.0, epsilon = 1e-9);
        assert_relative_eq!(nodes[1].vx, -35.0, epsilon = 1e-9);
    }

    #[test]
    fn compressed_link_pushes_endpoints_apart() {
        let mut nodes = vec![node_at(0.0, 0.0), node_at(10.0, 0.0)];
        let mut force = LinkForce::new(&[link(0, 1)], 2, 30.0, false, 0);

        force.apply(&mut nodes, 0.5);

        assert!(nodes[0].vx < 0.0);
        assert!(nodes[1].vx > 0.0);
    }

    #[test]
    fn strength_normalised_by_smaller_degree() {
        // Star: hub 0 with three leaves
        let links = [link(0, 1), link(0, 2), link(0, 3)];
        let force = LinkForce::new(&links, 4, 30.0, false, 0);

        for i in 0..3 {
            assert_relative_eq!(force.strength(i), 1.0);
        }

        let links = [link(0, 1), link(0, 2), link(1, 2)];
        let force = LinkForce::new(&links, 3, 30.0, false, 0);
        assert_relative_eq!(force.strength(0), 0.5);
    }

    #[test]
    fn hub_moves_less_than_leaf() {
        let mut nodes = vec![
            node_at(0.0, 0.0),
            node_at(100.0, 0.0),
            node_at(-100.0, 0.0),
            node_at(0.0, 100.0),
        ];
        let links = [link(0, 1), link(0, 2), link(0, 3)];
        let mut force = LinkForce::new(&links, 4, 30.0, false, 0);

        force.apply(&mut nodes[..], 1.0);

        // Leaf 1 takes 3/4 of its link's correction
        assert_relative_eq!(nodes[1].vx, -70.0 * 0.75, epsilon = 1e-9);
    }

    #[test]
    fn weight_scaling_shortens_heavy_links() {
        let links = [Link {
            source: 0,
            target: 1,
            weight: 4.0,
        }];
        assert_relative_eq!(LinkForce::new(&links, 2, 30.0, true, 0).distance(0), 15.0);
        assert_relative_eq!(LinkForce::new(&links, 2, 30.0, false, 0).distance(0), 30.0);
    }

    #[test]
    fn no_links_no_change() {
        let mut nodes = vec![node_at(0.0, 0.0), node_at(5.0, 5.0)];
        let mut force = LinkForce::new(&[], 2, 30.0, false, 0);

        force.apply(&mut nodes, 1.0);

        for node in &nodes {
            assert_eq!((node.vx, node.vy), (0.0, 0.0));
        }
    }
}
