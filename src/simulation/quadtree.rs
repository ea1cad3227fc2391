//! Point quadtree for Barnes-Hut approximation
//!
//! Each cell tracks how many points it holds and their center of mass. Leaves
//! hold point indices; coincident points stay together in one leaf once the
//! depth limit is reached.

use crate::config::Vec2;

const MAX_DEPTH: usize = 32;

#[derive(Debug, Clone)]
pub struct Cell {
    /// Lower-left corner
    pub min: Vec2,
    /// Side length (cells are square)
    pub size: f64,
    pub count: usize,
    sum_x: f64,
    sum_y: f64,
    pub children: Option<[usize; 4]>,
    pub points: Vec<usize>,
}

impl Cell {
    fn new(min: Vec2, size: f64) -> Self {
        Self {
            min,
            size,
            count: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            children: None,
            points: Vec::new(),
        }
    }

    /// Center of mass of the points in this cell
    pub fn center_of_mass(&self) -> Vec2 {
        let n = self.count.max(1) as f64;
        Vec2::new(self.sum_x / n, self.sum_y / n)
    }

    fn quadrant(&self, p: Vec2) -> usize {
        let half = self.size / 2.0;
        let right = p.x >= self.min.x + half;
        let top = p.y >= self.min.y + half;
        (right as usize) | ((top as usize) << 1)
    }
}

#[derive(Debug, Clone)]
pub struct QuadTree {
    cells: Vec<Cell>,
}

impl QuadTree {
    /// Build a tree over `points`; index 0 is the root
    pub fn build(points: &[Vec2]) -> Self {
        let (mut lo, mut hi) = (
            Vec2::new(f64::INFINITY, f64::INFINITY),
            Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        );
        for p in points {
            lo.x = lo.x.min(p.x);
            lo.y = lo.y.min(p.y);
            hi.x = hi.x.max(p.x);
            hi.y = hi.y.max(p.y);
        }
        if points.is_empty() {
            lo = Vec2::default();
            hi = Vec2::default();
        }
        // Pad so points on the upper edge fall strictly inside the root
        let size = (hi.x - lo.x).max(hi.y - lo.y).max(1e-9) * (1.0 + 1e-9) + 1e-9;

        let mut tree = Self {
            cells: vec![Cell::new(lo, size)],
        };
        for i in 0..points.len() {
            tree.insert(0, i, points, 0);
        }
        tree
    }

    pub fn root(&self) -> &Cell {
        &self.cells[0]
    }

    pub fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    fn insert(&mut self, cell: usize, point: usize, points: &[Vec2], depth: usize) {
        let p = points[point];
        {
            let c = &mut self.cells[cell];
            c.count += 1;
            c.sum_x += p.x;
            c.sum_y += p.y;
        }

        if let Some(children) = self.cells[cell].children {
            let q = self.cells[cell].quadrant(p);
            self.insert(children[q], point, points, depth + 1);
            return;
        }

        self.cells[cell].points.push(point);
        if self.cells[cell].points.len() > 1 && depth < MAX_DEPTH {
            self.split(cell, points, depth);
        }
    }

    fn split(&mut self, cell: usize, points: &[Vec2], depth: usize) {
        let (min, half) = {
            let c = &self.cells[cell];
            (c.min, c.size / 2.0)
        };
        let first = self.cells.len();
        for q in 0..4 {
            let offset = Vec2::new(
                if q & 1 == 1 { half } else { 0.0 },
                if q & 2 == 2 { half } else { 0.0 },
            );
            self.cells
                .push(Cell::new(Vec2::new(min.x + offset.x, min.y + offset.y), half));
        }
        let children = [first, first + 1, first + 2, first + 3];
        self.cells[cell].children = Some(children);

        for point in std::mem::take(&mut self.cells[cell].points) {
            let q = self.cells[cell].quadrant(points[point]);
            self.insert(children[q], point, points, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_aggregates_all_points() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 10.0),
        ];
        let tree = QuadTree::build(&points);

        assert_eq!(tree.root().count, 4);
        let com = tree.root().center_of_mass();
        approx::assert_relative_eq!(com.x, 5.0);
        approx::assert_relative_eq!(com.y, 5.0);
    }

    #[test]
    fn leaves_hold_each_point_once() {
        let points: Vec<Vec2> = (0..40)
            .map(|i| Vec2::new((i * 7 % 13) as f64, (i * 5 % 11) as f64 * 1.5))
            .collect();
        let tree = QuadTree::build(&points);

        let mut seen = vec![0; points.len()];
        let mut stack = vec![0];
        while let Some(index) = stack.pop() {
            let cell = tree.cell(index);
            match cell.children {
                Some(children) => {
                    let sum: usize = children.iter().map(|&c| tree.cell(c).count).sum();
                    assert_eq!(sum, cell.count);
                    stack.extend(children);
                }
                None => cell.points.iter().for_each(|&p| seen[p] += 1),
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn coincident_points_share_a_leaf() {
        let points = [Vec2::new(3.0, 3.0), Vec2::new(3.0, 3.0)];
        let tree = QuadTree::build(&points);
        assert_eq!(tree.root().count, 2);
    }

    #[test]
    fn empty_tree_has_empty_root() {
        let tree = QuadTree::build(&[]);
        assert_eq!(tree.root().count, 0);
        assert!(tree.root().children.is_none());
    }
}
