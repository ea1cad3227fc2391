//! SVG layout renderer
//!
//! Links are grey lines whose width is `sqrt(weight)`; nodes are circles of
//! radius `sqrt(size) * 3` coloured along a cubehelix rainbow by their position in the
//! node list.

use std::path::Path;

use askama::Template;

use crate::io::{IoError, IoResult, LayoutWriter};
use crate::snapshot::LayoutSnapshot;

/// Radius multiplier applied to `sqrt(size)`
pub const DEFAULT_RADIUS: f64 = 3.0;

/// Space kept around the outermost circles
const MARGIN: f64 = 10.0;

#[derive(Template)]
#[template(path = "layout.svg")]
struct LayoutTemplate {
    width: String,
    height: String,
    view_box: String,
    links: Vec<LineShape>,
    nodes: Vec<CircleShape>,
}

struct LineShape {
    x1: String,
    y1: String,
    x2: String,
    y2: String,
    width: String,
}

struct CircleShape {
    id: usize,
    cx: String,
    cy: String,
    r: String,
    fill: String,
}

fn num(value: f64) -> String {
    format!("{value:.2}")
}

/// Cyclical cubehelix rainbow colour for `t` in [0, 1] as `#rrggbb`
///
/// Hue sweeps a full turn while saturation and lightness peak at `t = 0.5`,
/// so `t = 0` and `t = 1` give the same colour.
pub fn rainbow(t: f64) -> String {
    const A: f64 = -0.14861;
    const B: f64 = 1.78277;
    const C: f64 = -0.29227;
    const D: f64 = -0.90649;
    const E: f64 = 1.97294;

    let t = t - t.floor();
    let ts = (t - 0.5).abs();
    let hue = (360.0 * t - 100.0 + 120.0).to_radians();
    let saturation = 1.5 - 1.5 * ts;
    let lightness = 0.8 - 0.9 * ts;

    let amp = saturation * lightness * (1.0 - lightness);
    let (sin, cos) = hue.sin_cos();
    let channel = |v: f64| (255.0 * v).round().clamp(0.0, 255.0) as u8;

    format!(
        "#{:02x}{:02x}{:02x}",
        channel(lightness + amp * (A * cos + B * sin)),
        channel(lightness + amp * (C * cos + D * sin)),
        channel(lightness + amp * (E * cos))
    )
}

/// Writes a layout as a standalone SVG document
#[derive(Debug, Default)]
pub struct SvgWriter;

impl SvgWriter {
    pub fn new() -> Self {
        Self
    }

    /// Render the layout to an SVG string
    pub fn render(&self, layout: &LayoutSnapshot) -> IoResult<String> {
        let radius = |size: f64| size.max(0.0).sqrt() * DEFAULT_RADIUS;

        let (mut x0, mut y0, mut x1, mut y1) = (0.0_f64, 0.0_f64, 100.0_f64, 100.0_f64);
        if !layout.nodes.is_empty() {
            (x0, y0) = (f64::INFINITY, f64::INFINITY);
            (x1, y1) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for node in &layout.nodes {
                let r = radius(node.size) + MARGIN;
                x0 = x0.min(node.x - r);
                y0 = y0.min(node.y - r);
                x1 = x1.max(node.x + r);
                y1 = y1.max(node.y + r);
            }
        }

        let count = layout.nodes.len().max(1) as f64;
        let template = LayoutTemplate {
            width: num(x1 - x0),
            height: num(y1 - y0),
            view_box: format!("{} {} {} {}", num(x0), num(y0), num(x1 - x0), num(y1 - y0)),
            links: layout
                .edges
                .iter()
                .map(|e| LineShape {
                    x1: num(e.source_x),
                    y1: num(e.source_y),
                    x2: num(e.target_x),
                    y2: num(e.target_y),
                    width: num(e.weight.max(0.0).sqrt()),
                })
                .collect(),
            nodes: layout
                .nodes
                .iter()
                .enumerate()
                .map(|(i, n)| CircleShape {
                    id: n.id,
                    cx: num(n.x),
                    cy: num(n.y),
                    r: num(radius(n.size)),
                    fill: rainbow(i as f64 / count),
                })
                .collect(),
        };

        template.render().map_err(|e| IoError::Write(e.to_string()))
    }
}

impl LayoutWriter for SvgWriter {
    fn write(&self, layout: &LayoutSnapshot, output: &Path) -> IoResult<()> {
        let svg = self.render(layout)?;
        std::fs::write(output, svg)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "svg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{EdgePosition, NodePosition};

    fn two_node_layout() -> LayoutSnapshot {
        LayoutSnapshot {
            tick: 300,
            alpha: 0.0009,
            converged: true,
            nodes: vec![
                NodePosition {
                    id: 0,
                    x: 0.0,
                    y: 0.0,
                    size: 4.0,
                },
                NodePosition {
                    id: 1,
                    x: 30.0,
                    y: 40.0,
                    size: 9.0,
                },
            ],
            edges: vec![EdgePosition {
                source_x: 0.0,
                source_y: 0.0,
                target_x: 30.0,
                target_y: 40.0,
                weight: 4.0,
            }],
        }
    }

    #[test]
    fn rainbow_follows_cubehelix_cycle() {
        assert_eq!(rainbow(0.0), "#6e40aa");
        assert_eq!(rainbow(0.25), "#ff5e63");
        assert_eq!(rainbow(0.5), "#aff05b");
        assert_eq!(rainbow(0.75), "#1ac7c2");
        assert_eq!(rainbow(1.0), rainbow(0.0));
    }

    #[test]
    fn renders_circles_and_lines() {
        let svg = SvgWriter::new().render(&two_node_layout()).unwrap();

        assert!(svg.starts_with("<svg"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert_eq!(svg.matches("<line").count(), 1);
        // r = sqrt(9) * 3
        assert!(svg.contains(r#"cx="30.00" cy="40.00" r="9.00""#));
        // stroke-width = sqrt(4)
        assert!(svg.contains(r#"stroke-width="2.00""#));
    }

    #[test]
    fn view_box_covers_all_circles() {
        let svg = SvgWriter::new().render(&two_node_layout()).unwrap();
        // min corner: node 0 at origin with r = 6 plus margin 10
        // max corner: node 1 at (30, 40) with r = 9 plus margin 10
        assert!(svg.contains(r#"viewBox="-16.00 -16.00 65.00 75.00""#));
    }

    #[test]
    fn empty_layout_renders_blank_canvas() {
        let layout = LayoutSnapshot {
            tick: 0,
            alpha: 1.0,
            converged: true,
            nodes: vec![],
            edges: vec![],
        };
        let svg = SvgWriter::new().render(&layout).unwrap();
        assert!(svg.contains(r#"viewBox="0.00 0.00 100.00 100.00""#));
        assert!(!svg.contains("<circle"));
    }

    #[test]
    fn writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.svg");
        SvgWriter::new().write(&two_node_layout(), &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("</svg>"));
    }
}
