//! Simulation configuration
//!
//! All options carry defaults, so a configuration file only needs to name the
//! values it changes. Keys are camelCase (`alphaDecay`, `centerTarget`, ...).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};
use crate::io::{FormatRegistry, IoError, IoResult};

/// A point or vector in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How the many-body force visits node pairs
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ManyBodyMode {
    /// Every distinct pair, O(n²)
    #[default]
    Exact,
    /// Quadtree approximation; cells with `width / distance < theta` act as one body
    BarnesHut { theta: f64 },
}

/// Configuration for a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    /// Animate one tick per frame (true) or run to convergence in one call
    pub animated: bool,
    /// Fraction of the remaining distance to `alpha_target` covered per tick
    pub alpha_decay: f64,
    /// Convergence threshold
    pub alpha_min: f64,
    /// Value alpha decays toward; must stay below `alpha_min`
    pub alpha_target: f64,
    /// Friction: fraction of velocity lost per tick
    pub velocity_decay: f64,
    /// Point the node centroid is pulled toward
    pub center_target: Vec2,
    /// Centering strength (not scaled by alpha)
    pub center_strength: f64,
    /// Magnitude of pairwise repulsion
    pub repulsion_strength: f64,
    /// Distances below this are clamped when computing repulsion
    pub distance_min: f64,
    /// Pairs farther apart than this do not repel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_max: Option<f64>,
    pub many_body: ManyBodyMode,
    /// Rest length of every link
    pub link_base_length: f64,
    /// Shorten links by sqrt(weight)
    pub link_weight_scaling: bool,
    /// Seed for the jiggle applied to coincident nodes
    pub seed: u64,
    /// Frame rate of the animated driver
    pub frames_per_second: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            animated: true,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            alpha_min: 0.001,
            alpha_target: 0.0,
            velocity_decay: 0.4,
            center_target: Vec2::default(),
            center_strength: 0.1,
            repulsion_strength: 30.0,
            distance_min: 1.0,
            distance_max: None,
            many_body: ManyBodyMode::Exact,
            link_base_length: 30.0,
            link_weight_scaling: false,
            seed: 0x5eed,
            frames_per_second: 60,
        }
    }
}

fn non_negative(name: &str, value: f64) -> SimulationResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfig(format!(
            "{name} must be a finite, non-negative number (got {value})"
        )))
    }
}

fn positive(name: &str, value: f64) -> SimulationResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfig(format!(
            "{name} must be a finite, positive number (got {value})"
        )))
    }
}

/// Smallest f64 greater than a positive, finite `x`
fn next_up(x: f64) -> f64 {
    f64::from_bits(x.to_bits() + 1)
}

impl SimulationConfig {
    /// True when one decay step from `alpha` rounds back to `alpha`
    fn decay_stalls_at(&self, alpha: f64) -> bool {
        alpha + (self.alpha_target - alpha) * self.alpha_decay >= alpha
    }

    /// Whether alpha can get from 1 down to `alpha_min` in floating point
    ///
    /// The step shrinks toward the bottom of each binade while the spacing
    /// below it does not, so checking just above every power of two in
    /// `(alpha_min, 1]` and just above `alpha_min` covers the whole descent.
    fn decay_reaches_alpha_min(&self) -> bool {
        if self.decay_stalls_at(1.0) || self.decay_stalls_at(next_up(self.alpha_min)) {
            return false;
        }
        let mut bound = 0.5;
        while bound > self.alpha_min {
            if self.decay_stalls_at(next_up(bound)) {
                return false;
            }
            bound /= 2.0;
        }
        true
    }

    /// Check every option against its valid range
    pub fn validate(&self) -> SimulationResult<()> {
        let invalid = |msg: String| Err(SimulationError::InvalidConfig(msg));

        if !(self.alpha_decay > 0.0 && self.alpha_decay <= 1.0) {
            return invalid(format!(
                "alphaDecay must be in (0, 1] (got {})",
                self.alpha_decay
            ));
        }
        if !(self.alpha_min > 0.0 && self.alpha_min < 1.0) {
            return invalid(format!(
                "alphaMin must be in (0, 1) (got {})",
                self.alpha_min
            ));
        }
        if !(self.alpha_target >= 0.0 && self.alpha_target < self.alpha_min) {
            return invalid(format!(
                "alphaTarget must be in [0, alphaMin) (got {})",
                self.alpha_target
            ));
        }
        if self.alpha_min - self.alpha_target <= self.alpha_min * f64::EPSILON * 16.0 {
            return invalid(format!(
                "alphaTarget must sit clearly below alphaMin (got {} vs {})",
                self.alpha_target, self.alpha_min
            ));
        }
        if !self.decay_reaches_alpha_min() {
            return invalid(format!(
                "alphaDecay {} is too small for alpha to ever reach alphaMin",
                self.alpha_decay
            ));
        }
        if !(0.0..=1.0).contains(&self.velocity_decay) {
            return invalid(format!(
                "velocityDecay must be in [0, 1] (got {})",
                self.velocity_decay
            ));
        }
        if !(self.center_target.x.is_finite() && self.center_target.y.is_finite()) {
            return invalid("centerTarget must be finite".to_string());
        }
        non_negative("centerStrength", self.center_strength)?;
        non_negative("repulsionStrength", self.repulsion_strength)?;
        positive("distanceMin", self.distance_min)?;
        non_negative("linkBaseLength", self.link_base_length)?;
        if let Some(max) = self.distance_max {
            if max.is_nan() || max <= self.distance_min {
                return invalid(format!(
                    "distanceMax must exceed distanceMin (got {max})"
                ));
            }
        }
        if let ManyBodyMode::BarnesHut { theta } = self.many_body {
            if !(theta.is_finite() && theta > 0.0) {
                return invalid(format!("theta must be positive (got {theta})"));
            }
        }
        if self.frames_per_second == 0 {
            return invalid("framesPerSecond must be at least 1".to_string());
        }
        Ok(())
    }

    /// Number of ticks from alpha = 1 until convergence
    pub fn expected_ticks(&self) -> usize {
        let mut alpha = 1.0_f64;
        let mut ticks = 0;
        while alpha > self.alpha_min {
            alpha += (self.alpha_target - alpha) * self.alpha_decay;
            ticks += 1;
        }
        ticks
    }

    /// Load and validate a configuration from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: &Path) -> IoResult<Self> {
        let ext = FormatRegistry::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?
            .to_ascii_lowercase();
        let text = std::fs::read_to_string(path)?;

        let config: Self = match ext.as_str() {
            "yaml" | "yml" => {
                serde_yaml::from_str(&text).map_err(|e| IoError::Parse(e.to_string()))?
            }
            "json" => serde_json::from_str(&text).map_err(|e| IoError::Parse(e.to_string()))?,
            other => return Err(IoError::UnsupportedFormat(other.to_string())),
        };
        config.validate()?;
        Ok(config)
    }
}
