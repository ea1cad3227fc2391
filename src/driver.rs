//! Execution modes: batch and animated
//!
//! Both modes call the same [`Simulation::tick`], so a batch run and an
//! animated run over the same input and configuration end in the same layout.
//!
//! The animated driver is cooperative: [`Animator::frame`] performs one tick and
//! notifies the listener synchronously, and suspension happens only while
//! waiting for the next frame from a [`FrameClock`].

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::graph::GraphInput;
use crate::simulation::{Simulation, SimulationState};
use crate::snapshot::LayoutSnapshot;

/// How a run is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// One tick per frame with per-tick notifications
    Animated,
    /// Tick to convergence in a single blocking call
    Batch,
}

/// One simulation run: the simulation plus how it should be driven
#[derive(Debug)]
pub struct SimulationRun {
    pub simulation: Simulation,
    pub mode: ExecutionMode,
    pub frames_per_second: u32,
}

impl SimulationRun {
    /// Set up a run; fails before any tick on invalid edges or configuration
    pub fn new(graph: &GraphInput, config: &SimulationConfig) -> SimulationResult<Self> {
        let simulation = Simulation::new(graph, config)?;
        let mode = if config.animated {
            ExecutionMode::Animated
        } else {
            ExecutionMode::Batch
        };
        info!(
            nodes = simulation.nodes().len(),
            edges = simulation.links().len(),
            ?mode,
            "starting simulation"
        );

        Ok(Self {
            simulation,
            mode,
            frames_per_second: config.frames_per_second,
        })
    }

    pub fn layout(&self) -> LayoutSnapshot {
        LayoutSnapshot::capture(&self.simulation)
    }
}

/// Tick until convergence and return the final layout
pub fn run_batch(run: &mut SimulationRun) -> LayoutSnapshot {
    let started = Instant::now();
    while run.simulation.tick() == SimulationState::Running {}

    info!(
        ticks = run.simulation.ticks(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation converged (batch)"
    );
    run.layout()
}

/// Receives layouts from an animated run
pub trait TickListener: Send {
    /// Called after every tick
    fn on_tick(&mut self, layout: &LayoutSnapshot);

    /// Called once, after the tick that reached convergence
    fn on_end(&mut self, _layout: &LayoutSnapshot) {}
}

/// Result of one animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// More frames are needed
    Running,
    /// This frame reached convergence; the end notification was sent
    Completed,
    /// The run had already completed; nothing was done
    Idle,
}

/// Drives a run one frame at a time
#[derive(Debug)]
pub struct Animator<L> {
    run: SimulationRun,
    listener: L,
    started: Instant,
    finished: bool,
}

impl<L: TickListener> Animator<L> {
    pub fn new(run: SimulationRun, listener: L) -> Self {
        Self {
            run,
            listener,
            started: Instant::now(),
            finished: false,
        }
    }

    /// Perform one tick and notify the listener
    pub fn frame(&mut self) -> FrameStatus {
        if self.finished {
            return FrameStatus::Idle;
        }

        let state = self.run.simulation.tick();
        let layout = self.run.layout();
        self.listener.on_tick(&layout);

        if state == SimulationState::Converged {
            self.finished = true;
            info!(
                ticks = self.run.simulation.ticks(),
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "simulation converged (animated)"
            );
            self.listener.on_end(&layout);
            return FrameStatus::Completed;
        }
        FrameStatus::Running
    }

    /// Wait for frames from `clock` and tick until the run completes
    pub async fn play<C: FrameClock>(&mut self, clock: &mut C) {
        while !self.finished {
            clock.next_frame().await;
            self.frame();
        }
    }

    pub fn run(&self) -> &SimulationRun {
        &self.run
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn into_parts(self) -> (SimulationRun, L) {
        (self.run, self.listener)
    }
}

/// Source of frame callbacks for animated runs
pub trait FrameClock: Send {
    /// Resolve when the next frame should be produced
    fn next_frame(&mut self) -> impl Future<Output = ()> + Send;
}

/// Frame clock backed by a tokio interval; late frames are skipped, not bunched
#[derive(Debug)]
pub struct IntervalClock {
    interval: Interval,
}

impl IntervalClock {
    /// Must be called from within a tokio runtime
    pub fn new(frames_per_second: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(frames_per_second.max(1)));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }
}

impl FrameClock for IntervalClock {
    async fn next_frame(&mut self) {
        self.interval.tick().await;
    }
}

/// Holds the single active animated run
///
/// Launching a new run first stops the current one and waits for its task to
/// finish, so two tick loops never overlap.
#[derive(Debug)]
pub struct Stage<L> {
    current: Option<JoinHandle<(SimulationRun, L)>>,
}

impl<L> Default for Stage<L> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<L: TickListener + 'static> Stage<L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.current.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop the current run, if any; true when a run was actually cancelled
    ///
    /// A run that already converged is discarded along with its final state.
    /// Call [`Stage::finish`] instead to keep it.
    pub async fn stop(&mut self) -> bool {
        let Some(handle) = self.current.take() else {
            return false;
        };
        handle.abort();
        match handle.await {
            Ok((run, _)) => {
                debug!(
                    ticks = run.simulation.ticks(),
                    "discarded finished simulation"
                );
                false
            }
            Err(e) if e.is_cancelled() => {
                info!("stopped previous simulation");
                true
            }
            Err(_) => false,
        }
    }

    /// Replace the current run with a new animated one
    pub async fn launch<C>(&mut self, run: SimulationRun, listener: L, mut clock: C)
    where
        C: FrameClock + 'static,
    {
        self.stop().await;
        self.current = Some(tokio::spawn(async move {
            let mut animator = Animator::new(run, listener);
            animator.play(&mut clock).await;
            animator.into_parts()
        }));
    }

    /// Wait for the current run to converge and hand back its final state
    ///
    /// Returns `None` when nothing is running or the run's task panicked.
    pub async fn finish(&mut self) -> Option<(SimulationRun, L)> {
        let handle = self.current.take()?;
        handle.await.ok()
    }
}
