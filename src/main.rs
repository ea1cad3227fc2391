use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use forcelayout::config::SimulationConfig;
use forcelayout::driver::{ExecutionMode, IntervalClock, SimulationRun, Stage, run_batch};
use forcelayout::graph::{GraphInput, RandomGraph};
use forcelayout::io::FormatRegistry;
use forcelayout::json_writer::FrameStream;
use forcelayout::snapshot::LayoutSnapshot;

/// Force-directed layout for random or supplied graphs.
#[derive(Parser)]
#[command(name = "forcelayout")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out a graph and write the final layout
    Simulate(SimulateArgs),
    /// Write a random graph as JSON
    Generate {
        #[command(flatten)]
        graph: GraphArgs,

        /// Output file for the generated graph
        #[arg(short, long, default_value = "graph.json")]
        output: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct GraphArgs {
    /// Number of nodes in a generated graph
    #[arg(short, long, default_value = "20")]
    nodes: usize,

    /// Chance that an ordered pair of nodes is linked
    #[arg(short, long, default_value = "0.05")]
    link_probability: f64,

    /// Seed for graph generation
    #[arg(long, default_value = "0")]
    graph_seed: u64,
}

impl GraphArgs {
    fn random_graph(&self) -> RandomGraph {
        RandomGraph {
            node_count: self.nodes,
            link_probability: self.link_probability,
            seed: self.graph_seed,
            ..Default::default()
        }
    }
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Input graph (.json); a random graph is generated when omitted
    #[arg(short, long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    graph: GraphArgs,

    /// Simulation configuration (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run to convergence without animating
    #[arg(long)]
    batch: bool,

    /// Override alphaDecay
    #[arg(long)]
    alpha_decay: Option<f64>,

    /// Override the simulation seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override framesPerSecond for animated runs
    #[arg(long)]
    fps: Option<u32>,

    /// Stream animated frames to this file as JSON lines
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Output layout file; format follows the extension (.svg or .json)
    #[arg(short, long, default_value = "layout.svg")]
    output: PathBuf,
}

impl SimulateArgs {
    fn config(&self) -> anyhow::Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::load(path)?,
            None => SimulationConfig::default(),
        };
        if self.batch {
            config.animated = false;
        }
        if let Some(decay) = self.alpha_decay {
            config.alpha_decay = decay;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(fps) = self.fps {
            config.frames_per_second = fps;
        }
        config.validate()?;
        Ok(config)
    }

    fn graph(&self) -> anyhow::Result<GraphInput> {
        match &self.input {
            Some(path) => Ok(GraphInput::load(path)?),
            None => Ok(self.graph.random_graph().generate()?),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_layout(layout: &LayoutSnapshot, output: &Path) -> anyhow::Result<()> {
    let registry = FormatRegistry::with_defaults();
    let writer = registry.writer_for_path(output)?;
    writer.write(layout, output)?;
    info!(output = %output.display(), format = writer.format_id(), "wrote layout");
    Ok(())
}

async fn animate(run: SimulationRun, frames: Option<&Path>) -> anyhow::Result<LayoutSnapshot> {
    let sink: Box<dyn Write + Send> = match frames {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(std::io::sink()),
    };
    let clock = IntervalClock::new(run.frames_per_second);

    let mut stage = Stage::new();
    stage.launch(run, FrameStream::new(sink), clock).await;
    let (run, stream) = stage
        .finish()
        .await
        .ok_or_else(|| anyhow::anyhow!("animated simulation did not complete"))?;

    info!(frames = stream.frames(), "streamed frames");
    stream.finish()?;
    Ok(run.layout())
}

async fn simulate(args: &SimulateArgs) -> anyhow::Result<()> {
    let config = args.config()?;
    let graph = args.graph()?;
    let mut run = SimulationRun::new(&graph, &config)?;

    let layout = match run.mode {
        ExecutionMode::Batch => run_batch(&mut run),
        ExecutionMode::Animated => animate(run, args.frames.as_deref()).await?,
    };

    write_layout(&layout, &args.output)?;
    println!(
        "Laid out {} nodes and {} edges in {} ticks; wrote {}",
        layout.nodes.len(),
        layout.edges.len(),
        layout.tick,
        args.output.display()
    );
    Ok(())
}

fn generate(graph: &GraphArgs, output: &Path) -> anyhow::Result<()> {
    let input = graph.random_graph().generate()?;
    input.save(output)?;
    println!(
        "Generated {} nodes and {} edges in {}",
        input.nodes.len(),
        input.edges.len(),
        output.display()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Simulate(args)) => simulate(&args).await?,
        Some(Commands::Generate { graph, output }) => generate(&graph, &output)?,
        None => println!("forcelayout: no command specified. Use --help for usage."),
    }

    Ok(())
}
