use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use sclam2d::core::graph::{Graph, GraphConfig};
use sclam2d::core::registry::Schema;
use sclam2d::core::{NodeId, NodeKind};
use sclam2d::error::{SclamError, SclamResult};
use sclam2d::io::{load_graph, save_graph};
use sclam2d::init_logger_with_level;
use tracing::{Level, info, warn};

#[derive(Parser)]
#[command(name = "evaluate_calibration_graph")]
#[command(about = "Bootstrap and evaluate a 2D calibration pose graph")]
struct Args {
    /// Graph file to load
    input: PathBuf,

    /// Record schema: "node-tagged" or "edge-tagged"
    #[arg(short, long, default_value_t = Schema::NodeTagged)]
    schema: Schema,

    /// Node ids held fixed while bootstrapping (comma separated).
    /// Defaults to the first pose plus every parameter and variance node.
    #[arg(short, long, value_delimiter = ',')]
    fixed: Vec<usize>,

    /// Maximum number of bootstrap passes
    #[arg(long)]
    bootstrap_rounds: Option<usize>,

    /// Skip lines with unknown type tags instead of failing
    #[arg(long)]
    skip_unknown: bool,

    /// Fail when any edge evaluates to NaN or Inf
    #[arg(long)]
    fail_on_degenerate: bool,

    /// Skip bootstrapping and evaluate the estimates as loaded
    #[arg(long)]
    no_bootstrap: bool,

    /// Optional path to write the bootstrapped graph to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> GraphConfig {
        let mut config = GraphConfig::new()
            .with_schema(self.schema)
            .with_skip_unknown(self.skip_unknown)
            .with_fail_on_degenerate(self.fail_on_degenerate);
        if let Some(rounds) = self.bootstrap_rounds {
            config = config.with_bootstrap_rounds(rounds);
        }
        config
    }
}

/// First pose plus every node that is not a pose.
fn default_fixed(graph: &Graph) -> Vec<NodeId> {
    let mut first_pose = None;
    let mut fixed = Vec::new();
    for (id, node) in graph.nodes().iter() {
        match node.kind() {
            NodeKind::Pose if first_pose.is_none() => first_pose = Some(id),
            NodeKind::Pose => {}
            NodeKind::Parameter | NodeKind::Variance => fixed.push(id),
        }
    }
    fixed.extend(first_pose);
    fixed
}

fn edge_summary(graph: &Graph) {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for edge in graph.edges() {
        *counts.entry(edge.tag()).or_default() += 1;
    }
    for (tag, count) in counts {
        info!("  {:<32} {:>8}", tag, count);
    }
}

fn run(args: &Args) -> SclamResult<()> {
    let load_start = Instant::now();
    let mut graph = load_graph(&args.input, &args.config())?;
    info!(
        "Loaded {:?}: {} nodes, {} edges ({} schema) in {:.1}ms",
        args.input,
        graph.nodes().len(),
        graph.edges().len(),
        args.schema,
        load_start.elapsed().as_secs_f64() * 1000.0
    );
    edge_summary(&graph);

    if !args.no_bootstrap {
        let fixed: Vec<NodeId> = if args.fixed.is_empty() {
            default_fixed(&graph)
        } else {
            args.fixed.iter().copied().map(NodeId).collect()
        };
        for id in &fixed {
            graph.set_fixed(*id)?;
        }

        let bootstrap_start = Instant::now();
        let initialized = graph.bootstrap()?;
        info!(
            "Bootstrapped {} of {} free nodes from {} fixed in {:.1}ms",
            initialized.len(),
            graph.nodes().len() - graph.fixed().len(),
            graph.fixed().len(),
            bootstrap_start.elapsed().as_secs_f64() * 1000.0
        );
    }

    let eval_start = Instant::now();
    graph.compute_errors()?;
    let degenerate = graph.degenerate_edges();
    info!(
        "chi2 = {:.6e} over {} edges in {:.1}ms",
        graph.chi2(),
        graph.edges().len(),
        eval_start.elapsed().as_secs_f64() * 1000.0
    );
    if !degenerate.is_empty() {
        warn!("{} degenerate edge(s):", degenerate.len());
        for index in degenerate.iter().take(10) {
            if let Some(edge) = graph.edge(*index) {
                warn!("  edge {} {} {:?}", index, edge.tag(), edge.vertices());
            }
        }
    }

    if let Some(output) = &args.output {
        save_graph(&graph, output)?;
        info!("Wrote {:?}", output);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logger_with_level(if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });

    info!("SCLAM2D CALIBRATION GRAPH EVALUATION\n");

    run(&args).map_err(|e: SclamError| {
        warn!("Evaluation failed");
        warn!("Full error chain:\n{}", e.chain());
        e.into()
    })
}
