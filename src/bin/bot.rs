use anyhow::Context;
use clap::Parser;
use momentum_signal_bot::run::{run, RunConfig, StrategyKind};
use momentum_signal_bot::signal::Dispersion;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bot", about = "Simulate market data and print a decision per source")]
struct Args {
    /// JSON run config; flags below override its fields.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    #[arg(long)]
    seed: Option<u64>,

    /// Points simulated per source.
    #[arg(long)]
    points: Option<usize>,

    /// Trailing z-score window (default: full series).
    #[arg(long)]
    window: Option<usize>,

    #[arg(long, allow_hyphen_values = true)]
    upper: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    lower: Option<f64>,

    #[arg(long, value_enum)]
    dispersion: Option<Dispersion>,

    /// Print the full report as JSON instead of one line per source.
    #[arg(long)]
    json: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(RunConfig, bool)> {
        let mut cfg = match &self.config {
            Some(path) => RunConfig::from_json_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => RunConfig::default(),
        };
        if let Some(s) = self.strategy {
            cfg.strategy = s;
        }
        if let Some(seed) = self.seed {
            cfg.simulation.seed = seed;
        }
        if let Some(points) = self.points {
            cfg.simulation.points = points;
        }
        if let Some(window) = self.window {
            cfg.engine.window = Some(window);
        }
        if let Some(upper) = self.upper {
            cfg.engine.thresholds.upper = upper;
        }
        if let Some(lower) = self.lower {
            cfg.engine.thresholds.lower = lower;
        }
        if let Some(d) = self.dispersion {
            cfg.engine.dispersion = d;
        }
        Ok((cfg, self.json))
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let (cfg, json) = Args::parse().into_config()?;
    let report = run(&cfg).context("signal run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in report.lines() {
            println!("{line}");
        }
    }
    Ok(())
}
