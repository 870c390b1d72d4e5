//! # pnf
//!
//! Command-line front end: load daily bars from CSV, size the boxes, print the
//! Point-and-Figure chart and any reversal patterns.
//!
//! Usage: pnf chart --input prices.csv [--method atr --atr-period 14] [--reversal 3]

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use yapnf::{params, prelude::*, report};

#[derive(Parser)]
#[command(name = "pnf")]
#[command(about = "Point-and-Figure charts and reversal patterns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    Atr,
    Percentage,
    Manual,
    Traditional,
}

impl Method {
    fn name(self) -> &'static str {
        match self {
            Method::Atr => "ATR",
            Method::Percentage => "Percentage",
            Method::Manual => "Manual",
            Method::Traditional => "Traditional",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build a chart from a Date,Open,High,Low,Close CSV file
    Chart {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// TOML configuration (flags below are ignored when given)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Box size calculation method
        #[arg(short, long, value_enum, default_value = "traditional")]
        method: Method,

        /// ATR period for --method atr
        #[arg(long, default_value = "14")]
        atr_period: usize,

        /// Percentage of price for --method percentage
        #[arg(long, default_value = "1.0")]
        percent: f64,

        /// Box size for --method manual
        #[arg(long)]
        value: Option<f64>,

        /// Boxes needed for a reversal
        #[arg(short, long, default_value = "3")]
        reversal: usize,

        /// Let a bar that extends a column also reverse it
        #[arg(long)]
        extend_then_reverse: bool,

        /// Label printed with the results
        #[arg(short, long)]
        symbol: Option<String>,

        /// Skip the text chart, print only box size and patterns
        #[arg(long)]
        no_chart: bool,
    },

    /// List sizing methods and their parameters
    Policies,
}

/// Load bars from a CSV file with Date,Open,High,Low,Close headers
fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut bars = Vec::new();
    for (line, record) in reader.deserialize::<Bar>().enumerate() {
        let bar = record.with_context(|| format!("Failed to read record {}", line + 1))?;
        bars.push(bar);
    }

    if bars.is_empty() {
        bail!("No bars found in {}", path.display());
    }
    Ok(bars)
}

fn policy_from_flags(
    method: Method,
    atr_period: usize,
    percent: f64,
    value: Option<f64>,
) -> Result<SizingPolicy> {
    let mut values: HashMap<&str, f64> = HashMap::new();
    values.insert(params::ATR_PERIOD.name, atr_period as f64);
    values.insert(params::PERCENT.name, percent);
    if let Some(v) = value {
        values.insert(params::MANUAL_VALUE.name, v);
    }
    Ok(SizingPolicy::from_params(method.name(), &values)?)
}

fn print_policies() -> Result<()> {
    for name in params::POLICY_NAMES {
        println!("{}", name);
        for meta in params::policy_params(name)? {
            let (min, max, step) = meta.range;
            let max = if max == f64::MAX {
                "-".to_string()
            } else {
                max.to_string()
            };
            println!(
                "  {:<12} {:?} default {} (min {}, max {}, step {}) - {}",
                meta.name, meta.param_type, meta.default, min, max, step, meta.description
            );
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Chart {
            input,
            config,
            method,
            atr_period,
            percent,
            value,
            reversal,
            extend_then_reverse,
            symbol,
            no_chart,
        } => {
            let config = match config {
                Some(path) => AnalysisConfig::load(&path)?,
                None => AnalysisConfig {
                    reversal: ReversalBoxes::new(reversal)?,
                    resolution: if extend_then_reverse {
                        BarResolution::ExtendThenReverse
                    } else {
                        BarResolution::ExtensionFirst
                    },
                    validate_data: true,
                    patterns: None,
                    sizing: policy_from_flags(method, atr_period, percent, value)?,
                },
            };

            let bars = load_bars(&input)?;
            let label = symbol.unwrap_or_else(|| input.display().to_string());
            println!("Data for {} loaded: {} bars", label, bars.len());

            let engine = config.engine()?;
            let analysis = engine.analyze(&bars, &config.sizing)?;
            println!(
                "Box size calculated using {} method: {}",
                config.sizing.name(),
                analysis.box_size
            );

            if !no_chart {
                print!("{}", report::render_text(&analysis.chart));
            }
            for line in report::describe_findings(&analysis.findings) {
                println!("{}", line);
            }
        }
        Commands::Policies => print_policies()?,
    }

    Ok(())
}
