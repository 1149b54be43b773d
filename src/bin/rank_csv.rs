//! Rank a Z-score CSV from the command line and print the tiers.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use tradeoff_ranker::api::rank_response;
use tradeoff_ranker::config::RankerConfig;
use tradeoff_ranker::ingest::load_table_from;
use tradeoff_ranker::pipeline::rank_table;
use tradeoff_ranker::scoring::Weights;
use tradeoff_ranker::taxonomy::label_rows;

#[derive(Parser, Debug)]
#[command(name = "rank_csv")]
#[command(about = "Rank alternatives by weighted cost, quality and deadline Z-scores", long_about = None)]
#[command(version)]
struct Cli {
    /// Z-score table (comma or semicolon separated)
    zscores: PathBuf,

    /// Optional names/coordinates table, joined by row position
    #[arg(long)]
    names: Option<PathBuf>,

    /// Cost, quality and deadline weights; rescaled to sum to 1
    #[arg(long, value_delimiter = ',', required = true, allow_hyphen_values = true)]
    weights: Vec<f64>,

    /// Print the full result as JSON
    #[arg(long)]
    json: bool,

    /// Upper bound for the number of tiers
    #[arg(long, env = "RANKER_MAX_TIERS")]
    max_tiers: Option<usize>,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let [r, g, b] = cli.weights.as_slice() else {
        bail!("--weights takes exactly three numbers (cost,quality,deadline)");
    };
    let weights = Weights::new(*r, *g, *b).normalized()?;

    let mut cfg = RankerConfig::load_default()?;
    if let Some(k) = cli.max_tiers {
        cfg.max_components = k.max(1);
    }

    let table = load_table_from(&cli.zscores)?;
    let names = match &cli.names {
        Some(p) => load_table_from(p)?,
        None => Default::default(),
    };

    let ranking = rank_table(&table, &weights, &cfg.rank_options())
        .with_context(|| format!("ranking {}", cli.zscores.display()))?;
    let labels = label_rows(&names, table.len(), &cfg.labels);
    let out = rank_response(&cfg, ranking, &labels);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let fmt = |v: f64| out.ranking.format(v);
    println!(
        "{:>4}  {:<24} {:<10} {:>16}  {}",
        "#", "name", "coord", "grade", "tier"
    );
    for (pos, s) in out.solutions.iter().enumerate() {
        println!(
            "{:>4}  {:<24} {:<10} {:>16}  {}",
            pos + 1,
            s.name,
            s.coord,
            format!("{} ± {}", fmt(s.item.grade), fmt(s.item.grade_error)),
            s.tier_name
        );
    }
    println!();
    for p in &out.podium {
        println!(
            "{}. {} ({} members, best: {} {})",
            p.place,
            p.tier_name,
            p.members,
            p.best.name,
            fmt(p.best.item.grade)
        );
    }
    if !out.ranking.flagged_rows.is_empty() {
        println!("flagged rows: {:?}", out.ranking.flagged_rows);
    }
    Ok(())
}
