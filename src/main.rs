use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use pricelevels_cluster::{InitStrategy, LevelConfig};
use pricelevels_io::{LevelWriter, PriceReader, Ticker};
use pricelevels_stats::{EstimatorKind, center, spread};

#[derive(Parser)]
#[command(name = "pricelevels")]
#[command(about = "Support and resistance levels by one-dimensional price clustering")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for K-means++ seeding
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for parallel restarts (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

/// Where to find the price history.
#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Path to the input CSV file
    #[arg(long)]
    data: PathBuf,

    /// Header of the timestamp column
    #[arg(long, default_value = "Date")]
    date_column: String,

    /// Header of the price column
    #[arg(long, default_value = "Close")]
    price_column: String,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum InitArg {
    /// Evenly spaced quantiles of the window (deterministic)
    Quantile,
    /// K-means++ sampling with `--n-init` restarts
    Kpp,
}

impl From<InitArg> for InitStrategy {
    fn from(arg: InitArg) -> Self {
        match arg {
            InitArg::Quantile => InitStrategy::Quantile,
            InitArg::Kpp => InitStrategy::KMeansPlusPlus,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Cluster the trailing window into k price levels and write band artifacts
    Levels {
        #[command(flatten)]
        input: InputArgs,

        /// Ticker used to name output files (must match [A-Za-z0-9._^=-]+)
        #[arg(long)]
        ticker: String,

        /// Number of price levels
        #[arg(long, default_value_t = 3)]
        k: usize,

        /// Estimator: "mean" (mean/std) or "median" (median/spread around median)
        #[arg(long, default_value = "mean")]
        estimator: EstimatorKind,

        /// Number of most recent observations to cluster
        #[arg(long, default_value_t = 252)]
        train_n: usize,

        /// Maximum assign/update iterations
        #[arg(long, default_value_t = 100)]
        max_iter: usize,

        /// Center initialization strategy
        #[arg(long, value_enum, default_value_t = InitArg::Quantile)]
        init: InitArg,

        /// Number of K-means++ restarts (best result kept)
        #[arg(long, default_value_t = 10)]
        n_init: usize,

        /// Delta degrees of freedom for the band spread
        #[arg(long, default_value_t = 0)]
        ddof: usize,

        /// Omit the center ± spread band lines
        #[arg(long, default_value_t = false)]
        no_band: bool,

        /// Output directory for result files
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Center and spread of the whole training window
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Estimator: "mean" or "median"
        #[arg(long, default_value = "mean")]
        estimator: EstimatorKind,

        /// Number of most recent observations to summarize
        #[arg(long, default_value_t = 252)]
        train_n: usize,

        /// Delta degrees of freedom for the spread
        #[arg(long, default_value_t = 0)]
        ddof: usize,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct LevelsOutput {
    ticker: String,
    estimator: &'static str,
    k: usize,
    train_n: usize,
    last_date: Option<String>,
    last_price: f64,
    nearest_level: usize,
    converged: bool,
    iterations: usize,
    inertia: f64,
    levels: Vec<LevelOutput>,
    artifacts: Vec<PathBuf>,
}

#[derive(Serialize)]
struct LevelOutput {
    center: f64,
    lower: f64,
    upper: f64,
    member_count: usize,
}

#[derive(Serialize)]
struct SummaryOutput {
    estimator: &'static str,
    train_n: usize,
    center: f64,
    spread: f64,
    lower: f64,
    upper: f64,
}

fn read_history(input: &InputArgs) -> Result<pricelevels_io::PriceHistory> {
    let history = PriceReader::new(&input.data)
        .with_date_column(input.date_column.as_str())
        .with_price_column(input.price_column.as_str())
        .read()
        .context("failed to read input CSV")?;
    Ok(history)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Configure Rayon thread pool
    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Levels {
            input,
            ticker,
            k,
            estimator,
            train_n,
            max_iter,
            init,
            n_init,
            ddof,
            no_band,
            output_dir,
        } => {
            let ticker_name = Ticker::new(ticker.clone()).context("invalid ticker")?;

            // Read history
            let history = read_history(&input)?;

            // Build and run clustering
            let config = LevelConfig::new(k, estimator)
                .context("invalid level configuration")?
                .with_max_iter(max_iter)
                .with_seed(cli.seed)
                .with_init_strategy(init.into())
                .with_n_init(n_init)
                .with_ddof(ddof);

            let fit = config
                .fit_trailing(&history.series, train_n)
                .context("clustering failed")?;

            // Write artifacts
            let writer = LevelWriter::new(&output_dir, ticker_name)
                .context("failed to prepare output directory")?
                .with_plot_band(!no_band);
            let json_path = writer
                .write_levels(train_n, &fit)
                .context("failed to write levels JSON")?;
            let csv_path = writer
                .write_lines(&fit)
                .context("failed to write lines CSV")?;

            // Build and print stdout summary
            let last_price = history.series.last();
            let output = LevelsOutput {
                ticker,
                estimator: estimator.as_str(),
                k,
                train_n,
                last_date: history.last_date().map(str::to_string),
                last_price,
                nearest_level: fit.nearest(last_price).index(),
                converged: fit.converged,
                iterations: fit.iterations,
                inertia: fit.inertia.value(),
                levels: fit
                    .records
                    .iter()
                    .map(|r| {
                        let band = r.band();
                        LevelOutput {
                            center: band.center,
                            lower: band.lower,
                            upper: band.upper,
                            member_count: r.member_count,
                        }
                    })
                    .collect(),
                artifacts: vec![json_path, csv_path],
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Command::Summary {
            input,
            estimator,
            train_n,
            ddof,
        } => {
            let history = read_history(&input)?;
            let window = history
                .series
                .trailing(train_n)
                .context("invalid training window")?;

            let mu = center(window, estimator).context("center failed")?;
            let sd = spread(window, mu, estimator, ddof).context("spread failed")?;
            info!(center = mu, spread = sd, "window summarized");

            let output = SummaryOutput {
                estimator: estimator.as_str(),
                train_n,
                center: mu,
                spread: sd,
                lower: mu - sd,
                upper: mu + sd,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}
