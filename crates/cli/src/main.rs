//! `marketsim` command-line front end.
//!
//! - `simulate`: replay an orders file and write the daily valuation series
//! - `analyze`: compare a valuation series with a benchmark symbol
//! - `optimize`: search allocations of a symbol set for the best Sharpe ratio

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use marketsim_backtest::{
    AllocationOptimizer, FundProperties, MarketSimulator, MetricsCalculator,
};
use marketsim_core::config::CalendarKind;
use marketsim_core::{Config, InMemoryPriceTable, NyseCalendar, PriceTableCalendar, TradingCalendar};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marketsim")]
#[command(about = "Daily portfolio backtester", long_about = None)]
struct Cli {
    /// JSON configuration file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay orders and write the daily valuation series
    Simulate {
        /// Starting cash
        initial_cash: i64,

        /// Orders CSV (year,month,day,symbol,side,shares)
        orders: PathBuf,

        /// Output valuation CSV (year,month,day,equity)
        values: PathBuf,

        #[command(flatten)]
        market: MarketArgs,

        /// Reject buys that would take cash below zero
        #[arg(long, default_value_t = false)]
        no_negative_cash: bool,

        /// Reject sells that would leave a short position
        #[arg(long, default_value_t = false)]
        no_shorts: bool,
    },

    /// Compare a valuation series with a benchmark
    Analyze {
        /// Valuation CSV written by `simulate`
        values: PathBuf,

        /// Benchmark symbol (defaults to the configured one)
        benchmark: Option<String>,

        /// Closing prices CSV (date,symbol,close)
        #[arg(long)]
        prices: PathBuf,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Search allocations for the best Sharpe ratio
    Optimize {
        /// Symbols to allocate across
        #[arg(required = true)]
        symbols: Vec<String>,

        /// First date of the window (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last date of the window (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        #[command(flatten)]
        market: MarketArgs,

        /// Allocation steps per unit (10 = 10% increments)
        #[arg(long)]
        granularity: Option<u32>,

        /// Worker threads (0 = one per core)
        #[arg(long)]
        workers: Option<u32>,

        /// Print JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args)]
struct MarketArgs {
    /// Closing prices CSV (date,symbol,close)
    #[arg(long)]
    prices: PathBuf,

    /// Session calendar
    #[arg(long, value_enum)]
    calendar: Option<CalendarArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CalendarArg {
    /// Rule-based NYSE sessions
    Nyse,
    /// Dates present in the prices file
    PriceTable,
}

impl From<CalendarArg> for CalendarKind {
    fn from(arg: CalendarArg) -> Self {
        match arg {
            CalendarArg::Nyse => CalendarKind::Nyse,
            CalendarArg::PriceTable => CalendarKind::PriceTable,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("load config failed: {}", path.display()))?,
        None => Config::default(),
    };

    match cli.cmd {
        Commands::Simulate {
            initial_cash,
            orders,
            values,
            market,
            no_negative_cash,
            no_shorts,
        } => {
            config.simulation.initial_cash = initial_cash as f64;
            if no_negative_cash {
                config.simulation.allow_negative_cash = false;
            }
            if no_shorts {
                config.simulation.allow_short_positions = false;
            }
            if let Some(kind) = market.calendar {
                config.calendar.kind = kind.into();
            }
            simulate(&config, &orders, &values, &market.prices)
        }
        Commands::Analyze {
            values,
            benchmark,
            prices,
            json,
        } => {
            if let Some(benchmark) = benchmark {
                config.analysis.benchmark = benchmark;
            }
            analyze(&config, &values, &prices, json)
        }
        Commands::Optimize {
            symbols,
            start,
            end,
            market,
            granularity,
            workers,
            json,
        } => {
            if let Some(granularity) = granularity {
                config.optimizer.granularity = granularity;
            }
            if let Some(workers) = workers {
                config.optimizer.workers = workers;
            }
            if let Some(kind) = market.calendar {
                config.calendar.kind = kind.into();
            }
            config.validate()?;
            optimize(&config, &symbols, start, end, &market.prices, json)
        }
    }
}

fn load_prices(path: &Path) -> Result<InMemoryPriceTable> {
    marketsim_ingestion::read_prices_file(path)
        .with_context(|| format!("read prices failed: {}", path.display()))
}

fn calendar_for(kind: CalendarKind, prices: &InMemoryPriceTable) -> Box<dyn TradingCalendar> {
    match kind {
        CalendarKind::Nyse => Box::new(NyseCalendar::new()),
        CalendarKind::PriceTable => Box::new(PriceTableCalendar::from_table(prices)),
    }
}

fn simulate(config: &Config, orders_path: &Path, values_path: &Path, prices_path: &Path) -> Result<()> {
    let orders = marketsim_ingestion::read_orders_file(orders_path)
        .with_context(|| format!("read orders failed: {}", orders_path.display()))?;
    let prices = load_prices(prices_path)?;
    let calendar = calendar_for(config.calendar.kind, &prices);

    let simulator = MarketSimulator::new(&config.simulation, &prices, calendar.as_ref());
    let result = simulator.run(orders).context("order replay failed")?;

    marketsim_ingestion::write_valuations_file(values_path, &result.series)
        .with_context(|| format!("write values failed: {}", values_path.display()))?;

    info!(
        path = %values_path.display(),
        sessions = result.series.len(),
        final_equity = result.final_equity(),
        "valuation series written"
    );
    Ok(())
}

fn analyze(config: &Config, values_path: &Path, prices_path: &Path, json: bool) -> Result<()> {
    let series = marketsim_ingestion::read_valuations_file(values_path)
        .with_context(|| format!("read values failed: {}", values_path.display()))?;
    if series.is_empty() {
        bail!("valuation file {} is empty", values_path.display());
    }
    let prices = load_prices(prices_path)?;

    let metrics = MetricsCalculator::from_config(&config.analysis);
    let comparison = metrics.compare_to_benchmark(&series, &prices, &config.analysis.benchmark)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        println!("Details of the performance of the portfolio:\n");
        println!("Data range: {} to {}\n", first.date, last.date);
        println!("Final value of the portfolio: {}\n", last.equity);
    }
    print_properties("Fund", &comparison.fund);
    print_properties(&config.analysis.benchmark, &comparison.benchmark);
    Ok(())
}

fn optimize(
    config: &Config,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    prices_path: &Path,
    json: bool,
) -> Result<()> {
    let prices = load_prices(prices_path)?;
    let calendar = calendar_for(config.calendar.kind, &prices);

    let optimizer = AllocationOptimizer::new(
        config.optimizer.clone(),
        MetricsCalculator::from_config(&config.analysis),
    );
    let result = optimizer.optimize(&prices, symbols, start, end, calendar.as_ref())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Start date: {start}");
    println!("End date: {end}");
    println!("Symbols: {:?}", result.symbols);
    println!("Optimal allocations: {:?}", result.allocation);
    println!("Allocations scored: {}\n", result.evaluated);
    print_properties("Portfolio", &result.properties);
    Ok(())
}

fn print_properties(label: &str, props: &FundProperties) {
    println!("{label} total return: {}", props.total_return);
    println!("{label} average daily return: {}", props.mean_daily_return);
    println!("{label} standard deviation of daily returns: {}", props.stddev_daily_return);
    println!("{label} Sharpe ratio: {}", props.sharpe_ratio);
    println!("{label} max drawdown: {} ({:.2}%)\n", props.max_drawdown, props.max_drawdown_pct);
}
