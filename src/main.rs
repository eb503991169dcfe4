use std::{io, path::PathBuf, process};

use cachesim::{
    sim::SimRunner, CacheStatistics, Config, Simulator, TraceReader, TraceRunner,
};
use clap::Parser;
use eyre::Result;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    version,
    about = "Replay a memory trace against a set-associative LRU cache",
    after_help = "Examples:\n  cachesim -s 4 -E 1 -b 4 -t traces/yi.trace\n  cachesim -v -s 8 -E 2 -b 4 -t traces/yi.trace"
)]
struct Cli {
    /// Optional verbose flag
    #[arg(short = 'v')]
    verbose: bool,
    /// Number of set index bits
    #[arg(short = 's', value_name = "num", allow_negative_numbers = true)]
    s: Option<i64>,
    /// Number of lines per set
    #[arg(short = 'E', value_name = "num", allow_negative_numbers = true)]
    e: Option<i64>,
    /// Number of block offset bits
    #[arg(short = 'b', value_name = "num", allow_negative_numbers = true)]
    b: Option<i64>,
    /// Trace file
    #[arg(short = 't', value_name = "file")]
    trace: Option<PathBuf>,
    /// TOML file with defaults for the options above
    #[arg(short = 'c', long = "config", value_name = "file")]
    config: Option<PathBuf>,
    /// Also write the final counts to this file as JSON
    #[arg(short = 'j', long = "stats-json", value_name = "file")]
    stats_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // help and version go to stdout and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print().ok();
            process::exit(code);
        }
    };
    cachesim::init_tracing();

    let config = Config {
        s: cli.s,
        e: cli.e,
        b: cli.b,
        trace: cli.trace,
        verbose: cli.verbose,
    };
    let config = match &cli.config {
        Some(path) => config.or(Config::from_config_file(path)?),
        None => config,
    };
    tracing::debug!(?config, "merged configuration");

    // everything is checked before the cache is built
    let cache_config = config.cache_config()?;
    let trace = TraceReader::open(config.trace_path()?)?;
    tracing::info!(?cache_config, "starting simulation");

    let verbose = config.verbose.then(io::stdout);
    let runner = TraceRunner::new(Simulator::new(&cache_config)?, trace, verbose);
    let mut sim_runner = SimRunner::new(runner, CacheStatistics::new());
    sim_runner.run()?;
    let (_, statistics, records) = sim_runner.into_inner();
    tracing::info!(records, "trace finished");

    println!("{statistics}");
    if let Some(path) = &cli.stats_json {
        statistics.save_statistics(path)?;
    }
    Ok(())
}
