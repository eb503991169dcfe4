//! Replays a memory trace against a set-associative LRU cache and counts
//! hits, misses and evictions.
pub mod cache;
pub mod config;
pub mod error;
pub mod sim;
pub mod simulator;
pub mod statistics;
pub mod trace;
pub(self) mod test_utils;

pub use cache::{AccessOutcome, AccessResult, CacheConfig, LruCache};
pub use config::Config;
pub use error::SimError;
pub use simulator::{run_trace, Simulator, TraceRunner};
pub use statistics::CacheStatistics;
pub use trace::{AccessKind, AccessRecord, TraceReader};

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG` (default `warn`), so stdout only
/// carries the simulation output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .unwrap_or_default();
}
