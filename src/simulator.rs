use std::io::{BufRead, Write};

use eyre::{Result, WrapErr};

use crate::{
    cache::{AccessOutcome, CacheConfig, LruCache},
    error::SimError,
    sim::{SimComponent, SimRunner},
    statistics::CacheStatistics,
    trace::{AccessKind, AccessRecord, TraceReader},
};

/// Applies access records to the cache.
pub struct Simulator {
    cache: LruCache,
}

impl Simulator {
    pub fn new(cache_config: &CacheConfig) -> Result<Self, SimError> {
        Ok(Self {
            cache: LruCache::new(cache_config)?,
        })
    }

    /// Simulate one record, feeding every lookup into `statistics`.
    ///
    /// A modify record does two lookups; both are counted and the returned
    /// outcome is their OR. An invalid record is an error and leaves the
    /// cache untouched.
    pub fn simulate(
        &mut self,
        record: &AccessRecord,
        statistics: &mut CacheStatistics,
    ) -> Result<AccessOutcome, SimError> {
        match record.kind {
            AccessKind::InstructionFetch | AccessKind::DataLoad | AccessKind::DataStore => {
                let outcome = self.cache.access(record.address).outcome();
                statistics.record(outcome);
                Ok(outcome)
            }
            AccessKind::DataModify => {
                let load = self.cache.access(record.address).outcome();
                statistics.record(load);
                let store = self.cache.access(record.address).outcome();
                statistics.record(store);
                Ok(load.combine(store))
            }
            AccessKind::Invalid => Err(SimError::InvalidAccessFlag),
        }
    }

    pub fn cache(&self) -> &LruCache {
        &self.cache
    }
}

/// Pulls records from a trace and runs them through a [`Simulator`], one record per step.
///
/// With a verbose sink every record is echoed along with its outcome.
pub struct TraceRunner<R, W> {
    simulator: Simulator,
    trace: TraceReader<R>,
    verbose: Option<W>,
}

impl<R: BufRead, W: Write> TraceRunner<R, W> {
    pub fn new(simulator: Simulator, trace: TraceReader<R>, verbose: Option<W>) -> Self {
        Self {
            simulator,
            trace,
            verbose,
        }
    }

    pub fn into_verbose(self) -> Option<W> {
        self.verbose
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }
}

impl<R: BufRead, W: Write> SimComponent for TraceRunner<R, W> {
    type SharedStatus = CacheStatistics;

    fn update(
        &mut self,
        shared_status: &mut Self::SharedStatus,
        _current_cycle: usize,
    ) -> Result<bool> {
        let (line_no, record) = match self.trace.next() {
            Some(next) => next?,
            None => return Ok(false),
        };
        let outcome = match self.simulator.simulate(&record, shared_status) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("aborting at trace line {line_no}: {e}");
                return Err(e).wrap_err_with(|| format!("at trace line {line_no}"));
            }
        };
        if let Some(out) = self.verbose.as_mut() {
            write_verbose(out, &record, outcome).wrap_err("cannot write verbose output")?;
        }
        Ok(true)
    }
}

fn write_verbose(
    out: &mut impl Write,
    record: &AccessRecord,
    outcome: AccessOutcome,
) -> std::io::Result<()> {
    write!(out, "{record}")?;
    if outcome.miss {
        write!(out, " miss")?;
    }
    if outcome.eviction {
        write!(out, " eviction")?;
    }
    if outcome.hit {
        write!(out, " hit")?;
    }
    writeln!(out)
}

/// Run a whole trace against a fresh cache and return the totals.
pub fn run_trace(cache_config: &CacheConfig, reader: impl BufRead) -> Result<CacheStatistics> {
    let runner: TraceRunner<_, std::io::Sink> = TraceRunner::new(
        Simulator::new(cache_config)?,
        TraceReader::new(reader),
        None,
    );
    let mut sim_runner = SimRunner::new(runner, CacheStatistics::new());
    sim_runner.run()?;
    let (_, statistics, records) = sim_runner.into_inner();
    tracing::info!(records, %statistics, "trace finished");
    Ok(statistics)
}
