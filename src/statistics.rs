use std::{fmt, fs::File, path::Path};

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

use crate::cache::AccessOutcome;

/// running hit/miss/eviction totals over every lookup of a run
#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStatistics {
    pub hits: usize,
    pub misses: usize,
    pub evictions: usize,
}

impl CacheStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: AccessOutcome) {
        self.hits += outcome.hit as usize;
        self.misses += outcome.miss as usize;
        self.evictions += outcome.eviction as usize;
    }

    pub fn save_statistics(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)
            .wrap_err_with(|| format!("cannot create statistics file {}", path.display()))?;
        serde_json::to_writer_pretty(file, self).wrap_err("cannot serialize statistics")?;
        Ok(())
    }
}

impl fmt::Display for CacheStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn test_record() {
        let mut stat = CacheStatistics::new();
        stat.record(AccessOutcome {
            hit: false,
            miss: true,
            eviction: true,
        });
        stat.record(AccessOutcome {
            hit: true,
            miss: false,
            eviction: false,
        });
        stat.record(AccessOutcome::default());
        assert_eq!(
            stat,
            CacheStatistics {
                hits: 1,
                misses: 1,
                evictions: 1
            }
        );
        assert_eq!(stat.to_string(), "hits:1 misses:1 evictions:1");
    }

    #[test]
    fn test_save_statistics() {
        let stat = CacheStatistics {
            hits: 3,
            misses: 2,
            evictions: 1,
        };
        let path = std::env::temp_dir().join("cachesim-test-stat.json");
        stat.save_statistics(&path).unwrap();
        let loaded: CacheStatistics =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(loaded, stat);
        std::fs::remove_file(&path).unwrap();
    }
}
