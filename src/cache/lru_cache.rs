use super::{AccessResult, CacheConfig};
use crate::error::SimError;

/// the set-associative cache store with LRU replacement
#[derive(Debug)]
pub struct LruCache {
    cache_config: CacheConfig,
    sets: Vec<Set>,
    /// logical time, bumped once per lookup
    clock: u64,
}

#[derive(Debug, Clone)]
struct Set {
    lines: Box<[Line]>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Line {
    valid: bool,
    tag: u64,
    last_used: u64,
}

impl Set {
    /// `None` when the lines cannot be allocated
    fn new(associativity: usize) -> Option<Self> {
        let mut lines = Vec::new();
        lines.try_reserve_exact(associativity).ok()?;
        lines.resize(associativity, Line::default());
        Some(Set {
            lines: lines.into_boxed_slice(),
        })
    }

    fn access(&mut self, tag: u64, now: u64) -> AccessResult {
        for line in self.lines.iter_mut() {
            if line.valid && line.tag == tag {
                line.last_used = now;
                return AccessResult::Hit(tag);
            }
            // lines fill in index order, so the first invalid line means the tag is absent
            if !line.valid {
                *line = Line {
                    valid: true,
                    tag,
                    last_used: now,
                };
                return AccessResult::Miss(tag);
            }
        }
        // the set is full, min_by_key keeps the lowest index on ties
        let (_, victim) = self
            .lines
            .iter_mut()
            .enumerate()
            .min_by_key(|(_, line)| line.last_used)
            .expect("a set always has at least one line");
        let evicted = victim.tag;
        victim.tag = tag;
        victim.last_used = now;
        AccessResult::Eviction {
            tag,
            victim: evicted,
        }
    }

    fn contains(&self, tag: u64) -> bool {
        self.lines.iter().any(|line| line.valid && line.tag == tag)
    }
}

impl LruCache {
    /// Allocate every set up front; a geometry that does not fit in memory
    /// is a config error.
    pub fn new(cache_config: &CacheConfig) -> Result<Self, SimError> {
        let too_large = || {
            SimError::Config(format!(
                "a cache of {} sets with {} lines each does not fit in memory",
                cache_config.sets, cache_config.associativity
            ))
        };
        let num_sets = usize::try_from(cache_config.sets).map_err(|_| too_large())?;
        num_sets
            .checked_mul(cache_config.associativity)
            .ok_or_else(too_large)?;
        let mut sets = Vec::new();
        sets.try_reserve_exact(num_sets).map_err(|_| too_large())?;
        for _ in 0..num_sets {
            sets.push(Set::new(cache_config.associativity).ok_or_else(too_large)?);
        }
        Ok(LruCache {
            cache_config: *cache_config,
            sets,
            clock: 0,
        })
    }

    /// Look the address up, filling or replacing a line on a miss.
    pub fn access(&mut self, addr: u64) -> AccessResult {
        let (set_number, tag) = self.cache_config.decompose(addr);
        self.clock += 1;
        let result = self.sets[set_number as usize].access(tag, self.clock);
        tracing::debug!(addr, set_number, tag, clock = self.clock, ?result, "lookup");
        result
    }

    /// whether the block holding `addr` is resident, without touching recency
    pub fn contains(&self, addr: u64) -> bool {
        let (set_number, tag) = self.cache_config.decompose(addr);
        self.sets[set_number as usize].contains(tag)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.cache_config
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }
}
