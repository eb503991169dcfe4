use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use crate::error::SimError;

mod lru_cache;
pub use lru_cache::LruCache;

/// the geometry of the simulated cache, derived once from the bit widths
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// set index bits
    pub s: u32,
    /// block offset bits
    pub b: u32,
    /// lines per set
    pub associativity: usize,
    /// number of sets, `2^s`
    pub sets: u64,
    /// block size in bytes, `2^b`. informational only
    pub block_size: u64,
}

impl CacheConfig {
    /// Derive the geometry from `s`, `E` and `b`.
    ///
    /// All three must be positive, and `s + b` must leave at least one tag bit
    /// of a 64-bit address.
    pub fn new(s: i64, e: i64, b: i64) -> Result<CacheConfig, SimError> {
        for (name, value) in [("s", s), ("E", e), ("b", b)] {
            if value <= 0 {
                return Err(SimError::Config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if s.saturating_add(b) >= 64 {
            return Err(SimError::Config(format!(
                "s + b must be less than 64, got s={s} b={b}"
            )));
        }
        let associativity = usize::try_from(e)
            .map_err(|_| SimError::Config(format!("E is too large: {e}")))?;
        let (s, b) = (s as u32, b as u32);
        Ok(CacheConfig {
            s,
            b,
            associativity,
            sets: 1 << s,
            block_size: 1 << b,
        })
    }

    /// return the index of the set and the tag
    pub fn decompose(&self, addr: u64) -> (u64, u64) {
        get_set_number_from_addr(addr, self.s, self.b)
    }
}

pub(self) fn get_set_number_from_addr(
    addr: u64,
    set_bit_len: u32,
    block_bit_len: u32,
) -> (u64, u64) {
    let set_number = (addr >> block_bit_len) & ((1 << set_bit_len) - 1);
    let tag = addr >> (set_bit_len + block_bit_len);
    (set_number, tag)
}

/// what a single lookup did to the cache, the payload is the tag of the address
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumAsInner)]
pub enum AccessResult {
    Hit(u64),
    /// filled an invalid line
    Miss(u64),
    /// replaced the least recently used line, which held `victim`
    Eviction { tag: u64, victim: u64 },
}

impl AccessResult {
    pub fn outcome(&self) -> AccessOutcome {
        match self {
            AccessResult::Hit(_) => AccessOutcome {
                hit: true,
                miss: false,
                eviction: false,
            },
            AccessResult::Miss(_) => AccessOutcome {
                hit: false,
                miss: true,
                eviction: false,
            },
            AccessResult::Eviction { .. } => AccessOutcome {
                hit: false,
                miss: true,
                eviction: true,
            },
        }
    }
}

impl From<AccessResult> for AccessOutcome {
    fn from(result: AccessResult) -> Self {
        result.outcome()
    }
}

/// The hit/miss/eviction flags of one lookup, or of a whole record once
/// combined.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    pub hit: bool,
    pub miss: bool,
    pub eviction: bool,
}

impl AccessOutcome {
    /// field-wise OR, used to report a modify record as one outcome
    pub fn combine(self, other: AccessOutcome) -> AccessOutcome {
        AccessOutcome {
            hit: self.hit || other.hit,
            miss: self.miss || other.miss,
            eviction: self.eviction || other.eviction,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn test_config_derive() {
        let config = CacheConfig::new(4, 2, 4).unwrap();
        assert_eq!(config.sets, 16);
        assert_eq!(config.block_size, 16);
        assert_eq!(config.associativity, 2);
    }

    #[test]
    fn test_config_rejects_non_positive() {
        assert!(matches!(CacheConfig::new(0, 1, 1), Err(SimError::Config(_))));
        assert!(matches!(CacheConfig::new(1, 0, 1), Err(SimError::Config(_))));
        assert!(matches!(CacheConfig::new(1, 1, -3), Err(SimError::Config(_))));
        assert!(matches!(CacheConfig::new(40, 1, 24), Err(SimError::Config(_))));
        assert!(CacheConfig::new(32, 1, 31).is_ok());
    }

    #[test]
    fn test_decompose() {
        let config = CacheConfig::new(1, 1, 1).unwrap();
        assert_eq!(config.decompose(0), (0, 0));
        assert_eq!(config.decompose(8), (0, 2));
        assert_eq!(config.decompose(2), (1, 0));
        assert_eq!(config.decompose(3), (1, 0));

        let config = CacheConfig::new(4, 1, 4).unwrap();
        assert_eq!(config.decompose(0x1234), (0x3, 0x12));
    }

    #[test]
    fn test_decompose_stays_in_range() {
        let config = CacheConfig::new(3, 1, 5).unwrap();
        for addr in [0, 1, 0xff, 0xdead_beef, u64::MAX, u64::MAX >> 1, 1 << 63] {
            let (set, tag) = config.decompose(addr);
            assert!(set < config.sets);
            assert_eq!(config.decompose(addr), (set, tag));
            // the three fields put back together give the address again
            let offset = addr & (config.block_size - 1);
            assert_eq!((tag << 8) | (set << 5) | offset, addr);
        }
    }

    #[test]
    fn test_combine() {
        let miss = AccessResult::Miss(1).outcome();
        let hit = AccessOutcome::from(AccessResult::Hit(1));
        let combined = miss.combine(hit);
        assert!(combined.hit && combined.miss && !combined.eviction);
        let evict = AccessResult::Eviction { tag: 1, victim: 2 }.outcome();
        assert_eq!(
            evict.combine(hit),
            AccessOutcome {
                hit: true,
                miss: true,
                eviction: true
            }
        );
        assert_eq!(AccessOutcome::default().combine(hit), hit);
    }
}
