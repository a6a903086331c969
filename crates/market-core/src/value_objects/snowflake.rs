//! Snowflake ids for every marketplace record
//!
//! Layout (most significant first):
//! - 41 bits: milliseconds since [`Snowflake::EPOCH`]
//! - 10 bits: worker id
//! - 12 bits: per-millisecond sequence

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const WORKER_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const MAX_WORKER_ID: u16 = (1 << WORKER_BITS) - 1;

/// Time-ordered 64-bit identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Snowflake(i64);

impl Snowflake {
    /// 2024-01-01T00:00:00Z in unix milliseconds
    pub const EPOCH: i64 = 1_704_067_200_000;

    #[inline]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Unix milliseconds at which this id was minted
    pub fn timestamp_millis(&self) -> i64 {
        (self.0 >> (WORKER_BITS + SEQUENCE_BITS)) + Self::EPOCH
    }

    pub fn worker_id(&self) -> u16 {
        ((self.0 >> SEQUENCE_BITS) & i64::from(MAX_WORKER_ID)) as u16
    }

    pub fn parse(s: &str) -> Result<Self, SnowflakeParseError> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| SnowflakeParseError(s.to_string()))
    }
}

/// Returned when a string is not a valid id
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid id: {0:?}")]
pub struct SnowflakeParseError(pub String);

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<i64> for Snowflake {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<Snowflake> for i64 {
    fn from(id: Snowflake) -> Self {
        id.0
    }
}

impl FromStr for Snowflake {
    type Err = SnowflakeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// Ids go over the wire as strings so JavaScript clients keep full precision.
impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Snowflake {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(Self(v)),
            Raw::Text(s) => Self::parse(&s).map_err(serde::de::Error::custom),
        }
    }
}

/// Lock-free id generator
///
/// The last issued `(timestamp, sequence)` pair is packed into one atomic so
/// concurrent callers never hand out the same id.
pub struct SnowflakeGenerator {
    worker_id: u16,
    // (millis since EPOCH) << SEQUENCE_BITS | sequence
    state: AtomicU64,
}

impl SnowflakeGenerator {
    /// # Panics
    /// Panics if `worker_id` does not fit in 10 bits.
    pub fn new(worker_id: u16) -> Self {
        assert!(worker_id <= MAX_WORKER_ID, "worker id must be < 1024");
        Self {
            worker_id,
            state: AtomicU64::new(0),
        }
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id
    }

    pub fn generate(&self) -> Snowflake {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            let last_millis = current >> SEQUENCE_BITS;
            let now = Self::millis_since_epoch().max(last_millis);

            let next = if now == last_millis {
                let sequence = (current & SEQUENCE_MASK) + 1;
                if sequence > SEQUENCE_MASK {
                    // sequence exhausted for this millisecond; borrow the next one
                    (now + 1) << SEQUENCE_BITS
                } else {
                    (now << SEQUENCE_BITS) | sequence
                }
            } else {
                now << SEQUENCE_BITS
            };

            match self
                .state
                .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => {
                    let millis = (next >> SEQUENCE_BITS) as i64;
                    let sequence = (next & SEQUENCE_MASK) as i64;
                    return Snowflake(
                        (millis << (WORKER_BITS + SEQUENCE_BITS))
                            | (i64::from(self.worker_id) << SEQUENCE_BITS)
                            | sequence,
                    );
                }
                Err(actual) => current = actual,
            }
        }
    }

    fn millis_since_epoch() -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(Snowflake::EPOCH);
        (now - Snowflake::EPOCH).max(0) as u64
    }
}

impl Default for SnowflakeGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for SnowflakeGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnowflakeGenerator")
            .field("worker_id", &self.worker_id)
            .finish_non_exhaustive()
    }
}
