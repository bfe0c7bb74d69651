//! In-process probabilistic existence filter for short codes.
//!
//! A Bloom filter sized once at startup from the expected number of codes
//! (N) and the target false-positive rate (P). It is add-only: never resized,
//! never persisted. A negative [`ExistenceFilter::test`] is authoritative, a
//! positive one only means "maybe".

use bloomfilter::Bloom;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("expected item count must be greater than zero")]
    ZeroCapacity,
    #[error("false-positive rate must be between 0 and 1 (exclusive), got {0}")]
    InvalidFpRate(f64),
    #[error("failed to allocate bloom filter: {0}")]
    Allocation(String),
}

pub struct ExistenceFilter {
    bloom: RwLock<Bloom<str>>,
    capacity: usize,
    fp_rate: f64,
    inserted: AtomicUsize,
    over_capacity_logged: AtomicBool,
}

impl ExistenceFilter {
    /// Creates an empty filter for `capacity` items at false-positive rate `fp_rate`.
    pub fn new(capacity: usize, fp_rate: f64) -> Result<Self, FilterError> {
        if capacity == 0 {
            return Err(FilterError::ZeroCapacity);
        }
        if !(fp_rate > 0.0 && fp_rate < 1.0) {
            return Err(FilterError::InvalidFpRate(fp_rate));
        }

        let bloom = Bloom::new_for_fp_rate(capacity, fp_rate)
            .map_err(|e| FilterError::Allocation(e.to_string()))?;

        debug!(
            "Existence filter created (capacity: {}, fp_rate: {})",
            capacity, fp_rate
        );

        Ok(Self {
            bloom: RwLock::new(bloom),
            capacity,
            fp_rate,
            inserted: AtomicUsize::new(0),
            over_capacity_logged: AtomicBool::new(false),
        })
    }

    /// Records a code as present.
    pub fn add(&self, code: &str) {
        self.bloom.write().set(code);
        self.record_insertions(1);
    }

    /// Records many codes under a single write lock.
    pub fn add_all<I, S>(&self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        {
            let mut bloom = self.bloom.write();
            for code in codes {
                bloom.set(code.as_ref());
                count += 1;
            }
        }
        self.record_insertions(count);
        debug!("Bulk inserted {} codes into existence filter", count);
    }

    /// `false` means the code was never added; `true` is inconclusive.
    pub fn test(&self, code: &str) -> bool {
        self.bloom.read().check(code)
    }

    /// Number of insertions performed so far (duplicates included).
    pub fn inserted(&self) -> usize {
        self.inserted.load(Ordering::Relaxed)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn fp_rate(&self) -> f64 {
        self.fp_rate
    }

    fn record_insertions(&self, count: usize) {
        let total = self.inserted.fetch_add(count, Ordering::Relaxed) + count;
        if total > self.capacity && !self.over_capacity_logged.swap(true, Ordering::Relaxed) {
            warn!(
                "Existence filter exceeded its expected capacity of {} items; \
                 the false-positive rate will rise above {}",
                self.capacity, self.fp_rate
            );
        }
    }
}
