//! # Unique Key Generator
//!
//! Produces numeric tokens from wall-clock time that keep increasing within
//! a process. Bag keys are built as `"<nonce>.<ClassName>"`.
//!
//! ## Algorithm
//!
//! Each call scales the current time in milliseconds by [`TIME_SCALE`]. A
//! call landing in the same scaled unit as the previous one increments a
//! repeat counter; a new unit resets it. The token is `scaled + repeat`,
//! truncated to its `length` least-significant decimal digits.
//!
//! ## Bounds
//!
//! Uniqueness is bounded, not global:
//!
//! - Once a burst issues [`TIME_SCALE`] tokens inside one millisecond, the
//!   counter spills into the range of the next millisecond and a later burst
//!   can reproduce a token.
//! - Once the counter reaches `10^length` the truncated token wraps.
//!
//! Both conditions are reported with `tracing::warn!`. The algorithm itself
//! is left unchanged; [`BagRegistry`](crate::BagRegistry) re-draws on
//! collision so bag keys stay unique.

use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;

use crate::config::RegistryConfig;
use crate::error::ConfigError;

/// Default number of digits kept from each token.
pub const DEFAULT_NONCE_LENGTH: u32 = 15;

/// Largest digit count representable in a `u64` token.
pub const MAX_NONCE_LENGTH: u32 = 18;

/// Multiplier applied to the millisecond clock before adding the repeat counter.
pub const TIME_SCALE: i64 = 100;

/// Source of wall-clock time in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time in milliseconds.
    fn now_millis(&self) -> i64;
}

/// The system UTC clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A manually driven clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    /// Create a clock frozen at `millis`.
    pub fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Move the clock to `millis`.
    pub fn set(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    /// Move the clock forward by `delta` milliseconds.
    pub fn advance(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct NonceState {
    last_scaled: i64,
    repeat: u64,
}

/// Time-based nonce source shared by a registry.
///
/// Construct once and hand it to [`BagRegistry::new`](crate::BagRegistry::new)
/// behind an `Arc`.
#[derive(Debug)]
pub struct KeyGenerator {
    clock: Arc<dyn Clock>,
    length: u32,
    modulus: u64,
    state: Mutex<NonceState>,
}

impl KeyGenerator {
    /// Generator on the system clock with the default token length.
    pub fn new() -> Self {
        Self::build(Arc::new(SystemClock), DEFAULT_NONCE_LENGTH)
    }

    /// Generator on the system clock configured from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNonceLength`] for an out-of-range length.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, ConfigError> {
        Self::with_clock(Arc::new(SystemClock), config.nonce_length)
    }

    /// Generator on a caller-supplied clock.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNonceLength`] unless `1 <= length <= 18`.
    pub fn with_clock(clock: Arc<dyn Clock>, length: u32) -> Result<Self, ConfigError> {
        RegistryConfig {
            nonce_length: length,
        }
        .validate()?;
        Ok(Self::build(clock, length))
    }

    fn build(clock: Arc<dyn Clock>, length: u32) -> Self {
        Self {
            clock,
            length,
            modulus: 10u64.pow(length),
            state: Mutex::new(NonceState {
                last_scaled: i64::MIN,
                repeat: 0,
            }),
        }
    }

    /// Number of digits kept from each token.
    pub fn length(&self) -> u32 {
        self.length
    }

    /// Draw the next token.
    pub fn next(&self) -> u64 {
        let scaled = self.clock.now_millis().saturating_mul(TIME_SCALE);

        let repeat = {
            let mut state = self.state.lock();
            if scaled == state.last_scaled {
                state.repeat += 1;
            } else {
                state.last_scaled = scaled;
                state.repeat = 0;
            }
            state.repeat
        };

        if repeat == TIME_SCALE as u64 {
            tracing::warn!(
                scaled,
                repeat,
                "nonce burst spilled into the next time unit; later tokens may repeat"
            );
        }
        if repeat == self.modulus {
            tracing::warn!(
                scaled,
                repeat,
                length = self.length,
                "nonce repeat counter reached the truncation window; tokens wrap"
            );
        }

        let base = u64::try_from(scaled).unwrap_or(0);
        base.wrapping_add(repeat) % self.modulus
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn fixed(millis: i64, length: u32) -> (Arc<FixedClock>, KeyGenerator) {
        let clock = Arc::new(FixedClock::new(millis));
        let gen = KeyGenerator::with_clock(clock.clone(), length).unwrap();
        (clock, gen)
    }

    #[test]
    fn first_token_is_scaled_time() {
        let (_, gen) = fixed(1_700_000_000_123, 15);
        assert_eq!(gen.next(), 170_000_000_012_300);
    }

    #[test]
    fn repeat_counter_increments_within_one_millisecond() {
        let (_, gen) = fixed(1_000, 15);
        assert_eq!(gen.next(), 100_000);
        assert_eq!(gen.next(), 100_001);
        assert_eq!(gen.next(), 100_002);
    }

    #[test]
    fn new_millisecond_resets_counter() {
        let (clock, gen) = fixed(1_000, 15);
        gen.next();
        gen.next();
        clock.advance(1);
        assert_eq!(gen.next(), 100_100);
    }

    #[test]
    fn thousand_calls_in_one_millisecond_are_distinct() {
        let (_, gen) = fixed(1_700_000_000_000, 15);
        let tokens: HashSet<u64> = (0..1000).map(|_| gen.next()).collect();
        assert_eq!(tokens.len(), 1000);
    }

    #[test]
    fn tokens_are_truncated_to_length() {
        let (_, gen) = fixed(1_700_000_000_123, 4);
        assert_eq!(gen.next(), 2_300);
        assert_eq!(gen.length(), 4);
    }

    #[test]
    fn truncation_drops_leading_zeros() {
        let (_, gen) = fixed(10_000_000, 6);
        // 1_000_000_000 keeps only "000000".
        assert_eq!(gen.next(), 0);
    }

    #[test]
    fn spill_into_next_unit_is_observable() {
        // A burst of 101 tokens reaches the first token of the next millisecond.
        let (clock, gen) = fixed(1_000, 15);
        let burst: Vec<u64> = (0..=TIME_SCALE).map(|_| gen.next()).collect();
        clock.advance(1);
        let next = gen.next();
        assert!(burst.contains(&next));
    }

    #[test]
    fn invalid_length_is_rejected() {
        assert!(KeyGenerator::with_clock(Arc::new(SystemClock), 0).is_err());
        assert!(KeyGenerator::with_clock(Arc::new(SystemClock), 19).is_err());
    }

    #[test]
    fn pre_epoch_clock_does_not_panic() {
        let (_, gen) = fixed(-5, 15);
        assert_eq!(gen.next(), 0);
    }

    #[test]
    fn system_clock_tokens_never_decrease() {
        let gen = KeyGenerator::new();
        let mut last = gen.next();
        for _ in 0..50 {
            let next = gen.next();
            assert!(next >= last);
            last = next;
        }
    }

    proptest! {
        /// Within a single millisecond every token below the truncation
        /// window is distinct and strictly increasing.
        #[test]
        fn burst_is_strictly_increasing(millis in 0i64..5_000_000_000_000, count in 1usize..200) {
            let (_, gen) = fixed(millis, 15);
            let tokens: Vec<u64> = (0..count).map(|_| gen.next()).collect();
            prop_assert!(tokens.windows(2).all(|w| w[1] == w[0] + 1));
        }
    }
}
