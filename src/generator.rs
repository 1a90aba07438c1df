//! TUID generator and related types.

use crate::entropy::RandSource;
use crate::tick::{StdSystemTime, TimeSource};
use crate::Tuid;


/// Represents a TUID generator that encapsulates the last tick and entropy value and guarantees
/// distinct, monotonically ordered TUIDs generated within the same clock tick.
///
/// When the clock reports the same `(seconds, nanos)` tick as the preceding call, the generator
/// treats the previous entropy field as a 48-bit big-endian counter and increments it by one;
/// otherwise, it draws a fresh entropy field from the random number generator. The counter wraps
/// around to zero after `0xffff_ffff_ffff` without notice, so uniqueness is not guaranteed for more
/// than 2^48 TUIDs within a single tick.
///
/// This type provides the interface to customize the random number generator and system clock of
/// a TUID generator. It also helps control the scope of guaranteed order of the generated TUIDs.
/// The following example guarantees the process-wide (cross-thread) uniqueness using Rust's
/// standard synchronization mechanism.
///
/// # Examples
///
/// ```rust
/// use rand::rngs::OsRng;
/// use std::{sync, thread};
/// use tuid::TuidGenerator;
///
/// let g = sync::Arc::new(sync::Mutex::new(TuidGenerator::with_rand08(OsRng)));
/// thread::scope(|s| {
///     for i in 0..4 {
///         let g = sync::Arc::clone(&g);
///         s.spawn(move || {
///             for _ in 0..8 {
///                 println!("{} by thread {}", g.lock().unwrap().next_unique(), i);
///                 thread::yield_now();
///             }
///         });
///     }
/// });
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TuidGenerator<R, T = StdSystemTime> {
    seconds: i64,
    nanos: u32,
    entropy: [u8; 6],

    /// The random number generator used by the generator.
    rng: R,

    /// The system clock used by the generator.
    time_source: T,
}

impl<R: RandSource> TuidGenerator<R> {
    /// Creates a generator object with a specified random number generator. The generator reads
    /// the system wall clock.
    pub const fn new(rng: R) -> Self {
        Self::with_rand_and_time_sources(rng, StdSystemTime)
    }
}

impl<R: RandSource, T: TimeSource> TuidGenerator<R, T> {
    /// Creates a generator object with specified random number generator and system clock.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::{entropy::with_rand08::Adapter, tick::TimeSource, TuidGenerator};
    ///
    /// struct FrozenClock;
    /// impl TimeSource for FrozenClock {
    ///     fn now(&mut self) -> (i64, u32) {
    ///         (1_700_000_000, 0)
    ///     }
    /// }
    ///
    /// let mut g = TuidGenerator::with_rand_and_time_sources(Adapter(rand::thread_rng()), FrozenClock);
    /// let x = g.next_unique();
    /// let y = g.next_unique();
    /// assert_eq!(x.timestamp(), y.timestamp());
    /// assert!(x < y);
    /// ```
    pub const fn with_rand_and_time_sources(rng: R, time_source: T) -> Self {
        Self {
            seconds: 0,
            nanos: 0,
            entropy: [0; 6],
            rng,
            time_source,
        }
    }

    /// Generates a new TUID object from the current tick.
    ///
    /// See the [`TuidGenerator`] type documentation for the description.
    pub fn next_unique(&mut self) -> Tuid {
        let (seconds, nanos) = self.time_source.now();
        self.next_unique_core(seconds, nanos)
    }

    /// Generates a new TUID object from the `(seconds, nanos)` tick passed.
    ///
    /// See the [`TuidGenerator`] type documentation for the description.
    pub fn next_unique_core(&mut self, seconds: i64, nanos: u32) -> Tuid {
        if seconds == self.seconds && nanos == self.nanos {
            let (entropy, wrapped) = increment(self.entropy);
            if wrapped {
                #[cfg(feature = "log")]
                log::warn!("tuid: entropy counter wrapped around within a single tick");
            }
            self.entropy = entropy;
        } else {
            self.seconds = seconds;
            self.nanos = nanos;
            self.rng.fill_bytes(&mut self.entropy);
        }

        Tuid::from_parts(self.seconds, self.nanos, self.entropy)
    }

    /// Generates `count` TUID objects in the order of generation.
    pub fn generate(&mut self, count: usize) -> Vec<Tuid> {
        (0..count).map(|_| self.next_unique()).collect()
    }
}

/// Increments a 48-bit big-endian counter, returning the new value and whether it wrapped around.
const fn increment(counter: [u8; 6]) -> ([u8; 6], bool) {
    const MAX_COUNTER: u64 = (1 << 48) - 1;

    let [a, b, c, d, e, f] = counter;
    let n = u64::from_be_bytes([0, 0, a, b, c, d, e, f]);
    let next = n.wrapping_add(1) & MAX_COUNTER;
    let [_, _, a, b, c, d, e, f] = next.to_be_bytes();
    ([a, b, c, d, e, f], n == MAX_COUNTER)
}

/// Supports operations as an infinite iterator that produces a new TUID object for each call of
/// `next()`.
///
/// # Examples
///
/// ```rust
/// use tuid::TuidGenerator;
///
/// TuidGenerator::with_rand08(rand::thread_rng())
///     .enumerate()
///     .skip(4)
///     .take(4)
///     .for_each(|(i, e)| println!("[{}] {}", i, e));
/// ```
impl<R: RandSource, T: TimeSource> Iterator for TuidGenerator<R, T> {
    type Item = Tuid;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_unique())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: RandSource, T: TimeSource> std::iter::FusedIterator for TuidGenerator<R, T> {}
