//! Random byte sources used to fill the entropy field.

use std::sync::Mutex;

#[cfg(feature = "default_rng")]
mod default_rng;
#[cfg(feature = "default_rng")]
#[cfg_attr(docsrs, doc(cfg(feature = "default_rng")))]
pub use default_rng::DefaultRng;

pub mod with_rand08;

/// A trait that defines the minimum random number generator interface for TUID construction.
///
/// Implementations need not be safe for concurrent use; wrap one in a [`SharedRandSource`] to share
/// it across threads.
pub trait RandSource {
    /// Fills `dest` with random data.
    fn fill_bytes(&mut self, dest: &mut [u8]);

    /// Returns `n` random bytes.
    fn random_bytes(&mut self, n: usize) -> Vec<u8> {
        let mut buffer = vec![0u8; n];
        self.fill_bytes(&mut buffer);
        buffer
    }
}

impl<R: RandSource + ?Sized> RandSource for &mut R {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        (**self).fill_bytes(dest)
    }
}

impl<R: RandSource + ?Sized> RandSource for Box<R> {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        (**self).fill_bytes(dest)
    }
}

/// A [`RandSource`] shared across threads under a single lock.
///
/// The lock is held only while the inner source produces bytes.
///
/// # Examples
///
/// ```rust
/// use std::thread;
/// use tuid::entropy::{with_rand08::Adapter, SharedRandSource};
///
/// let source = SharedRandSource::new(Adapter(rand::rngs::OsRng));
/// thread::scope(|s| {
///     for _ in 0..4 {
///         s.spawn(|| assert_eq!(source.random_bytes(6).len(), 6));
///     }
/// });
/// ```
#[derive(Debug, Default)]
pub struct SharedRandSource<R> {
    inner: Mutex<R>,
}

impl<R: RandSource> SharedRandSource<R> {
    /// Wraps a random number generator.
    pub const fn new(rng: R) -> Self {
        Self {
            inner: Mutex::new(rng),
        }
    }

    /// Swaps the inner source with `rng`, returning the previous one.
    pub fn replace(&self, rng: R) -> R {
        std::mem::replace(&mut *self.lock(), rng)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, R> {
        self.inner
            .lock()
            .expect("tuid: could not lock entropy source")
    }

    /// Fills `dest` with random data.
    pub fn fill_bytes(&self, dest: &mut [u8]) {
        self.lock().fill_bytes(dest)
    }

    /// Returns `n` random bytes.
    pub fn random_bytes(&self, n: usize) -> Vec<u8> {
        let mut buffer = vec![0u8; n];
        self.fill_bytes(&mut buffer);
        buffer
    }
}

impl<R: RandSource> RandSource for &SharedRandSource<R> {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        SharedRandSource::fill_bytes(*self, dest)
    }
}

#[cfg(test)]
mod tests {
    use super::{RandSource, SharedRandSource};

    /// Counter-based source that panics if entered concurrently
    #[derive(Default)]
    struct ExclusiveCounter {
        busy: bool,
        count: u64,
    }

    impl RandSource for ExclusiveCounter {
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            assert!(!self.busy, "entered concurrently");
            self.busy = true;
            for e in dest.chunks_mut(8) {
                self.count += 1;
                let len = e.len();
                e.copy_from_slice(&self.count.to_be_bytes()[8 - len..]);
                std::thread::yield_now();
            }
            self.busy = false;
        }
    }

    /// Returns requested number of bytes
    #[test]
    fn returns_requested_number_of_bytes() {
        let mut rng = ExclusiveCounter::default();
        for n in [0, 1, 6, 8, 9, 100] {
            assert_eq!(rng.random_bytes(n).len(), n);
        }

        let shared = SharedRandSource::new(ExclusiveCounter::default());
        for n in [0, 1, 6, 8, 9, 100] {
            assert_eq!(shared.random_bytes(n).len(), n);
        }
    }

    /// Serializes concurrent draws without corrupting inner state
    #[test]
    fn serializes_concurrent_draws_without_corrupting_inner_state() {
        use std::collections::HashSet;

        const N_THREADS: usize = 8;
        const N_DRAWS: usize = 1_000;

        let shared = &SharedRandSource::new(ExclusiveCounter::default());
        let draws: Vec<Vec<u8>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..N_THREADS)
                .map(|_| {
                    s.spawn(move || {
                        (0..N_DRAWS)
                            .map(|_| shared.random_bytes(6))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert!(draws.iter().all(|e| e.iter().any(|&b| b != 0)));
        let s: HashSet<&Vec<u8>> = draws.iter().collect();
        assert_eq!(s.len(), N_THREADS * N_DRAWS);
    }

    /// Swaps inner source in place
    #[test]
    fn swaps_inner_source_in_place() {
        let shared = SharedRandSource::new(ExclusiveCounter::default());
        shared.random_bytes(16);
        let prev = shared.replace(ExclusiveCounter::default());
        assert_eq!(prev.count, 2);
        assert_eq!(shared.random_bytes(8), 1u64.to_be_bytes());
    }

    /// Serves as random source through shared reference
    #[test]
    fn serves_as_random_source_through_shared_reference() {
        let shared = SharedRandSource::new(ExclusiveCounter::default());
        let mut handle = &shared;
        assert_eq!(RandSource::random_bytes(&mut handle, 8), 1u64.to_be_bytes());
        assert_eq!(shared.random_bytes(8), 2u64.to_be_bytes());
    }
}
