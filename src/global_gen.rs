//! Global entropy source, global generator, and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::entropy::{DefaultRng, RandSource, SharedRandSource};
use crate::Tuid;
use inner::GlobalGenInner;

type GlobalRandInner = SharedRandSource<Box<dyn RandSource + Send>>;

/// Returns the process-wide global entropy source, creating one if none exists.
fn global_rand() -> &'static GlobalRandInner {
    static R: sync::OnceLock<GlobalRandInner> = sync::OnceLock::new();
    R.get_or_init(|| {
        #[cfg(feature = "log")]
        log::debug!("tuid: initialized global entropy source");
        let rng: Box<dyn RandSource + Send> = Box::new(DefaultRng::default());
        SharedRandSource::new(rng)
    })
}

/// Returns the lock handle of process-wide global generator, creating one if none exists.
fn lock_global_gen() -> sync::MutexGuard<'static, GlobalGenInner> {
    static G: sync::OnceLock<sync::Mutex<GlobalGenInner>> = sync::OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .expect("tuid: could not lock global generator")
}

/// Fills `dest` with random bytes drawn from the global entropy source.
pub(crate) fn fill_bytes(dest: &mut [u8]) {
    global_rand().fill_bytes(dest)
}

/// Returns `n` random bytes drawn from the global entropy source.
///
/// This function is thread-safe; concurrent calls are serialized by a lock held only while the
/// bytes are being produced.
pub fn random_bytes(n: usize) -> Vec<u8> {
    global_rand().random_bytes(n)
}

/// Replaces the global entropy source used by [`unique`], [`generate`], and the constructors of
/// [`Tuid`] that draw random bytes implicitly.
///
/// The global entropy source defaults to [`DefaultRng`], which is fast but not meant to produce
/// secret values. Replace it, for example, with the operating system's random number generator to
/// obtain cryptographically strong entropy fields.
///
/// # Examples
///
/// ```rust
/// use tuid::entropy::{with_rand08::Adapter, DefaultRng};
///
/// tuid::set_rand_source(Adapter(rand::rngs::OsRng));
/// println!("{}", tuid::unique());
///
/// tuid::set_rand_source(DefaultRng::default());
/// ```
pub fn set_rand_source(rng: impl RandSource + Send + 'static) {
    global_rand().replace(Box::new(rng));
}

/// Generates a new TUID object using the global generator.
///
/// This function is thread-safe; multiple threads in a process can call it concurrently without
/// producing duplicate TUIDs or breaking the monotonic order within a clock tick. On Unix, this
/// function resets the generator state when the process ID changes (i.e., upon process forks).
///
/// # Examples
///
/// ```rust
/// let x = tuid::unique();
/// println!("{}", x); // e.g., "6553f100-0000-075b-cd15-0123456789ab"
/// println!("{:?}", x.as_bytes()); // as 16-byte array
/// ```
pub fn unique() -> Tuid {
    lock_global_gen().get_mut().next_unique()
}

/// Generates a new TUID encoded in the canonical string representation using the global
/// generator.
///
/// # Examples
///
/// ```rust
/// let x = tuid::unique_string();
///
/// let pattern = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
/// assert!(regex::Regex::new(pattern).unwrap().is_match(&x));
/// ```
pub fn unique_string() -> String {
    unique().into()
}

/// Generates `count` TUID objects in the order of generation using the global generator.
///
/// The global generator is locked for each TUID rather than for the whole batch, so TUIDs
/// generated concurrently by other threads may interleave with the returned ones.
pub fn generate(count: usize) -> Vec<Tuid> {
    (0..count).map(|_| unique()).collect()
}

/// A [`RandSource`] handle that draws from the global entropy source.
#[derive(Clone, Copy, Debug, Default)]
struct GlobalRand;

impl RandSource for GlobalRand {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        fill_bytes(dest)
    }
}

mod inner {
    use super::GlobalRand;
    use crate::TuidGenerator;

    /// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub(super) struct GlobalGenInner {
        #[cfg(unix)]
        pid: u32,
        generator: TuidGenerator<GlobalRand>,
    }

    impl Default for GlobalGenInner {
        fn default() -> Self {
            #[cfg(feature = "log")]
            log::debug!("tuid: initialized global generator");
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                generator: TuidGenerator::new(GlobalRand),
            }
        }
    }

    impl GlobalGenInner {
        /// Returns a mutable reference to the inner [`TuidGenerator`] instance, resetting the
        /// generator state on Unix if the process ID has changed.
        pub(super) fn get_mut(&mut self) -> &mut TuidGenerator<GlobalRand> {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                #[cfg(feature = "log")]
                log::debug!("tuid: reset global generator upon process ID change");
                *self = Default::default();
            }
            &mut self.generator
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{generate, random_bytes, unique};
    use crate::Tuid;

    const N_SAMPLES: usize = 100_000;
    thread_local!(static SAMPLES: Vec<String> = (0..N_SAMPLES).map(|_| unique().into()).collect());

    /// Generates canonical string
    #[test]
    fn generates_canonical_string() {
        let pattern = r"^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$";
        let re = regex::Regex::new(pattern).unwrap();
        SAMPLES.with(|samples| {
            for e in samples {
                assert!(re.is_match(e));
            }
        });
    }

    /// Generates 100k identifiers without collision
    #[test]
    fn generates_100k_identifiers_without_collision() {
        use std::collections::HashSet;
        SAMPLES.with(|samples| {
            let s: HashSet<&String> = samples.iter().collect();
            assert_eq!(s.len(), N_SAMPLES);
        });
    }

    /// Generates sortable string representation by creation time
    #[test]
    fn generates_sortable_string_representation_by_creation_time() {
        SAMPLES.with(|samples| {
            for i in 1..N_SAMPLES {
                assert!(samples[i - 1] < samples[i]);
            }
        });
    }

    /// Round-trips generated strings
    #[test]
    fn round_trips_generated_strings() {
        SAMPLES.with(|samples| {
            for e in samples.iter().take(10_000) {
                let x: Tuid = e.parse().unwrap();
                assert_eq!(&x.to_string(), e);
            }
        });
    }

    /// Encodes up-to-date timestamp
    #[test]
    fn encodes_up_to_date_timestamp() {
        use std::time;
        for _ in 0..10_000 {
            let ts_now = time::SystemTime::now()
                .duration_since(time::UNIX_EPOCH)
                .expect("clock may have gone backwards")
                .as_millis() as i64;
            let (seconds, nanos) = unique().timestamp();
            let timestamp = seconds * 1_000 + (nanos / 1_000_000) as i64;
            assert!((ts_now - timestamp).abs() < 16);
        }
    }

    /// Returns requested number of TUIDs in ascending order
    #[test]
    fn returns_requested_number_of_tuids_in_ascending_order() {
        let xs = generate(10_000);
        assert_eq!(xs.len(), 10_000);
        for i in 1..xs.len() {
            assert!(xs[i - 1] < xs[i]);
        }
    }

    /// Generates no duplicate TUIDs under multithreading
    #[test]
    fn generates_no_duplicate_tuids_under_multithreading(
    ) -> Result<(), Box<dyn std::error::Error>> {
        use std::{collections::HashSet, sync::mpsc, thread};

        let (tx, rx) = mpsc::channel();
        for _ in 0..4 {
            let tx = tx.clone();
            thread::Builder::new()
                .spawn(move || {
                    for _ in 0..10_000 {
                        tx.send(unique()).unwrap();
                    }
                })
                .map_err(|err| format!("failed to spawn thread: {:?}", err))?;
        }
        drop(tx);

        let mut s = HashSet::new();
        while let Ok(e) = rx.recv() {
            s.insert(e);
        }

        assert_eq!(s.len(), 4 * 10_000);
        Ok(())
    }

    /// Draws uncorrupted random bytes under multithreading
    #[test]
    fn draws_uncorrupted_random_bytes_under_multithreading() {
        use std::{collections::HashSet, thread};

        let draws: Vec<Vec<u8>> = thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| (0..1_000).map(|_| random_bytes(16)).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        assert!(draws.iter().all(|e| e.len() == 16));
        assert!(draws.iter().all(|e| e.iter().any(|&b| b != 0)));
        let s: HashSet<&Vec<u8>> = draws.iter().collect();
        assert_eq!(s.len(), draws.len());
    }

    /// Keeps generating unique TUIDs after entropy source is replaced
    #[test]
    fn keeps_generating_unique_tuids_after_entropy_source_is_replaced() {
        use crate::entropy::{with_rand08::Adapter, DefaultRng};
        use std::collections::HashSet;

        super::set_rand_source(Adapter(rand::rngs::OsRng));
        let mut xs = generate(1_000);
        super::set_rand_source(DefaultRng::default());
        xs.extend(generate(1_000));

        let s: HashSet<Tuid> = xs.iter().copied().collect();
        assert_eq!(s.len(), xs.len());
    }
}
