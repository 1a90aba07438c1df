use rand::rngs::{adapter::ReseedingRng, OsRng};
use rand::{RngCore as _, SeedableRng as _};
use rand_chacha::ChaCha8Core;

use super::RandSource;

/// The default random number generator used to fill the entropy field.
///
/// This type currently employs [`ChaCha8Core`] with a [`ReseedingRng`] wrapper that reseeds itself
/// from the operating system every 64 KiB. It favors speed over unpredictability; the resulting
/// entropy field should not be relied upon as a secret. On Unix, the generator also reseeds itself
/// immediately when the process ID changes (i.e., upon process forks).
#[derive(Debug)]
pub struct DefaultRng {
    #[cfg(unix)]
    pid: u32,
    inner: ReseedingRng<ChaCha8Core, OsRng>,
}

impl RandSource for DefaultRng {
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        #[cfg(unix)]
        if self.pid != std::process::id() {
            *self = Default::default();
        }
        self.inner.fill_bytes(dest)
    }
}

impl Default for DefaultRng {
    /// Creates an instance of the default random number generator.
    ///
    /// # Panics
    ///
    /// Panics in the highly unlikely event where the operating system's random number generator
    /// failed to provide entropy.
    fn default() -> Self {
        Self::try_new().expect("tuid: could not initialize DefaultRng")
    }
}

impl DefaultRng {
    /// Creates an instance seeded by the operating system's random number generator.
    pub fn try_new() -> Result<Self, rand::Error> {
        let core = ChaCha8Core::from_rng(OsRng)?;
        Ok(Self {
            #[cfg(unix)]
            pid: std::process::id(),
            inner: ReseedingRng::new(core, 1024 * 64, OsRng),
        })
    }
}
