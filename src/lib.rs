//! TUID: Timestamp-based Unique IDentifier
//!
//! ```rust
//! let x = tuid::unique();
//! println!("{}", x); // e.g., "6553f100-0000-075b-cd15-0123456789ab"
//! println!("{:?}", x.timestamp()); // as (seconds, nanos) since the Unix epoch
//! ```
//!
//! TUID is a 128-bit identifier that embeds a nanosecond-resolution wall-clock timestamp and a
//! 48-bit entropy field. TUIDs sort in the order of the timestamps they carry, and their canonical
//! string representations sort the same way.
//!
//! # Field and bit layout
//!
//! This implementation stores identifiers in the following byte layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             nanos                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            seconds                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            seconds            |            entropy            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            entropy                            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The 32-bit `nanos` field holds the nanoseconds within the second.
//! - The 48-bit `seconds` field holds the lower 48 bits of the Unix timestamp in seconds.
//! - The 48-bit `entropy` field holds random bytes, caller-supplied bytes, or a counter that
//!   ensures the uniqueness of IDs generated within the same `(seconds, nanos)` tick.
//!
//! The canonical string representation lists the `seconds` field first:
//!
//! ```text
//! 000225c1-7d04-2b77-a940-79f659ccb685
//! '-----------' '-------' '----------'
//!    seconds      nanos     entropy
//! ```
//!
//! # Generators
//!
//! [`unique`] and [`generate`] employ a process-wide [`TuidGenerator`]. When called more than once
//! within the same clock tick, the generator increments the previous `entropy` field as a 48-bit
//! counter instead of drawing new random bytes, so that the TUIDs are distinct and ascending. The
//! counter wraps around silently after 2^48 increments within a single tick.
//!
//! [`Tuid::now`] and the other constructors draw fresh random bytes for each call and do not
//! guarantee the monotonic order within a tick.
//!
//! # Crate features
//!
//! Default features:
//!
//! - `global_gen` enables [`unique`], [`generate`], and the other functions backed by the
//!   process-wide generator and entropy source.
//!
//! Optional features:
//!
//! - `default_rng` enables [`entropy::DefaultRng`] without the global generator.
//! - `serde` enables serialization/deserialization of [`Tuid`] via serde.
//! - `uuid` enables byte-wise conversion between [`Tuid`] and `uuid::Uuid`.
//! - `log` emits diagnostic messages through the `log` facade.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod codec;
pub mod entropy;
pub mod tick;

mod id;
pub use id::{FormatError, Tuid};

mod generator;
pub use generator::TuidGenerator;

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{generate, random_bytes, set_rand_source, unique, unique_string};
