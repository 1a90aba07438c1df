use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{cmp, fmt, str};

use chrono::{DateTime, Local, Utc};
use fstr::FStr;

use crate::codec;
use crate::entropy::RandSource;
use crate::tick::{StdSystemTime, TimeSource, ToTick};

/// Buffer offsets of the bytes in the order they appear in the canonical string representation.
///
/// The `seconds` field comes first and the `nanos` field second so that the string representations
/// sort in the same order as the TUIDs themselves.
const TEXT_ORDER: [usize; 16] = [4, 5, 6, 7, 8, 9, 0, 1, 2, 3, 10, 11, 12, 13, 14, 15];

/// Returns true if a dash precedes the `i`-th byte in the canonical string representation.
const fn has_dash_before(i: usize) -> bool {
    i == 4 || i == 6 || i == 8 || i == 10
}

/// Represents a Timestamp-based Unique IDentifier.
///
/// A TUID is an immutable 16-byte value that consists of a 32-bit `nanos` field, a 48-bit
/// `seconds` field, and a 48-bit `entropy` field laid out as described in the [`codec`] module.
/// The decoded `seconds` and `nanos` values are cached in the object upon construction.
///
/// TUIDs are ordered by `seconds`, then by `nanos`, then by the canonical string representation,
/// which gives the same result as comparing the canonical strings as a whole. Note that this order
/// is different from the lexicographic order of the underlying byte arrays.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub struct Tuid {
    bytes: [u8; 16],
    seconds: i64,
    nanos: u32,
}

impl Tuid {
    /// Nil TUID (00000000-0000-0000-0000-000000000000)
    pub const NIL: Self = Self::from_bytes([0x00; 16]);

    /// Max TUID (ffffffff-ffff-ffff-ffff-ffffffffffff)
    pub const MAX: Self = Self::from_bytes([0xff; 16]);

    /// Creates an object from a 16-byte buffer.
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        let (seconds, nanos) = codec::decode(&bytes);
        Self {
            bytes,
            seconds,
            nanos,
        }
    }

    /// Creates an object from field values.
    ///
    /// Only the lower 48 bits of `seconds` are retained; see the [`codec`] module for the details.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::Tuid;
    ///
    /// let x = Tuid::from_parts(9223372036, 729262400, [0x79, 0xf6, 0x59, 0xcc, 0xb6, 0x85]);
    /// assert_eq!(x.timestamp(), (9223372036, 729262400));
    /// assert_eq!(x.to_string(), "000225c1-7d04-2b77-a940-79f659ccb685");
    /// ```
    pub const fn from_parts(seconds: i64, nanos: u32, entropy: [u8; 6]) -> Self {
        Self::from_bytes(codec::encode(seconds, nanos, entropy))
    }

    /// Creates an object from field values, truncating `entropy` to six bytes or padding it with
    /// zeros if shorter.
    pub fn with_entropy_bytes(seconds: i64, nanos: u32, entropy: &[u8]) -> Self {
        Self::from_parts(seconds, nanos, codec::pad_entropy(entropy))
    }

    /// Creates an object from field values, taking the entropy field from a hexadecimal string.
    ///
    /// Only the first 12 digits are used; a shorter string is padded with zeros on the right.
    ///
    /// # Errors
    ///
    /// Returns an error if `entropy` contains a character other than hexadecimal digits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::Tuid;
    ///
    /// let x = Tuid::with_entropy_hex(9223372036, 729262400, "79f659ccb685")?;
    /// assert!(x.to_string().ends_with("-79f659ccb685"));
    ///
    /// let y = Tuid::with_entropy_hex(9223372036, 729262400, "79F6")?;
    /// assert_eq!(y.entropy(), [0x79, 0xf6, 0, 0, 0, 0]);
    ///
    /// assert!(Tuid::with_entropy_hex(9223372036, 729262400, "79f659ccb68z").is_err());
    /// # Ok::<(), tuid::FormatError>(())
    /// ```
    pub fn with_entropy_hex(seconds: i64, nanos: u32, entropy: &str) -> Result<Self, FormatError> {
        let mut dst = [0u8; 6];
        for (i, c) in entropy.bytes().enumerate() {
            let digit = decode_digit(c).ok_or(FormatError::invalid_digit(i))?;
            if let Some(e) = dst.get_mut(i / 2) {
                *e |= if i % 2 == 0 { digit << 4 } else { digit };
            }
        }
        Ok(Self::from_parts(seconds, nanos, dst))
    }

    /// Creates an object from `seconds` and `nanos`, filling the entropy field with random bytes
    /// taken from `rng`.
    pub fn from_parts_with_rng(seconds: i64, nanos: u32, rng: &mut impl RandSource) -> Self {
        let mut entropy = [0u8; 6];
        rng.fill_bytes(&mut entropy);
        Self::from_parts(seconds, nanos, entropy)
    }

    /// Creates an object from a timestamp value and an entropy field.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use chrono::{DateTime, Utc};
    /// use tuid::Tuid;
    ///
    /// let dt = DateTime::<Utc>::from_timestamp(1_700_000_000, 123_456_789).unwrap();
    /// let x = Tuid::from_tick_with_entropy(&dt, [0; 6]);
    /// assert_eq!(x.timestamp(), (1_700_000_000, 123_456_789));
    /// assert_eq!(x.to_datetime_utc(), Some(dt));
    /// ```
    pub fn from_tick_with_entropy(timestamp: &impl ToTick, entropy: [u8; 6]) -> Self {
        let (seconds, nanos) = timestamp.to_tick();
        Self::from_parts(seconds, nanos, entropy)
    }

    /// Creates an object from a timestamp value, filling the entropy field with random bytes taken
    /// from `rng`.
    pub fn from_tick_with_rng(timestamp: &impl ToTick, rng: &mut impl RandSource) -> Self {
        let (seconds, nanos) = timestamp.to_tick();
        Self::from_parts_with_rng(seconds, nanos, rng)
    }

    /// Creates an object from the current system time and an entropy field.
    pub fn now_with_entropy(entropy: [u8; 6]) -> Self {
        let (seconds, nanos) = StdSystemTime.now();
        Self::from_parts(seconds, nanos, entropy)
    }

    /// Returns a reference to the underlying byte array.
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Returns the `seconds` field value.
    pub const fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Returns the `nanos` field value.
    pub const fn nanos(&self) -> u32 {
        self.nanos
    }

    /// Returns the `(seconds, nanos)` pair.
    pub const fn timestamp(&self) -> (i64, u32) {
        (self.seconds, self.nanos)
    }

    /// Returns the `entropy` field value.
    pub const fn entropy(&self) -> [u8; 6] {
        codec::entropy(&self.bytes)
    }

    /// Returns the timestamp as a UTC date and time, or `None` if `nanos` is out of range.
    pub fn to_datetime_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds, self.nanos)
    }

    /// Returns the timestamp as a date and time in the local time zone, or `None` if `nanos` is out
    /// of range.
    pub fn to_datetime_local(&self) -> Option<DateTime<Local>> {
        self.to_datetime_utc().map(|dt| dt.with_timezone(&Local))
    }

    /// Returns the timestamp as a [`SystemTime`], or `None` if it is not representable on the
    /// platform.
    pub fn to_system_time(&self) -> Option<SystemTime> {
        // `seconds` is always decoded as a non-negative 48-bit integer
        UNIX_EPOCH.checked_add(Duration::new(self.seconds as u64, self.nanos))
    }

    /// Returns the 8-4-4-4-12 hexadecimal string representation stored in a stack-allocated string
    /// type.
    ///
    /// The groups consist of the upper and lower parts of the `seconds` field, the upper and lower
    /// halves of the `nanos` field, and the `entropy` field, in this order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use tuid::Tuid;
    ///
    /// let x = "000225c1-7d04-2b77-a940-79f659ccb685".parse::<Tuid>()?;
    /// let y = x.encode();
    /// assert_eq!(y, "000225c1-7d04-2b77-a940-79f659ccb685");
    /// assert_eq!(format!("{}", y), "000225c1-7d04-2b77-a940-79f659ccb685");
    /// # Ok::<(), tuid::FormatError>(())
    /// ```
    pub fn encode(&self) -> FStr<36> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";

        let mut buffer = [0u8; 36];
        let mut pos = 0;
        for (i, &offset) in TEXT_ORDER.iter().enumerate() {
            if has_dash_before(i) {
                buffer[pos] = b'-';
                pos += 1;
            }
            let e = self.bytes[offset] as usize;
            buffer[pos] = DIGITS[e >> 4];
            buffer[pos + 1] = DIGITS[e & 15];
            pos += 2;
        }
        debug_assert!(buffer.is_ascii());
        // SAFETY: the buffer consists of ASCII characters only
        unsafe { FStr::from_inner_unchecked(buffer) }
    }
}

impl Ord for Tuid {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        // when timestamps tie, the canonical strings differ only in the trailing entropy group,
        // whose lowercase hex digits sort in the same order as the bytes
        self.seconds
            .cmp(&other.seconds)
            .then(self.nanos.cmp(&other.nanos))
            .then_with(|| self.bytes[10..].cmp(&other.bytes[10..]))
    }
}

impl PartialOrd for Tuid {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Tuid {
    /// Returns the 8-4-4-4-12 canonical hexadecimal string representation.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.encode().as_str(), f)
    }
}

impl str::FromStr for Tuid {
    type Err = FormatError;

    /// Creates an object from the 8-4-4-4-12 hexadecimal string representation.
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let src = src.as_bytes();
        if src.len() != 36 {
            return Err(FormatError::invalid_length(src.len()));
        }

        let mut dst = [0u8; 16];
        let mut pos = 0;
        for (i, &offset) in TEXT_ORDER.iter().enumerate() {
            if has_dash_before(i) {
                if src[pos] != b'-' {
                    return Err(FormatError::invalid_separator(pos));
                }
                pos += 1;
            }
            let hi = decode_digit(src[pos]).ok_or(FormatError::invalid_digit(pos))?;
            let lo = decode_digit(src[pos + 1]).ok_or(FormatError::invalid_digit(pos + 1))?;
            dst[offset] = (hi << 4) | lo;
            pos += 2;
        }
        Ok(Self::from_bytes(dst))
    }
}

/// Decodes an ASCII hexadecimal digit in either case.
const fn decode_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl From<Tuid> for [u8; 16] {
    fn from(src: Tuid) -> Self {
        src.bytes
    }
}

impl From<[u8; 16]> for Tuid {
    fn from(src: [u8; 16]) -> Self {
        Self::from_bytes(src)
    }
}

impl TryFrom<&[u8]> for Tuid {
    type Error = FormatError;

    /// Creates an object from a byte slice of exactly 16 bytes.
    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        <[u8; 16]>::try_from(src)
            .map(Self::from_bytes)
            .map_err(|_| FormatError::invalid_length(src.len()))
    }
}

impl AsRef<[u8]> for Tuid {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl From<Tuid> for u128 {
    fn from(src: Tuid) -> Self {
        Self::from_be_bytes(src.bytes)
    }
}

impl From<u128> for Tuid {
    fn from(src: u128) -> Self {
        Self::from_bytes(src.to_be_bytes())
    }
}

impl From<Tuid> for String {
    fn from(src: Tuid) -> Self {
        src.to_string()
    }
}

impl TryFrom<String> for Tuid {
    type Error = FormatError;

    fn try_from(src: String) -> Result<Self, Self::Error> {
        src.parse()
    }
}

/// Error parsing an invalid textual or binary representation of TUID.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct FormatError {
    kind: ErrorKind,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
enum ErrorKind {
    InvalidLength { n_units: usize },
    InvalidDigit { pos: usize },
    InvalidSeparator { pos: usize },
}

impl FormatError {
    const fn invalid_length(n_units: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidLength { n_units },
        }
    }

    const fn invalid_digit(pos: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidDigit { pos },
        }
    }

    const fn invalid_separator(pos: usize) -> Self {
        Self {
            kind: ErrorKind::InvalidSeparator { pos },
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse TUID: ")?;
        match self.kind {
            ErrorKind::InvalidLength { n_units } => {
                write!(f, "invalid length: {} bytes (expected 36)", n_units)
            }
            ErrorKind::InvalidDigit { pos } => {
                write!(f, "invalid digit at {}", pos)
            }
            ErrorKind::InvalidSeparator { pos } => {
                write!(f, "invalid separator at {}", pos)
            }
        }
    }
}

impl std::error::Error for FormatError {}

#[cfg(feature = "global_gen")]
#[cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]
mod global_gen_ext {
    use super::Tuid;
    use crate::tick::{StdSystemTime, TimeSource, ToTick};

    impl Tuid {
        /// Creates an object from `seconds` and `nanos`, filling the entropy field with random
        /// bytes drawn from the global entropy source.
        pub fn from_timestamp(seconds: i64, nanos: u32) -> Self {
            let mut entropy = [0u8; 6];
            crate::global_gen::fill_bytes(&mut entropy);
            Self::from_parts(seconds, nanos, entropy)
        }

        /// Creates an object from a timestamp value, filling the entropy field with random bytes
        /// drawn from the global entropy source.
        pub fn from_tick(timestamp: &impl ToTick) -> Self {
            let (seconds, nanos) = timestamp.to_tick();
            Self::from_timestamp(seconds, nanos)
        }

        /// Creates an object from the current system time, filling the entropy field with random
        /// bytes drawn from the global entropy source.
        ///
        /// Unlike [`unique`](crate::unique), this function does not guarantee the monotonic order
        /// of TUIDs created within the same clock tick.
        pub fn now() -> Self {
            let (seconds, nanos) = StdSystemTime.now();
            Self::from_timestamp(seconds, nanos)
        }
    }
}

#[cfg(feature = "uuid")]
#[cfg_attr(docsrs, doc(cfg(feature = "uuid")))]
mod uuid_support {
    //! Conversions between [`Tuid`] and [`uuid::Uuid`] copy the 16-byte buffer as is; the
    //! resulting `uuid::Uuid` carries no meaningful version or variant bits.

    use super::Tuid;

    impl From<Tuid> for uuid::Uuid {
        fn from(src: Tuid) -> Self {
            uuid::Uuid::from_bytes(src.bytes)
        }
    }

    impl From<uuid::Uuid> for Tuid {
        fn from(src: uuid::Uuid) -> Self {
            Self::from_bytes(src.into_bytes())
        }
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
mod serde_support {
    use super::{fmt, Tuid};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for Tuid {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if serializer.is_human_readable() {
                serializer.serialize_str(&self.encode())
            } else {
                serializer.serialize_bytes(self.as_bytes())
            }
        }
    }

    impl<'de> serde::Deserialize<'de> for Tuid {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            if deserializer.is_human_readable() {
                deserializer.deserialize_str(VisitorImpl)
            } else {
                deserializer.deserialize_bytes(VisitorImpl)
            }
        }
    }

    struct VisitorImpl;

    impl<'de> de::Visitor<'de> for VisitorImpl {
        type Value = Tuid;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a TUID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            value.parse::<Self::Value>().map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            Self::Value::try_from(value).map_err(de::Error::custom)
        }
    }

}
