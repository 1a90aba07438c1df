//! Binary layout of the 16-byte TUID buffer.
//!
//! ```text
//! offset  0       4                 10                16
//!         +-------+-----------------+-----------------+
//!         | nanos |     seconds     |     entropy     |
//!         +-------+-----------------+-----------------+
//! ```
//!
//! `nanos` is a 32-bit big-endian unsigned integer. `seconds` holds the lower 48 bits of a signed
//! 64-bit count of seconds since the Unix epoch in big-endian order; the upper 16 bits are dropped
//! and always read back as zero. `entropy` is an opaque 6-byte field.

/// The maximum value that the `seconds` field can hold.
pub const MAX_SECONDS: i64 = (1 << 48) - 1;

/// Packs the field values into a 16-byte buffer.
///
/// The field values are not validated. `nanos` is stored as is even if it exceeds one second, and
/// only the lower 48 bits of `seconds` are retained.
///
/// # Examples
///
/// ```rust
/// use tuid::codec;
///
/// let bytes = codec::encode(0x0123_4567_89ab, 42, [0xff; 6]);
/// assert_eq!(bytes[..4], 42u32.to_be_bytes());
/// assert_eq!(bytes[4..10], [0x01, 0x23, 0x45, 0x67, 0x89, 0xab]);
/// assert_eq!(bytes[10..], [0xff; 6]);
/// ```
pub const fn encode(seconds: i64, nanos: u32, entropy: [u8; 6]) -> [u8; 16] {
    let n = nanos.to_be_bytes();
    let s = seconds.to_be_bytes();
    [
        n[0], n[1], n[2], n[3], s[2], s[3], s[4], s[5], s[6], s[7], entropy[0], entropy[1],
        entropy[2], entropy[3], entropy[4], entropy[5],
    ]
}

/// Unpacks `(seconds, nanos)` from a 16-byte buffer.
///
/// `seconds` is zero-extended from the stored 48 bits, so a negative or larger-than-48-bit value
/// passed to [`encode`] is not recovered.
///
/// # Examples
///
/// ```rust
/// use tuid::codec;
///
/// let bytes = codec::encode(9223372036, 729262400, [0; 6]);
/// assert_eq!(codec::decode(&bytes), (9223372036, 729262400));
///
/// let bytes = codec::encode(-1, 0, [0; 6]);
/// assert_eq!(codec::decode(&bytes), (codec::MAX_SECONDS, 0));
/// ```
pub const fn decode(bytes: &[u8; 16]) -> (i64, u32) {
    let nanos = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let seconds = i64::from_be_bytes([
        0, 0, bytes[4], bytes[5], bytes[6], bytes[7], bytes[8], bytes[9],
    ]);
    (seconds, nanos)
}

/// Extracts the 6-byte entropy field from a 16-byte buffer.
pub const fn entropy(bytes: &[u8; 16]) -> [u8; 6] {
    [
        bytes[10], bytes[11], bytes[12], bytes[13], bytes[14], bytes[15],
    ]
}

/// Copies up to six leading bytes of `src` into a zero-filled entropy field.
pub(crate) fn pad_entropy(src: &[u8]) -> [u8; 6] {
    let mut dst = [0u8; 6];
    let len = src.len().min(dst.len());
    dst[..len].copy_from_slice(&src[..len]);
    dst
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, entropy, pad_entropy, MAX_SECONDS};

    /// Returns a collection of prepared cases
    fn prepare_cases() -> &'static [((i64, u32, [u8; 6]), [u8; 16])] {
        &[
            ((0, 0, [0; 6]), [0; 16]),
            (
                (MAX_SECONDS, u32::MAX, [0xff; 6]),
                [0xff; 16],
            ),
            (
                (9223372036, 729262400, [0x79, 0xf6, 0x59, 0xcc, 0xb6, 0x85]),
                [
                    0x2b, 0x77, 0xa9, 0x40, 0x00, 0x02, 0x25, 0xc1, 0x7d, 0x04, 0x79, 0xf6, 0x59,
                    0xcc, 0xb6, 0x85,
                ],
            ),
            (
                (1, 999_999_999, [1, 2, 3, 4, 5, 6]),
                [
                    0x3b, 0x9a, 0xc9, 0xff, 0, 0, 0, 0, 0, 1, 1, 2, 3, 4, 5, 6,
                ],
            ),
        ]
    }

    /// Encodes and decodes prepared cases correctly
    #[test]
    fn encodes_and_decodes_prepared_cases_correctly() {
        for ((seconds, nanos, ent), bytes) in prepare_cases() {
            assert_eq!(&encode(*seconds, *nanos, *ent), bytes);
            assert_eq!(decode(bytes), (*seconds, *nanos));
            assert_eq!(&entropy(bytes), ent);
        }
    }

    /// Discards upper 16 bits of seconds
    #[test]
    fn discards_upper_16_bits_of_seconds() {
        let cases = [
            (-1i64, MAX_SECONDS),
            (i64::MIN, 0),
            (i64::MAX, MAX_SECONDS),
            (0x7fff_0000_0000_0001, 1),
            (MAX_SECONDS + 1, 0),
        ];

        for (input, expected) in cases {
            let bytes = encode(input, 123, [0; 6]);
            assert_eq!(decode(&bytes), (expected, 123));
        }
    }

    /// Stores out-of-range nanoseconds as is
    #[test]
    fn stores_out_of_range_nanoseconds_as_is() {
        let bytes = encode(42, 1_500_000_000, [0; 6]);
        assert_eq!(decode(&bytes), (42, 1_500_000_000));
    }

    /// Truncates or zero-pads entropy bytes
    #[test]
    fn truncates_or_zero_pads_entropy_bytes() {
        assert_eq!(pad_entropy(&[]), [0; 6]);
        assert_eq!(pad_entropy(&[1, 2, 3]), [1, 2, 3, 0, 0, 0]);
        assert_eq!(pad_entropy(&[1, 2, 3, 4, 5, 6]), [1, 2, 3, 4, 5, 6]);
        assert_eq!(pad_entropy(&[1, 2, 3, 4, 5, 6, 7, 8]), [1, 2, 3, 4, 5, 6]);
    }
}
