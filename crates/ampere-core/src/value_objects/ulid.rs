//! ULID - 128-bit lexicographically sortable unique identifier
//!
//! Structure:
//! - Bits 127-80: Timestamp (milliseconds since Unix epoch, 48 bits)
//! - Bits 79-0:   Randomness (80 bits)
//!
//! Canonical text form is 26 characters of Crockford base32
//! (alphabet `0-9A-Z` excluding `I`, `L`, `O`, `U`), which sorts the same
//! way as the numeric value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// Crockford base32 alphabet used by the canonical text form
const ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of the canonical text form
const TEXT_LEN: usize = 26;

/// Mask covering the 80 random bits
const RANDOM_MASK: u128 = (1 << 80) - 1;

/// 128-bit ULID identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Ulid(u128);

impl Ulid {
    /// The all-zero identifier, used by the protocol as the system author sentinel
    pub const ZERO: Ulid = Ulid(0);

    /// Create a Ulid from a raw u128 value
    #[inline]
    pub const fn from_u128(value: u128) -> Self {
        Self(value)
    }

    /// Get the inner u128 value
    #[inline]
    pub const fn into_inner(self) -> u128 {
        self.0
    }

    /// Check if this is the all-zero sentinel
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Extract the timestamp (milliseconds since Unix epoch)
    #[inline]
    pub const fn timestamp_ms(&self) -> u64 {
        (self.0 >> 80) as u64
    }

    /// Extract the 80 random bits
    #[inline]
    pub const fn random(&self) -> u128 {
        self.0 & RANDOM_MASK
    }

    /// Convert the embedded timestamp to DateTime<Utc>
    pub fn created_at(&self) -> chrono::DateTime<chrono::Utc> {
        use chrono::{TimeZone, Utc};
        Utc.timestamp_millis_opt(self.timestamp_ms() as i64)
            .single()
            .unwrap_or_default()
    }

    /// Parse from the canonical 26-character text form
    pub fn parse(s: &str) -> Result<Self, UlidDecodeError> {
        let bytes = s.as_bytes();
        if bytes.len() != TEXT_LEN {
            return Err(UlidDecodeError::InvalidLength(bytes.len()));
        }
        // 26 * 5 = 130 bits; the top character may only carry 3 bits
        if decode_char(bytes[0])? > 7 {
            return Err(UlidDecodeError::Overflow);
        }
        let mut value: u128 = 0;
        for &b in bytes {
            value = (value << 5) | u128::from(decode_char(b)?);
        }
        Ok(Self(value))
    }

    /// Encode into the canonical 26-character text form
    pub fn encode(&self) -> String {
        let mut buf = [0u8; TEXT_LEN];
        let mut value = self.0;
        for slot in buf.iter_mut().rev() {
            *slot = ALPHABET[(value & 0x1F) as usize];
            value >>= 5;
        }
        buf.iter().map(|&b| b as char).collect()
    }
}

/// Decode a single Crockford base32 character (case-insensitive)
fn decode_char(c: u8) -> Result<u8, UlidDecodeError> {
    let c = c.to_ascii_uppercase();
    match c {
        b'0'..=b'9' => Ok(c - b'0'),
        b'A'..=b'H' => Ok(c - b'A' + 10),
        b'J' | b'K' => Ok(c - b'J' + 18),
        b'M' | b'N' => Ok(c - b'M' + 20),
        b'P'..=b'T' => Ok(c - b'P' + 22),
        b'V'..=b'Z' => Ok(c - b'V' + 27),
        _ => Err(UlidDecodeError::InvalidCharacter(c as char)),
    }
}

/// Error when decoding a Ulid from its text form
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UlidDecodeError {
    #[error("invalid ULID length {0}, expected 26")]
    InvalidLength(usize),

    #[error("invalid ULID character {0:?}")]
    InvalidCharacter(char),

    #[error("ULID value overflows 128 bits")]
    Overflow,
}

impl fmt::Display for Ulid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl From<u128> for Ulid {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Ulid> for u128 {
    fn from(id: Ulid) -> Self {
        id.0
    }
}

impl From<Ulid> for String {
    fn from(id: Ulid) -> Self {
        id.encode()
    }
}

impl std::str::FromStr for Ulid {
    type Err = UlidDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::parse(s)
    }
}

// Serialize as the canonical text form (the wire always carries strings)
impl Serialize for Ulid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for Ulid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct UlidVisitor;

        impl<'de> Visitor<'de> for UlidVisitor {
            type Value = Ulid;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a 26 character ULID string")
            }

            fn visit_str<E>(self, value: &str) -> Result<Ulid, E>
            where
                E: de::Error,
            {
                Ulid::parse(value).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(UlidVisitor)
    }
}

/// Thread-safe ULID generator
///
/// Identifiers minted within the same millisecond are made strictly
/// increasing by incrementing the random component.
pub struct UlidGenerator {
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    last_timestamp: u64,
    last_random: u128,
}

impl UlidGenerator {
    /// Create a new generator
    pub fn new() -> Self {
        Self {
            state: Mutex::new(GeneratorState {
                last_timestamp: 0,
                last_random: 0,
            }),
        }
    }

    /// Generate a new unique, monotonically increasing Ulid
    pub fn generate(&self) -> Ulid {
        let mut timestamp = current_timestamp();
        let mut state = self.state.lock();

        if timestamp <= state.last_timestamp {
            timestamp = state.last_timestamp;
            let next = (state.last_random + 1) & RANDOM_MASK;
            if next == 0 {
                // Random component exhausted within this millisecond
                timestamp += 1;
                state.last_random = fresh_random();
            } else {
                state.last_random = next;
            }
        } else {
            state.last_random = fresh_random();
        }

        state.last_timestamp = timestamp;
        Ulid::from_u128((u128::from(timestamp) << 80) | state.last_random)
    }
}

impl Default for UlidGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Current timestamp in milliseconds since Unix epoch
#[inline]
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Fresh 80-bit randomness
#[inline]
fn fresh_random() -> u128 {
    rand::random::<u128>() & RANDOM_MASK
}
