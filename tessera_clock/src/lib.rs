//! Utilities for messing with time
//!
//! Types included allow messing with and mocking out clocks and other
//! side-effect-laden time operations. Timestamps are kept to the
//! microsecond so that sub-second claim values survive a round trip
//! through their numeric encoding.

#![warn(
    missing_docs,
    unused_import_braces,
    unused_imports,
    unused_qualifications
)]
#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unused_must_use
)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::{
    error::Error,
    fmt,
    str::FromStr,
    time::{Duration, SystemTime},
};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const MICROS_PER_SEC: u64 = 1_000_000;

/// Unix time
///
/// Unix time as represented by the time elapsed since the beginning of the
/// Unix epoch on 1970/01/01 at 00:00:00 UTC, held with microsecond
/// precision.
///
/// When serialized, a whole number of seconds is written as an integer.
/// Otherwise the value is written as a decimal number of seconds carrying
/// the microsecond fraction.
///
/// ```
/// use tessera_clock::UnixTime;
///
/// let t = UnixTime::from_micros(1_234_567_890_123_456);
/// assert_eq!(t.as_secs(), 1_234_567_890);
/// assert_eq!(t.subsec_micros(), 123_456);
/// assert_eq!(t.to_string(), "1234567890.123456");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct UnixTime(u64);

impl UnixTime {
    /// The Unix epoch
    pub const EPOCH: Self = Self(0);

    /// Constructs a time from whole seconds since the epoch
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(MICROS_PER_SEC))
    }

    /// Constructs a time from microseconds since the epoch
    #[inline]
    #[must_use]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Whole seconds since the epoch
    #[inline]
    #[must_use]
    pub const fn as_secs(self) -> u64 {
        self.0 / MICROS_PER_SEC
    }

    /// Microseconds since the epoch
    #[inline]
    #[must_use]
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// The fractional part of the second, in microseconds
    #[inline]
    #[must_use]
    pub const fn subsec_micros(self) -> u32 {
        (self.0 % MICROS_PER_SEC) as u32
    }

    /// Whether this time falls exactly on a second boundary
    #[inline]
    #[must_use]
    pub const fn is_whole_second(self) -> bool {
        self.0 % MICROS_PER_SEC == 0
    }

    /// Adds a duration, saturating at the maximum representable time
    #[must_use]
    pub fn saturating_add(self, d: Duration) -> Self {
        Self(self.0.saturating_add(duration_micros(d)))
    }

    /// Subtracts a duration, saturating at the epoch
    #[must_use]
    pub fn saturating_sub(self, d: Duration) -> Self {
        Self(self.0.saturating_sub(duration_micros(d)))
    }

    /// The time as fractional seconds
    ///
    /// The value is produced by parsing the exact decimal rendering, so the
    /// nearest `f64` to the microsecond value is returned.
    #[must_use]
    pub fn as_secs_f64(self) -> f64 {
        self.to_string().parse().unwrap_or(self.as_secs() as f64)
    }

    /// Constructs a time from fractional seconds, rounding to the nearest
    /// microsecond
    ///
    /// Returns `None` for negative, infinite or NaN values.
    #[must_use]
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 || secs >= u64::MAX as f64 / MICROS_PER_SEC as f64 {
            return None;
        }

        let whole = secs.trunc();
        let frac = ((secs - whole) * MICROS_PER_SEC as f64).round() as u64;
        Some(Self(
            (whole as u64)
                .saturating_mul(MICROS_PER_SEC)
                .saturating_add(frac),
        ))
    }
}

fn duration_micros(d: Duration) -> u64 {
    let micros = d.as_micros();
    if micros > u128::from(u64::MAX) {
        u64::MAX
    } else {
        micros as u64
    }
}

impl From<SystemTime> for UnixTime {
    #[inline]
    fn from(t: SystemTime) -> Self {
        let since = t
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default();

        UnixTime(duration_micros(since))
    }
}

impl From<UnixTime> for SystemTime {
    #[inline]
    fn from(t: UnixTime) -> Self {
        SystemTime::UNIX_EPOCH + Duration::from_micros(t.0)
    }
}

impl fmt::Display for UnixTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_whole_second() {
            write!(f, "{}", self.as_secs())
        } else {
            write!(f, "{}.{:06}", self.as_secs(), self.subsec_micros())
        }
    }
}

/// An error while parsing a textual Unix timestamp
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidUnixTime;

impl fmt::Display for InvalidUnixTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("invalid unix timestamp")
    }
}

impl Error for InvalidUnixTime {}

/// Parses `<seconds>[.<fraction>]`
///
/// Fraction digits beyond the microsecond are ignored.
impl FromStr for UnixTime {
    type Err = InvalidUnixTime;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };

        let is_digits = |v: &str| v.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || !is_digits(whole) || !is_digits(frac) {
            return Err(InvalidUnixTime);
        }

        let secs: u64 = whole.parse().map_err(|_| InvalidUnixTime)?;
        let micros = frac
            .bytes()
            .chain(std::iter::repeat(b'0'))
            .take(6)
            .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));

        secs.checked_mul(MICROS_PER_SEC)
            .and_then(|s| s.checked_add(micros))
            .map(Self)
            .ok_or(InvalidUnixTime)
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
/// Fractional times are written through `f64`, which holds every
/// microsecond only up to about 2^33 seconds. Write the `Display` text
/// when later times must survive exactly.
impl Serialize for UnixTime {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.is_whole_second() {
            serializer.serialize_u64(self.as_secs())
        } else {
            serializer.serialize_f64(self.as_secs_f64())
        }
    }
}

#[cfg(feature = "serde")]
struct UnixTimeVisitor;

#[cfg(feature = "serde")]
impl<'de> de::Visitor<'de> for UnixTimeVisitor {
    type Value = UnixTime;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative number of seconds since the Unix epoch")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        v.checked_mul(MICROS_PER_SEC)
            .map(UnixTime)
            .ok_or_else(|| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        if v < 0 {
            return Err(E::invalid_value(de::Unexpected::Signed(v), &self));
        }
        self.visit_u64(v as u64)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        UnixTime::from_secs_f64(v).ok_or_else(|| E::invalid_value(de::Unexpected::Float(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

#[cfg(feature = "serde")]
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
impl<'de> Deserialize<'de> for UnixTime {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UnixTimeVisitor)
    }
}

/// Represents a clock, which can tell the current time
pub trait Clock {
    /// Gets the current time according to this clock
    fn now(&self) -> UnixTime;
}

impl<T: Clock + ?Sized> Clock for &T {
    #[inline]
    fn now(&self) -> UnixTime {
        T::now(self)
    }
}

/// The system clock as provided by `std::time::SystemTime`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct System;

impl Clock for System {
    #[inline]
    fn now(&self) -> UnixTime {
        UnixTime::from(SystemTime::now())
    }
}

/// A test clock which maintains the current time as internal state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TestClock(UnixTime);

impl Clock for TestClock {
    #[inline]
    fn now(&self) -> UnixTime {
        self.0
    }
}

impl TestClock {
    /// Creates a new test clock with the specified time
    #[inline]
    pub const fn new(time: UnixTime) -> Self {
        Self(time)
    }

    /// Updates the clock's current time to `val`
    pub fn set(&mut self, val: UnixTime) {
        self.0 = val;
    }

    /// Moves the clock's current time forward by `inc`
    pub fn advance(&mut self, inc: Duration) {
        self.0 = self.0.saturating_add(inc);
    }
}
