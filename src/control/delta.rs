use std::fmt;

use chrono::TimeDelta;

use super::DirectiveError;

/// A non-negative number of seconds (RFC 7234 §1.2.1), or unset.
///
/// Stored as an `i32` with `-1` meaning "unset". Values beyond `i32::MAX`
/// clamp to `i32::MAX`, as the RFC requires for overflowing delta-seconds.
///
/// # Examples
///
/// ```
/// use httpcache::control::DeltaSeconds;
///
/// assert_eq!(DeltaSeconds::parse("0").unwrap().get(), Some(0));
/// assert_eq!(DeltaSeconds::parse("99999999999").unwrap(), DeltaSeconds::MAX);
/// assert!(DeltaSeconds::parse("-1").is_err());
/// assert!(!DeltaSeconds::default().is_set());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeltaSeconds(i32);

impl DeltaSeconds {
    pub const UNSET: Self = Self(-1);
    pub const MAX: Self = Self(i32::MAX);

    /// Creates a set value, clamping to [`DeltaSeconds::MAX`].
    pub fn from_secs(secs: u32) -> Self {
        Self(i32::try_from(secs).unwrap_or(i32::MAX))
    }

    /// Parses a base-10 delta-seconds value.
    ///
    /// # Errors
    ///
    /// Returns [`DirectiveError::InvalidDeltaSeconds`] for empty, signed, or
    /// non-numeric input.
    pub fn parse(value: &str) -> Result<Self, DirectiveError> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DirectiveError::InvalidDeltaSeconds {
                value: value.to_owned(),
            });
        }

        // All digits: the only possible failure is overflowing u64.
        let n = value.parse::<u64>().unwrap_or(u64::MAX);
        Ok(Self(i32::try_from(n).unwrap_or(i32::MAX)))
    }

    pub fn is_set(self) -> bool {
        self.0 >= 0
    }

    /// Returns the number of seconds, or `None` when unset.
    pub fn get(self) -> Option<u32> {
        u32::try_from(self.0).ok()
    }

    /// Returns the raw representation, `-1` when unset.
    pub fn as_i32(self) -> i32 {
        self.0
    }

    pub fn to_time_delta(self) -> Option<TimeDelta> {
        self.get().map(|secs| TimeDelta::seconds(i64::from(secs)))
    }
}

impl Default for DeltaSeconds {
    fn default() -> Self {
        Self::UNSET
    }
}

impl fmt::Display for DeltaSeconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
