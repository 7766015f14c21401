//! Frame ordering strategies.
//!
//! The enumerator does not know how the extraction engine numbers its
//! output files. It asks a [`FrameOrdering`] for a [`SortKey`] per file
//! name and sorts by that. [`FirstNumber`], the default, uses the first run
//! of decimal digits in the name, so `frame-2.png` sorts before
//! `frame-10.png`.

use std::cmp::Ordering;

/// A numeric sort key of arbitrary size.
///
/// Stored as a run of decimal digits with leading zeros removed, compared
/// by length first and then digit by digit. Digit runs too long for any
/// integer type still compare correctly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortKey {
    digits: String,
}

impl SortKey {
    /// Build a key from a run of ASCII digits.
    ///
    /// Returns `None` if `digits` is empty or contains anything other than
    /// `0`–`9`.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        let trimmed = digits.trim_start_matches('0');
        Some(Self {
            digits: if trimmed.is_empty() { "0" } else { trimmed }.to_string(),
        })
    }

    /// Build a key from an integer.
    pub fn from_number(number: u64) -> Self {
        Self {
            digits: number.to_string(),
        }
    }

    /// The key as an integer, if it fits in a `u64`.
    pub fn as_u64(&self) -> Option<u64> {
        self.digits.parse().ok()
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.digits
            .len()
            .cmp(&other.digits.len())
            .then_with(|| self.digits.cmp(&other.digits))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Extracts a sort key from a frame's file name.
///
/// Returning `None` means the name carries no usable ordering information;
/// the enumerator treats that as a [`FrameParse`](crate::ShotbitError::FrameParse)
/// failure.
pub trait FrameOrdering: Send + Sync {
    /// The sort key for `file_name` (a base name, not a full path).
    fn sort_key(&self, file_name: &str) -> Option<SortKey>;
}

/// Orders frames by the first run of decimal digits in their name.
///
/// # Example
///
/// ```
/// use shotbit::{FirstNumber, FrameOrdering, SortKey};
///
/// assert_eq!(FirstNumber.sort_key("frame-0007.png"), Some(SortKey::from_number(7)));
/// assert_eq!(FirstNumber.sort_key("cover.png"), None);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstNumber;

impl FrameOrdering for FirstNumber {
    fn sort_key(&self, file_name: &str) -> Option<SortKey> {
        let start = file_name.find(|c: char| c.is_ascii_digit())?;
        let rest = &file_name[start..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        SortKey::from_digits(&rest[..end])
    }
}

impl<F> FrameOrdering for F
where
    F: Fn(&str) -> Option<SortKey> + Send + Sync,
{
    fn sort_key(&self, file_name: &str) -> Option<SortKey> {
        self(file_name)
    }
}
