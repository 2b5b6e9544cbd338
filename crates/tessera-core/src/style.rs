#![forbid(unsafe_code)]

//! Inline style maps and CSS value helpers.
//!
//! A [`StyleMap`] is an insertion-ordered set of `key: value` declarations
//! applied wholesale to an element. Keys use CSS spelling (`left`,
//! `-webkit-transform`). An empty value means "unset": applying it removes
//! the inline declaration so the element falls back to its default.

use std::fmt;

/// Value that resets a style key to unset.
pub const UNSET: &str = "";

/// Insertion-ordered style declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleMap {
    entries: Vec<(String, String)>,
}

impl StyleMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`StyleMap::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing any earlier value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value for `key`, if declared.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `key` is declared.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Declared keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A map resetting every key in `keys` to [`UNSET`].
    #[must_use]
    pub fn unset<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::new();
        for key in keys {
            map.insert(key, UNSET);
        }
        map
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StyleMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl fmt::Display for StyleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, v) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{k}: {v};")?;
        }
        Ok(())
    }
}

/// Format a pixel length.
#[inline]
#[must_use]
pub fn px(value: i32) -> String {
    format!("{value}px")
}

/// Parse the leading integer of a CSS value the way `parseInt(value, 10)`
/// does.
///
/// Leading whitespace and one sign are accepted; parsing stops at the first
/// non-digit, so `"12.7px"` yields `12`. Values with no leading digits
/// (`"auto"`, `""`) yield `None`.
#[must_use]
pub fn parse_leading_int(value: &str) -> Option<i32> {
    let trimmed = value.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let magnitude = digits[..end]
        .bytes()
        .fold(0i64, |acc, b| {
            (acc * 10 + i64::from(b - b'0')).min(i64::from(i32::MAX) + 1)
        });
    let signed = if negative { -magnitude } else { magnitude };
    Some(signed.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
}
