//! External instance identifiers and naming suffixes
//!
//! A computer object is named after the cloud instance it represents. The
//! trailing characters of the instance id end up in the object's CN, which
//! is what the resolver matches on.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::FormatError;

/// Length of a well-formed identifier (`i-` plus the body).
pub const INSTANCE_ID_LEN: usize = 19;

/// Length of the alphanumeric body after the `i-` prefix.
pub const INSTANCE_ID_BODY_LEN: usize = 17;

static INSTANCE_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^i-[A-Za-z0-9]{17}$").expect("INSTANCE_ID_RE is a valid regex pattern")
});

/// A validated cloud instance identifier, e.g. `i-0123456789abcdef0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstanceId(String);

impl InstanceId {
    /// Validate a raw identifier.
    ///
    /// The character class is ASCII only and the prefix is lowercase `i-`.
    /// Surrounding whitespace is not trimmed.
    pub fn parse(value: &str) -> Result<Self, FormatError> {
        if INSTANCE_ID_RE.is_match(value) {
            Ok(Self(value.to_string()))
        } else {
            Err(FormatError::InvalidIdentifier {
                value: value.to_string(),
            })
        }
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the naming suffix: the trailing `length` characters.
    #[must_use]
    pub fn suffix(&self, length: SuffixLength) -> NamingSuffix {
        // Always 19 ASCII bytes and length <= 17, so the slice is in bounds.
        let start = self.0.len() - length.get();
        NamingSuffix(self.0[start..].to_string())
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InstanceId {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InstanceId {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InstanceId> for String {
    fn from(id: InstanceId) -> Self {
        id.0
    }
}

/// Number of trailing identifier characters used in a computer name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct SuffixLength(usize);

impl SuffixLength {
    /// Default suffix length.
    pub const DEFAULT: SuffixLength = SuffixLength(8);

    /// Create a suffix length; must fit inside the identifier body.
    pub fn new(length: usize) -> Result<Self, FormatError> {
        if (1..=INSTANCE_ID_BODY_LEN).contains(&length) {
            Ok(Self(length))
        } else {
            Err(FormatError::InvalidSuffixLength {
                length,
                max: INSTANCE_ID_BODY_LEN,
            })
        }
    }

    /// Get the length value.
    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for SuffixLength {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for SuffixLength {
    type Error = FormatError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SuffixLength> for usize {
    fn from(length: SuffixLength) -> Self {
        length.0
    }
}

impl fmt::Display for SuffixLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trailing characters of an [`InstanceId`], matched against computer CNs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct NamingSuffix(String);

impl NamingSuffix {
    /// Get the suffix as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamingSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-function form of [`InstanceId::suffix`].
pub fn derive_suffix(id: &InstanceId, length: SuffixLength) -> NamingSuffix {
    id.suffix(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        for raw in [
            "i-0123456789abcdef0",
            "i-ABCDEFGHIJKLMNOPQ",
            "i-00000000000000000",
            "i-aZ09aZ09aZ09aZ09a",
        ] {
            let id = InstanceId::parse(raw).unwrap();
            assert_eq!(id.as_str(), raw);
            assert_eq!(id.as_str().len(), INSTANCE_ID_LEN);
        }
    }

    #[test]
    fn test_parse_invalid() {
        for raw in [
            "",
            "i-",
            "i-0123456789abcdef",    // 16 chars
            "i-0123456789abcdef01",  // 18 chars
            "I-0123456789abcdef0",   // uppercase prefix
            "x-0123456789abcdef0",
            "i_0123456789abcdef0",
            "0123456789abcdef012",
            "i-0123456789abcdef*",
            "i-0123456789abc-ef0",
            "i-0123456789abcdéf0",
            " i-0123456789abcdef0",
            "i-0123456789abcdef0 ",
            "i-0123456789abcdef0\n",
            "CN=i-0123456789abcdef0",
        ] {
            let err = InstanceId::parse(raw).unwrap_err();
            assert_eq!(
                err,
                FormatError::InvalidIdentifier {
                    value: raw.to_string()
                },
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_from_str_and_try_from() {
        let id: InstanceId = "i-0123456789abcdef0".parse().unwrap();
        assert_eq!(id.to_string(), "i-0123456789abcdef0");

        assert!(InstanceId::try_from("nope".to_string()).is_err());
    }

    #[test]
    fn test_serde_rejects_malformed() {
        let id: InstanceId = serde_json::from_str("\"i-0123456789abcdef0\"").unwrap();
        assert_eq!(id.as_str(), "i-0123456789abcdef0");

        let result: Result<InstanceId, _> = serde_json::from_str("\"i-123\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_default_suffix_is_last_eight() {
        let id = InstanceId::parse("i-0123456789abcdef0").unwrap();
        let suffix = id.suffix(SuffixLength::default());
        assert_eq!(suffix.as_str(), "9abcdef0");
        assert_eq!(derive_suffix(&id, SuffixLength::DEFAULT), suffix);
    }

    #[test]
    fn test_suffix_length_bounds() {
        let id = InstanceId::parse("i-ABCDEFGHIJKLMNOPQ").unwrap();

        let one = SuffixLength::new(1).unwrap();
        assert_eq!(id.suffix(one).as_str(), "Q");

        let full = SuffixLength::new(17).unwrap();
        assert_eq!(id.suffix(full).as_str(), "ABCDEFGHIJKLMNOPQ");

        assert_eq!(
            SuffixLength::new(0).unwrap_err(),
            FormatError::InvalidSuffixLength { length: 0, max: 17 }
        );
        assert!(SuffixLength::new(18).is_err());
    }

    #[test]
    fn test_suffix_length_serde() {
        let length: SuffixLength = serde_json::from_str("12").unwrap();
        assert_eq!(length.get(), 12);
        assert!(serde_json::from_str::<SuffixLength>("40").is_err());
    }
}
