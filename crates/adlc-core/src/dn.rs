//! Distinguished name validation
//!
//! Only computer DNs of the shape `CN=<name>,<parent>` are accepted, where
//! `<name>` is 1-63 letters, digits or hyphens (a NetBIOS/DNS-safe host
//! label). Anything else, including escaped or wildcard CNs, is rejected
//! before it can reach a mutating directory call.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::FormatError;

static DN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^CN=[A-Za-z0-9-]{1,63},.+$").expect("DN_RE is a valid regex pattern")
});

static COMPUTER_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9-]{1,63}$").expect("COMPUTER_NAME_RE is a valid regex pattern")
});

/// A computer DN that passed syntax validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistinguishedName(String);

impl DistinguishedName {
    /// Validate a raw DN.
    pub fn parse(value: &str) -> Result<Self, FormatError> {
        validate_dn(value)?;
        Ok(Self(value.to_string()))
    }

    /// Compose `CN=<common_name>,<parent>` and validate the result.
    pub fn from_parts(common_name: &str, parent: &str) -> Result<Self, FormatError> {
        validate_computer_name(common_name)?;
        Self::parse(&format!("CN={common_name},{parent}"))
    }

    /// Get the DN as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `<name>` part of `CN=<name>,...`.
    pub fn common_name(&self) -> &str {
        self.split().0
    }

    /// Everything after the first comma.
    pub fn parent(&self) -> &str {
        self.split().1
    }

    fn split(&self) -> (&str, &str) {
        // The CN charset excludes ',', so the first comma ends the RDN.
        self.0[3..].split_once(',').unwrap_or((&self.0[3..], ""))
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DistinguishedName {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DistinguishedName {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_dn(&value)?;
        Ok(Self(value))
    }
}

impl From<DistinguishedName> for String {
    fn from(dn: DistinguishedName) -> Self {
        dn.0
    }
}

impl AsRef<str> for DistinguishedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Check a DN against `^CN=[A-Za-z0-9-]{1,63},.+$`.
pub fn validate_dn(dn: &str) -> Result<(), FormatError> {
    if DN_RE.is_match(dn) {
        Ok(())
    } else {
        Err(FormatError::InvalidDn {
            value: dn.to_string(),
        })
    }
}

/// Check a bare computer name (the CN value).
pub fn validate_computer_name(name: &str) -> Result<(), FormatError> {
    if COMPUTER_NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(FormatError::InvalidComputerName {
            value: name.to_string(),
        })
    }
}
