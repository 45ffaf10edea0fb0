//! Computer-account `userAccountControl` states
//!
//! The directory stores the flag word as a decimal string. Values are
//! decoded into [`AccountControl`] at the boundary and encoded back when
//! written; unknown combinations are preserved verbatim in
//! [`AccountControl::Other`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DirectoryError;

/// Directory attribute holding the flag word.
pub const ATTRIBUTE: &str = "userAccountControl";

/// ACCOUNTDISABLE flag.
pub const ACCOUNTDISABLE: u32 = 0x0002;

/// PASSWD_NOTREQD flag.
pub const PASSWD_NOTREQD: u32 = 0x0020;

/// WORKSTATION_TRUST_ACCOUNT flag (member computers).
pub const WORKSTATION_TRUST_ACCOUNT: u32 = 0x1000;

/// Account-control state of a computer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountControl {
    /// Joined workstation account (4096).
    Active,
    /// Disabled workstation account (4098).
    Disabled,
    /// Pre-staged account waiting for a domain join (4130).
    ///
    /// Disabled, and no password required so the joining host can set one.
    PendingJoin,
    /// Any other flag combination.
    Other(u32),
}

impl AccountControl {
    /// Raw flag word.
    pub fn bits(self) -> u32 {
        match self {
            AccountControl::Active => WORKSTATION_TRUST_ACCOUNT,
            AccountControl::Disabled => WORKSTATION_TRUST_ACCOUNT | ACCOUNTDISABLE,
            AccountControl::PendingJoin => {
                WORKSTATION_TRUST_ACCOUNT | PASSWD_NOTREQD | ACCOUNTDISABLE
            }
            AccountControl::Other(bits) => bits,
        }
    }

    /// Map a flag word onto a known state, or [`AccountControl::Other`].
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            b if b == AccountControl::Active.bits() => AccountControl::Active,
            b if b == AccountControl::Disabled.bits() => AccountControl::Disabled,
            b if b == AccountControl::PendingJoin.bits() => AccountControl::PendingJoin,
            b => AccountControl::Other(b),
        }
    }

    /// Whether the ACCOUNTDISABLE flag is set.
    pub fn is_disabled(self) -> bool {
        self.bits() & ACCOUNTDISABLE != 0
    }

    /// Encode as the directory's decimal string form.
    pub fn encode(self) -> String {
        self.bits().to_string()
    }

    /// Decode the directory's decimal string form.
    pub fn decode(value: &str) -> Result<Self, DirectoryError> {
        value
            .trim()
            .parse::<u32>()
            .map(Self::from_bits)
            .map_err(|_| DirectoryError::InvalidAttribute {
                attribute: ATTRIBUTE.to_string(),
                value: value.to_string(),
            })
    }
}

impl From<u32> for AccountControl {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl From<AccountControl> for u32 {
    fn from(state: AccountControl) -> Self {
        state.bits()
    }
}

impl fmt::Display for AccountControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountControl::Active => write!(f, "active"),
            AccountControl::Disabled => write!(f, "disabled"),
            AccountControl::PendingJoin => write!(f, "pending_join"),
            AccountControl::Other(bits) => write!(f, "other({bits:#x})"),
        }
    }
}
