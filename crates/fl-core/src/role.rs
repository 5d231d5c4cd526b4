//! Agent role enum shared by handle factories and fleet management.
//!
//! The set of roles is closed: a factory either knows how to build a handle
//! for a role or reports it as unsupported, which the reconnection state
//! machine treats as a permanent failure.

use std::str::FromStr;

use crate::FleetError;

/// The character class of a controlled agent.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Mage,
    Merchant,
    Paladin,
    Priest,
    Ranger,
    Rogue,
    Warrior,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Mage,
        Role::Merchant,
        Role::Paladin,
        Role::Priest,
        Role::Ranger,
        Role::Rogue,
        Role::Warrior,
    ];

    /// Lower-case label, as used in configuration files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Mage     => "mage",
            Role::Merchant => "merchant",
            Role::Paladin  => "paladin",
            Role::Priest   => "priest",
            Role::Ranger   => "ranger",
            Role::Rogue    => "rogue",
            Role::Warrior  => "warrior",
        }
    }
}

impl FromStr for Role {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FleetError::UnknownRole(s.to_owned()))
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
