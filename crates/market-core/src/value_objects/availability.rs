//! Item availability: the status every purchase decision hinges on
//!
//! Status is never written blindly. Every writer presents the
//! [`Availability`] it observed and the store only applies the change when
//! both status and version still match, bumping the version on success.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// Listing status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Available,
    Sold,
    Removed,
}

impl ItemStatus {
    pub const ALL: [Self; 3] = [Self::Available, Self::Sold, Self::Removed];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Sold => "sold",
            Self::Removed => "removed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::ValidationError(format!("unknown item status: {s}")))
    }
}

/// Observed `(status, version)` pair of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub status: ItemStatus,
    pub version: i64,
}

impl Availability {
    pub const fn new(status: ItemStatus, version: i64) -> Self {
        Self { status, version }
    }

    /// State of a freshly listed item
    pub const fn listed() -> Self {
        Self::new(ItemStatus::Available, 0)
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        self.status == ItemStatus::Available
    }

    /// The value a successful swap to `next` produces
    pub fn advance(self, next: ItemStatus) -> Self {
        Self::new(next, self.version + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>().unwrap(), status);
        }
        assert_eq!("SOLD".parse::<ItemStatus>().unwrap(), ItemStatus::Sold);
        assert!("gone".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_advance_bumps_version() {
        let listed = Availability::listed();
        assert!(listed.is_available());

        let sold = listed.advance(ItemStatus::Sold);
        assert_eq!(sold, Availability::new(ItemStatus::Sold, 1));
        assert!(!sold.is_available());

        let relisted = sold.advance(ItemStatus::Available);
        assert_eq!(relisted.version, 2);
        assert_ne!(relisted, listed);
    }

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(serde_json::to_string(&ItemStatus::Removed).unwrap(), "\"removed\"");
    }
}
