//! Transaction entity - a purchase of one item by one buyer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Purchase lifecycle
///
/// `Pending -> Completed` and `Pending -> Cancelled`; both targets are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub const ALL: [Self; 3] = [Self::Pending, Self::Completed, Self::Cancelled];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Check that `self -> next` is an edge of the lifecycle
    pub fn transition_to(self, next: Self) -> Result<Self, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::TransactionAlreadyTerminal(self.as_str()));
        }
        if !next.is_terminal() {
            return Err(DomainError::ValidationError(
                "status must be completed or cancelled".to_string(),
            ));
        }
        Ok(next)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::ValidationError(format!("unknown transaction status: {s}")))
    }
}

/// Transaction entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: Snowflake,
    pub item_id: Snowflake,
    pub buyer_id: Snowflake,
    pub status: TransactionStatus,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// Open a new pending purchase
    pub fn open(id: Snowflake, item_id: Snowflake, buyer_id: Snowflake) -> Self {
        let now = Utc::now();
        Self {
            id,
            item_id,
            buyer_id,
            status: TransactionStatus::Pending,
            occurred_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    #[inline]
    pub fn is_buyer(&self, user_id: Snowflake) -> bool {
        self.buyer_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_is_pending() {
        let tx = Transaction::open(Snowflake::new(1), Snowflake::new(2), Snowflake::new(3));
        assert!(tx.is_pending());
        assert!(tx.is_buyer(Snowflake::new(3)));
        assert!(!tx.is_buyer(Snowflake::new(2)));
    }

    #[test]
    fn test_transitions() {
        use TransactionStatus::*;

        assert_eq!(Pending.transition_to(Completed).unwrap(), Completed);
        assert_eq!(Pending.transition_to(Cancelled).unwrap(), Cancelled);
        assert!(matches!(
            Pending.transition_to(Pending),
            Err(DomainError::ValidationError(_))
        ));

        for terminal in [Completed, Cancelled] {
            for next in TransactionStatus::ALL {
                assert!(matches!(
                    terminal.transition_to(next),
                    Err(DomainError::TransactionAlreadyTerminal(_))
                ));
            }
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("Cancelled".parse::<TransactionStatus>().unwrap(), TransactionStatus::Cancelled);
        assert!("refunded".parse::<TransactionStatus>().is_err());
    }
}
