//! Error handling utilities for repositories

use market_core::error::DomainError;
use sqlx::Error as SqlxError;

/// Name of the partial unique index allowing one pending transaction per item
pub const ONE_PENDING_PER_ITEM: &str = "transactions_one_pending_per_item";

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Unique violation on a specific constraint
pub fn is_violation_of(e: &SqlxError, constraint: &str) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation() && db_err.constraint() == Some(constraint))
}

/// `%needle%` for ILIKE with the wildcard characters of `needle` escaped
pub fn like_pattern(needle: &str) -> Option<String> {
    let needle = needle.trim();
    if needle.is_empty() {
        return None;
    }
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern() {
        assert_eq!(like_pattern("lamp").as_deref(), Some("%lamp%"));
        assert_eq!(like_pattern("50%_off").as_deref(), Some("%50\\%\\_off%"));
        assert_eq!(like_pattern("   "), None);
    }
}
