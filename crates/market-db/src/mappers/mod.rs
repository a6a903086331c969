//! Model to entity mappers
//!
//! Enum columns are stored as their wire names. A row holding a value the
//! domain does not know is reported as a database error rather than
//! silently coerced.

mod chat;
mod item;
mod transaction;
mod user;

use std::str::FromStr;

use market_core::DomainError;

pub use item::availability_from_row;

/// Parse an enum column, blaming the store for unknown values
pub(crate) fn parse_column<T>(column: &'static str, value: &str) -> Result<T, DomainError>
where
    T: FromStr,
{
    value
        .parse()
        .map_err(|_| DomainError::DatabaseError(format!("unexpected {column} value {value:?}")))
}

/// Map a batch of rows, failing on the first bad one
pub(crate) fn map_rows<M, E>(rows: Vec<M>) -> Result<Vec<E>, DomainError>
where
    E: TryFrom<M, Error = DomainError>,
{
    rows.into_iter().map(E::try_from).collect()
}
