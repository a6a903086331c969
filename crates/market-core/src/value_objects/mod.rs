//! Value objects - immutable types that represent domain concepts

mod availability;
mod caller;
mod pagination;
mod snowflake;

pub use availability::{Availability, ItemStatus};
pub use caller::Caller;
pub use pagination::{Page, PageRequest};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
