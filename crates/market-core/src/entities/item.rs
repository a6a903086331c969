//! Item entity - a listing for sale

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{Availability, ItemStatus, Snowflake};

pub const MAX_TITLE_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Listing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Book,
    Electronics,
    Furniture,
    Lodging,
    Other,
}

impl Category {
    pub const ALL: [Self; 5] = [
        Self::Book,
        Self::Electronics,
        Self::Furniture,
        Self::Lodging,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Electronics => "electronics",
            Self::Furniture => "furniture",
            Self::Lodging => "lodging",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::InvalidCategory(s.to_string()))
    }
}

/// Item entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: Snowflake,
    pub owner_id: Snowflake,
    pub title: String,
    pub price: Decimal,
    pub category: Category,
    pub description: String,
    pub image_url: Option<String>,
    pub status: ItemStatus,
    /// Bumped on every status change
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Item {
    /// List a validated draft as a new Available item owned by `owner_id`
    pub fn list(id: Snowflake, owner_id: Snowflake, draft: ItemDraft) -> Self {
        let now = Utc::now();
        let listed = Availability::listed();
        Self {
            id,
            owner_id,
            title: draft.title,
            price: draft.price,
            category: draft.category,
            description: draft.description,
            image_url: None,
            status: listed.status,
            version: listed.version,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn availability(&self) -> Availability {
        Availability::new(self.status, self.version)
    }

    pub fn set_availability(&mut self, availability: Availability) {
        self.status = availability.status;
        self.version = availability.version;
        self.updated_at = Utc::now();
    }

    #[inline]
    pub fn is_owned_by(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Exclusive upper bound of a `NUMERIC(12,2)` column
const PRICE_CEILING: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// Price must be positive with at most two fractional digits.
/// Accepted prices come back at scale 2, matching `NUMERIC(12,2)`.
pub fn validate_price(price: Decimal) -> Result<Decimal, DomainError> {
    let mut normalized = price.normalize();
    if normalized <= Decimal::ZERO || normalized >= PRICE_CEILING || normalized.scale() > 2 {
        return Err(DomainError::InvalidPrice);
    }
    normalized.rescale(2);
    Ok(normalized)
}

fn validate_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(DomainError::ValidationError("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::ValidationError(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_description(description: &str) -> Result<String, DomainError> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::ValidationError(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(description.trim().to_string())
}

/// Fields supplied when listing an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub title: String,
    pub price: Decimal,
    pub category: Category,
    pub description: String,
}

impl ItemDraft {
    /// Parse and validate raw listing input
    pub fn parse(
        title: &str,
        price: Decimal,
        category: &str,
        description: Option<&str>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            title: validate_title(title)?,
            price: validate_price(price)?,
            category: category.parse()?,
            description: validate_description(description.unwrap_or_default())?,
        })
    }
}

/// Partial update of an item's descriptive fields
///
/// `None`, blank strings and a zero price mean "leave unchanged".
/// Status and image are not reachable from here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub title: Option<String>,
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl ItemChanges {
    /// Validate the supplied fields and write them into `item`.
    /// Returns whether anything changed.
    pub fn apply(self, item: &mut Item) -> Result<bool, DomainError> {
        let mut changed = false;

        if let Some(title) = self.title.filter(|t| !t.trim().is_empty()) {
            item.title = validate_title(&title)?;
            changed = true;
        }
        if let Some(price) = self.price.filter(|p| !p.is_zero()) {
            item.price = validate_price(price)?;
            changed = true;
        }
        if let Some(category) = self.category.filter(|c| !c.trim().is_empty()) {
            item.category = category.parse()?;
            changed = true;
        }
        if let Some(description) = self.description.filter(|d| !d.trim().is_empty()) {
            item.description = validate_description(&description)?;
            changed = true;
        }

        if changed {
            item.updated_at = Utc::now();
        }
        Ok(changed)
    }
}
