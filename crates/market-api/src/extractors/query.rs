//! Query string and path extractors with API-shaped rejections

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use market_core::{PageRequest, Snowflake};
use serde::{de::DeserializeOwned, Deserialize};

use crate::response::ApiError;

/// `Query<T>` whose rejection is an [`ApiError`]
#[derive(Debug, Clone)]
pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;
        Ok(ApiQuery(value))
    }
}

/// `?page=&limit=`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PaginationParams {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.limit)
    }

    pub fn page_request_with_default(self, default_limit: u32) -> PageRequest {
        PageRequest::with_default_limit(self.page, self.limit, default_limit)
    }
}

/// Pagination for plain list endpoints
#[derive(Debug, Clone, Copy)]
pub struct Pagination(pub PageRequest);

#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ApiQuery(params) = ApiQuery::<PaginationParams>::from_request_parts(parts, state).await?;
        Ok(Pagination(params.page_request()))
    }
}

/// The single id segment of a route such as `/items/:item_id`
#[derive(Debug, Clone, Copy)]
pub struct IdPath(pub Snowflake);

#[async_trait]
impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_path(e.body_text()))?;
        let id = raw
            .parse()
            .map_err(|_| ApiError::invalid_path(format!("invalid id: {raw}")))?;
        Ok(IdPath(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_request_defaults() {
        let page = PaginationParams::default().page_request();
        assert_eq!((page.page(), page.limit()), (1, 10));

        let page = PaginationParams {
            page: Some(2),
            limit: None,
        }
        .page_request_with_default(20);
        assert_eq!((page.page(), page.limit()), (2, 20));
    }

    #[test]
    fn test_limit_is_capped() {
        let page = PaginationParams {
            page: Some(-1),
            limit: Some(1000),
        }
        .page_request();
        assert_eq!((page.page(), page.limit()), (1, 100));
    }
}
