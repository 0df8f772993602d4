// 📄 Page-number pagination: `?page=N&limit=M`

use crate::error::{FieldError, FoodgramError, Result};
use crate::query::QueryParams;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: i64 = 6;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Parse `page` and `limit`; a page too far out to address is a 404
    pub fn from_query(params: &QueryParams, default_limit: i64) -> Result<Self> {
        let page = positive(params, "page")?.unwrap_or(1);
        let limit = positive(params, "limit")?
            .unwrap_or(default_limit)
            .clamp(1, MAX_PAGE_SIZE);
        let request = PageRequest { page, limit };
        request.offset()?;
        Ok(request)
    }

    /// Rows to skip; a page beyond any addressable row is not found
    pub fn offset(&self) -> Result<i64> {
        self.page
            .checked_sub(1)
            .and_then(|skipped| skipped.checked_mul(self.limit))
            .ok_or(FoodgramError::NotFound { entity: "Page" })
    }
}

fn positive(params: &QueryParams, key: &str) -> Result<Option<i64>> {
    match params.get(key) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n >= 1 => Ok(Some(n)),
            _ => Err(FoodgramError::Validation(vec![FieldError::new(
                key,
                "Enter a positive whole number",
            )])),
        },
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Wrap one page of results; `path` and `params` rebuild the neighbour links
    pub fn new(
        request: PageRequest,
        count: i64,
        results: Vec<T>,
        path: &str,
        params: &QueryParams,
    ) -> Result<Self> {
        let offset = request.offset()?;
        if request.page > 1 && offset >= count {
            return Err(FoodgramError::not_found("Page"));
        }

        let link = |page: i64| format!("{}?{}", path, params.with("page", &page.to_string()));
        let next = (offset.saturating_add(request.limit) < count).then(|| link(request.page + 1));
        let previous = (request.page > 1).then(|| link(request.page - 1));

        Ok(Page {
            count,
            next,
            previous,
            results,
        })
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}
