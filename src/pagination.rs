use std::future::Future;

use serde::Serialize;

use crate::config::PaginationConfig;
use crate::error::FieldErrors;

/// Validated page position. `page` is 1-indexed; `per_page` is already clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Rejects `page < 1` and `per_page < 1`; clamps `per_page` to the configured max.
    pub fn new(
        page: Option<i64>,
        per_page: Option<i64>,
        cfg: &PaginationConfig,
    ) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let page = page.unwrap_or(1);
        if page < 1 {
            errors.add("page", "page must be at least 1.");
        }
        let per_page = per_page.unwrap_or(cfg.default_per_page);
        if per_page < 1 {
            errors.add("per_page", "per_page must be at least 1.");
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            page,
            per_page: per_page.min(cfg.max_per_page),
        })
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

/// `ceil(total / per_page)`, never below 1.
pub fn page_count(total: i64, per_page: i64) -> i64 {
    if per_page <= 0 || total <= 0 {
        return 1;
    }
    (total + per_page - 1) / per_page
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, req: PageRequest, total: i64) -> Self {
        Self {
            items,
            page: req.page,
            per_page: req.per_page,
            total,
            pages: page_count(total, req.per_page),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            pages: self.pages,
        }
    }
}

/// Runs `fetch(limit, offset)` for the requested page. `fetch` applies its own
/// ordering before limit/offset and returns the rows with the unpaged total.
pub async fn paginate<T, E, F, Fut>(req: PageRequest, fetch: F) -> Result<Page<T>, E>
where
    F: FnOnce(i64, i64) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, i64), E>>,
{
    let (items, total) = fetch(req.limit(), req.offset()).await?;
    Ok(Page::new(items, req, total))
}
