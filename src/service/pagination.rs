//! # Pagination
//!
//! Offset pagination: `offset = (page - 1) * limit`, newest first.

use super::errors::{ServiceError, ServiceResult};

/// Page used when none is given
pub const DEFAULT_PAGE: usize = 1;

/// Page size used when none is given
pub const DEFAULT_LIMIT: usize = 10;

/// A resolved, always-valid pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Strict constructor: missing values take the defaults, non-positive
    /// values are rejected.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> ServiceResult<Self> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(p) if p > 0 => usize::try_from(p).unwrap_or(usize::MAX),
            Some(p) => {
                return Err(ServiceError::Validation(format!(
                    "page must be a positive integer, got {}",
                    p
                )))
            }
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(l) if l > 0 => usize::try_from(l).unwrap_or(usize::MAX),
            Some(l) => {
                return Err(ServiceError::Validation(format!(
                    "limit must be a positive integer, got {}",
                    l
                )))
            }
        };

        Ok(Self { page, limit })
    }

    /// Lenient constructor for raw query strings: anything missing,
    /// non-numeric or non-positive falls back to the default.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit).unwrap_or(DEFAULT_LIMIT);

        Self { page, limit }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of records to skip. Saturates for absurdly large pages,
    /// which then simply yield an empty window.
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v > 0)
}

/// `ceil(total_count / limit)`. An empty collection has zero pages.
pub fn total_pages(total_count: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    total_count.div_ceil(limit)
}
