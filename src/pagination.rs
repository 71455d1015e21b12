//! Normalization of untrusted paging input.

use serde::Serialize;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
/// Limits at or above this value fall back to `DEFAULT_LIMIT` (they are not capped).
pub const LIMIT_CEILING: i64 = 100;

/// Paging request as received from a client, both values may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingRequest {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Paging after normalization, `total` is filled in by the listing.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

impl Paging {
    /// Never fails: anything out of range is replaced with a default.
    pub fn normalize(request: PagingRequest) -> Paging {
        let page = match request.page {
            Some(page) if page > 0 => page,
            _ => DEFAULT_PAGE,
        };
        let limit = match request.limit {
            Some(limit) if limit > 0 && limit < LIMIT_CEILING => limit,
            _ => DEFAULT_LIMIT,
        };
        Paging {
            page,
            limit,
            total: 0,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}
