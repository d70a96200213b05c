//! Offset and page-count arithmetic for paged listing results.

/// Where a page starts and how many pages the result set spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub total_pages: i64,
}

/// `offset = (page - 1) * limit`, `total_pages = ceil(total / limit)`.
///
/// Callers normalize `page` and `limit` first; out-of-range values are still
/// handled without panicking (page below 1 is page 1, a zero limit yields no pages).
pub fn paginate(total: i64, page: i64, limit: i64) -> Pagination {
    let page = page.max(1);
    if limit <= 0 {
        return Pagination {
            offset: 0,
            total_pages: 0,
        };
    }
    let total = total.max(0);
    Pagination {
        offset: (page - 1).saturating_mul(limit),
        total_pages: (total + limit - 1) / limit,
    }
}
