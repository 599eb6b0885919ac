use serde::Serialize;

/// Largest page a list endpoint will return.
pub(crate) const MAX_LIMIT: i64 = 1000;

pub(crate) const fn default_limit() -> i64 {
    100
}

/// Normalizes caller-supplied paging into what the repositories apply.
pub(crate) fn clamp_window(skip: i64, limit: i64) -> (i64, i64) {
    (skip.max(0), limit.clamp(1, MAX_LIMIT))
}

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

impl<T> PaginatedResponse<T> {
    pub(crate) fn new(items: Vec<T>, skip: i64, limit: i64) -> Self {
        let (skip, limit) = clamp_window(skip, limit);
        Self { items, skip, limit }
    }
}
