//! Pagination for list finders.

/// Page size event finders use when the caller has no preference.
pub const DEFAULT_EVENT_PAGE_SIZE: u32 = 10;

/// Page size guest finders use when the caller has no preference.
pub const DEFAULT_GUEST_PAGE_SIZE: u32 = 100;

/// An explicit limit/offset window over an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of rows to return.
    pub limit: u32,
    /// Number of rows to skip.
    pub offset: u32,
}

impl Page {
    /// Creates a page window.
    #[must_use]
    pub const fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    /// The first `limit` rows.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self::new(limit, 0)
    }

    /// The first page of events at the default size.
    #[must_use]
    pub const fn events_default() -> Self {
        Self::first(DEFAULT_EVENT_PAGE_SIZE)
    }

    /// The first page of guests at the default size.
    #[must_use]
    pub const fn guests_default() -> Self {
        Self::first(DEFAULT_GUEST_PAGE_SIZE)
    }

    /// The page following this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::new(self.limit, self.offset.saturating_add(self.limit))
    }
}
