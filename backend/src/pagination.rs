//! Page windows for filtered retrieval
//!
//! Pages are 1-indexed for host consumers; out-of-range values are rejected
//! rather than clamped so a flow never silently skips users.

use pieces_shared::{User, UserPage};

use crate::error::{ApiError, ApiResult};

/// Default page number (1-indexed for API consumers)
pub const DEFAULT_PAGE: i64 = 1;
/// Default page size if not specified
pub const DEFAULT_PAGE_SIZE: i64 = 100;
/// Maximum allowed page size
pub const MAX_PAGE_SIZE: i64 = 1000;

pub fn default_page() -> i64 {
    DEFAULT_PAGE
}

pub fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: i64,
    page_size: i64,
}

impl PageWindow {
    pub fn new(page: i64, page_size: i64) -> ApiResult<Self> {
        if page < 1 {
            return Err(ApiError::validation_single("page", "Page must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(ApiError::validation_single(
                "usersPerPage",
                format!("Page size must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }
        // offset and next-page cursor must both fit in an i64
        if (page - 1).checked_mul(page_size).is_none() || page.checked_add(1).is_none() {
            return Err(ApiError::validation_single("page", "Page is out of range"));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    /// Get SQL OFFSET value
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Get SQL LIMIT value
    pub fn limit(&self) -> i64 {
        self.page_size
    }

    pub fn next_page(&self) -> i64 {
        self.page + 1
    }

    pub fn into_page(self, users: Vec<User>) -> UserPage {
        UserPage {
            number_of_users: users.len(),
            users,
            next_page: self.next_page(),
        }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
