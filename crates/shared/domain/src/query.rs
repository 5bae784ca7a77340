//! Lookup keys and list query parameters.

use uuid::Uuid;

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::user::UserStatus;

/// One of the alternate keys that identify a single user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserKey {
    Id(Uuid),
    Username(String),
    Email(String),
}

impl UserKey {
    pub fn id(id: Uuid) -> Self {
        UserKey::Id(id)
    }

    pub fn username(username: impl Into<String>) -> Self {
        UserKey::Username(username.into())
    }

    pub fn email(email: impl Into<String>) -> Self {
        UserKey::Email(email.into())
    }

    /// Which alternate key this is, without its value.
    pub fn kind(&self) -> &'static str {
        match self {
            UserKey::Id(_) => "id",
            UserKey::Username(_) => "username",
            UserKey::Email(_) => "email",
        }
    }

    /// The id, when the key is one. Safe to put in logs.
    pub fn as_id(&self) -> Option<Uuid> {
        match self {
            UserKey::Id(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<Uuid> for UserKey {
    fn from(id: Uuid) -> Self {
        UserKey::Id(id)
    }
}

impl std::fmt::Display for UserKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserKey::Id(id) => write!(f, "id={}", id),
            UserKey::Username(username) => write!(f, "username={}", username),
            UserKey::Email(email) => write!(f, "email={}", email),
        }
    }
}

/// Exact-match filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum UserFilter {
    Name(String),
    Username(String),
    Email(String),
    Phone(String),
    Status(UserStatus),
    Enabled(bool),
}

/// Column a list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Name,
    Username,
    Email,
    Phone,
    CreatedAt,
    Status,
    Enabled,
}

/// List query: conjunction of filters, optional ordering, limit/offset.
///
/// `limit` defaults to `DEFAULT_PAGE_SIZE` and is clamped to
/// `MAX_PAGE_SIZE` when the query runs; page through larger result sets
/// with `offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub limit: u64,
    pub offset: u64,
    pub filters: Vec<UserFilter>,
    /// `None` keeps the storage default order
    pub order_by: Option<SortField>,
    pub descending: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            filters: Vec::new(),
            order_by: None,
            descending: false,
        }
    }
}

impl ListQuery {
    pub fn new(limit: u64, offset: u64) -> Self {
        Self {
            limit,
            offset,
            ..Self::default()
        }
    }

    pub fn filter(mut self, filter: UserFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_by(mut self, field: SortField, descending: bool) -> Self {
        self.order_by = Some(field);
        self.descending = descending;
        self
    }

    /// Effective page size: `limit` clamped to `MAX_PAGE_SIZE`.
    pub fn limit(&self) -> u64 {
        self.limit.min(MAX_PAGE_SIZE)
    }
}
