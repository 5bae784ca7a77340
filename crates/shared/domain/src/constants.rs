//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Credentials
// =============================================================================

/// Number of random bytes drawn for each salt (128 bits)
pub const SALT_BYTES: usize = 16;

/// Encoded salt length (hex, two characters per byte)
pub const SALT_LEN: usize = SALT_BYTES * 2;

/// Minimum salt length accepted for imported credentials (Argon2 lower bound)
pub const MIN_SALT_LEN: usize = 8;

/// Raw digest output length in bytes
pub const DIGEST_BYTES: usize = 32;

/// Encoded digest length (hex)
pub const DIGEST_LEN: usize = DIGEST_BYTES * 2;

// =============================================================================
// User Status
// =============================================================================

/// Account is in good standing
pub const STATUS_ACTIVE: &str = "active";

/// Account has been suspended by an operator
pub const STATUS_SUSPENDED: &str = "suspended";

/// Account is locked (e.g. too many failed attempts, decided by the host)
pub const STATUS_LOCKED: &str = "locked";

/// Account exists but has not been activated
pub const STATUS_INACTIVE: &str = "inactive";

// =============================================================================
// Pagination
// =============================================================================

/// Default number of records returned by a list query
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Maximum allowed records per list query
pub const MAX_PAGE_SIZE: u64 = 100;
