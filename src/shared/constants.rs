/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

/// Highest page number accepted; keeps the row offset well inside `i64`
pub const MAX_PAGE: i64 = 1_000_000;

// =============================================================================
// IDENTITY LIMITS
// =============================================================================

/// Longest username stored in the `users` mirror (characters)
pub const MAX_USERNAME_CHARS: usize = 150;

/// Longest location name stored in `locations` (characters)
pub const MAX_LOCATION_CHARS: usize = 100;

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - full access, including category management
pub const ROLE_ADMIN: &str = "admin";

/// Moderator role - can modify or delete any ad, but not other users' selections
pub const ROLE_MODERATOR: &str = "moderator";

/// Regular member role
pub const ROLE_MEMBER: &str = "member";
