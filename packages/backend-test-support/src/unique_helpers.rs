//! Test helpers for generating unique test data
//!
//! Draft ids are shared process-wide inside a registry, so every test that
//! touches one should use its own id.

use ulid::Ulid;

/// Generate a unique string with the given prefix
///
/// # Examples
/// ```
/// use backend_test_support::unique_helpers::unique_str;
///
/// let id1 = unique_str("user");
/// let id2 = unique_str("user");
/// assert_ne!(id1, id2);
/// assert!(id1.starts_with("user-"));
/// ```
pub fn unique_str(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}

/// Generate a unique draft id that satisfies the backend's id format
/// (lowercase, at most 64 characters).
pub fn unique_draft_id(prefix: &str) -> String {
    unique_str(prefix).to_lowercase()
}
