//! Backend test support utilities
//!
//! Shared helpers for the backend's integration tests: logging initialization,
//! Problem Details assertions and unique identifiers for test isolation.

pub mod logging;
pub mod problem_details;
pub mod unique_helpers;
