//! Adapters for external dependencies.

pub mod drafts_sea;
