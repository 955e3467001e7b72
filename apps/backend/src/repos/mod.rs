//! Persistence seams used by the services layer.

pub mod drafts;
