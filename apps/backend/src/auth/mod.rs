pub mod claims;
pub mod identity;
pub mod jwt;
