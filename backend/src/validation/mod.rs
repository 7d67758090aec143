//! Validation rules for challenge payloads.
//!
//! Everything that reaches the session registry, collector or scoring engine
//! has already passed through these checks.

pub mod rules;

pub use validator::Validate;
