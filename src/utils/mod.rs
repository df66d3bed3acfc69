//! Shared input validation helpers.

pub mod validation;
