//! Router Module Index
//!
//! The application's own routes. Access control does not live here: the access gate wraps
//! the assembled router as a whole and decides per path.

/// JSON endpoints under `/api`. The path router keeps them outside the gate.
pub mod api;

/// The page shell served for every other path the gate allows.
pub mod pages;
