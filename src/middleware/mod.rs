//! Middleware layer.
//!
//! Cross-cutting response decoration applied by the server to every response,
//! whichever handler (or none) produced it.

pub mod cors;
