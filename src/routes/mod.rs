//! Router Module Index
//!
//! Splits the HTTP surface by authentication requirement. The split is applied
//! as router layers in `create_router`, so a protected endpoint cannot be
//! exposed by accident.

/// Routes reachable without a session. The navigation check lives here because
/// an anonymous caller must still receive its redirect to `/login`.
pub mod public;

/// Routes protected by the `CurrentUser` extractor middleware.
pub mod authenticated;
