/// Router Module Index
///
/// Organizes the application's routing logic into access-segregated modules.
/// Access control is applied explicitly at the module level (via Axum layers),
/// so no individual admin handler needs its own gate.

/// Routes accessible to all users (anonymous, read-only content pages).
pub mod public;

/// Session entry and exit points (login form, authentication, logout).
pub mod auth;

/// Routes restricted to an authenticated session. The authorization gate is
/// applied once, on the nested router, in `create_router`.
pub mod admin;
