/// Request middleware
///
/// - `auth_gate`: resolves a bearer credential (cookie or header) to a
///   caller identity for protected routes
pub mod auth_gate;
