/// API route handlers
///
/// - `health`: Liveness endpoint
/// - `users`: Registration, session lifecycle, profile, watch history
/// - `channels`: Channel profile read model
pub mod channels;
pub mod health;
pub mod users;
