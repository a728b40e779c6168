/// Domain data structures
///
/// - `user`: account records and their sanitized public projection
/// - `channel`: read models computed from subscriptions and watch history
pub mod channel;
pub mod user;
