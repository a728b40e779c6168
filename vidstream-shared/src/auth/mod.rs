/// Authentication primitives
///
/// This module provides the two cryptographic building blocks of the session
/// lifecycle:
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`tokens`]: JWT access/refresh token issuance and validation
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with a per-call random salt
/// - **JWT Tokens**: HS256 signing, independent access and refresh secrets
/// - **Constant-time Comparison**: Verification uses the algorithm's own
///   verify primitive, never string equality
pub mod password;
pub mod tokens;
