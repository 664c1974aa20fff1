//! # auth-adapters
//!
//! Credential adapters for the `PasswordHasher` and `TokenService` ports.
//!
//! - `password`: Argon2id hashing in PHC string format, always compiled.
//! - `jwt`: HS256 bearer tokens (feature `auth-jwt`).

pub mod password;

#[cfg(feature = "auth-jwt")]
pub mod jwt;

pub use password::Argon2PasswordHasher;

#[cfg(feature = "auth-jwt")]
pub use jwt::JwtTokenService;
