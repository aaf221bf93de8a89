//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session token generation and validation.
//! - [`revocation`] -- the revocation list (Redis or in-memory).
//! - [`tokens`] -- [`tokens::TokenService`], tying the three together.

pub mod jwt;
pub mod password;
pub mod revocation;
pub mod tokens;
