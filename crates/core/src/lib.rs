//! StayWatch core domain vocabulary.
//!
//! Everything here is free of I/O so it can be shared by the persistence
//! layer, the HTTP server and tests alike.

pub mod account;
pub mod audit;
pub mod error;
pub mod guest;
pub mod hashing;
pub mod jurisdiction;
pub mod roles;
pub mod types;

mod text_enum;
