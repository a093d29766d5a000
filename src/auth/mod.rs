//! Authentication primitives for davplay.
//!
//! This module parses HTTP Basic and Digest challenges and computes the
//! matching `Authorization` headers. Library passwords can be kept in the
//! system keyring instead of the library file.

pub mod challenge;
pub mod credentials;
pub mod digest;
pub mod manager;

pub use challenge::{Challenge, parse_challenges};
pub use credentials::Credentials;
pub use digest::DigestChallenge;
pub use manager::AuthManager;
