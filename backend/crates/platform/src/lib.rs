//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64, secure randomness)
//! - Password hashing (Argon2id, NIST SP 800-63B compliant)
//! - Signed bearer tokens
//! - `Authorization` header parsing

pub mod crypto;
pub mod header;
pub mod password;
pub mod token;
