//! # Scribe Security
//!
//! Session token issuing (JWT, HS256) and password hashing (Argon2id).
//! Both are exposed behind `Interface` traits so the service layer can
//! treat them as opaque capabilities.

pub mod jwt;
pub mod password;

pub use jwt::*;
pub use password::*;
