//! Domain entities for the blog: users and the articles they author.

pub mod entities;

pub use entities::*;
