//! Domain entities.

mod article;
mod user;

pub use article::*;
pub use user::*;
