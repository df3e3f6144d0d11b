//! Data Transfer Objects (DTOs).

mod article_dto;
mod response;
mod user_dto;

pub use article_dto::*;
pub use response::*;
pub use user_dto::*;
