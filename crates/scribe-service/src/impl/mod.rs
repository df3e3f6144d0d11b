//! Service implementations.

mod article_service_impl;
mod user_service_impl;

pub use article_service_impl::ArticleServiceImpl;
pub use user_service_impl::UserServiceImpl;
