//! Session directory: the per-user "is logged in" record.
//!
//! Records carry no expiry. They exist from login/register until logout or
//! account deletion.

mod memory_session;
mod redis_session;
mod session_directory;

pub use memory_session::MemorySessionDirectory;
pub use redis_session::RedisSessionDirectory;
pub use session_directory::{session_key, SessionDirectory};
