pub mod auth;
pub mod error;
pub mod session;

pub use session::{Session, SessionError, StoredSessions};
