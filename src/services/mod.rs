pub mod classify;
pub mod metrics;
pub mod portal;
pub mod session_store;

pub use portal::{LoginAttempt, LoginOutcome, PortalClient};
pub use session_store::{InMemorySessionStore, SessionStore};
