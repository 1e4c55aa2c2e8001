//! Core building blocks shared by Vigil binaries.
//!
//! Configuration, the secure input buffer, and the lock session state machine
//! live here so system-integration crates can focus on their one capability
//! instead of reimplementing orchestration.

pub mod buffer;
pub mod config;
pub mod conv;
pub mod error;
pub mod identity;
pub mod logging;
pub mod session;

pub use buffer::SecureBuffer;
pub use config::{VigilConfig, DEFAULT_CONFIG_PATH};
pub use error::{VigilError, VigilResult};
pub use identity::resolve_session_identity;
pub use session::{LockSession, SessionReport};
