//! imgbed upload coordination
//!
//! Drives single and batch uploads through a [`Transport`](imgbed_core::Transport),
//! guards the one-session-at-a-time rule, publishes the live
//! [`UploadSession`](imgbed_core::UploadSession) and reconciles outcomes into
//! the [`ClientState`] store.

pub mod clipboard;
pub mod coordinator;
pub mod error;
pub mod session;
pub mod state;

pub use clipboard::{copy_link, SystemClipboard};
pub use coordinator::UploadCoordinator;
pub use error::UploadError;
pub use session::{SessionGuard, SessionTracker};
pub use state::{ClientState, StateHandle};
