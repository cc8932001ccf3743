//! Services module
//!
//! Business logic sitting between the view contract and storage/API:
//! - `backend`: the note source seam (local store or remote service)
//! - `controller`: the application controller owning all note state
//! - `toast`: the sequentially drained notification queue

pub mod backend;
pub mod controller;
pub mod toast;

pub use backend::{LocalBackend, NotesBackend, RemoteBackend};
pub use controller::NotesController;
pub use toast::{Toast, ToastQueue, ToastVariant};
