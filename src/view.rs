//! View contract
//!
//! The controller is headless: rendering, confirmation dialogs, and toast
//! presentation belong to the embedding view layer and are reached through
//! the traits below.

use crate::models::{Filter, Note, Theme};
use crate::services::toast::Toast;
use async_trait::async_trait;
use serde::Serialize;

/// Per-filter counts over the full collection, honoring the live search query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub all: usize,
    pub active: usize,
    pub archived: usize,
    pub pinned: usize,
}

/// Position change of a note between two consecutive renders, used by the
/// view layer to animate list reflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflowDelta {
    pub id: String,
    pub from: usize,
    pub to: usize,
}

/// Presentation-ready projection of controller state
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub filter: Filter,
    pub query: String,
    pub theme: Theme,
    pub notes: Vec<Note>,
    pub counts: Counts,
    pub reflow: Vec<ReflowDelta>,
}

/// Receives projections and export payloads
pub trait Render: Send + Sync {
    /// Present the current projection
    fn render(&self, view: &ViewModel);

    /// Hand an exported JSON payload to the user under the given filename
    fn deliver_export(&self, filename: &str, payload: &str);
}

/// Asks the user a yes/no question before destructive operations
#[async_trait]
pub trait ConfirmProvider: Send + Sync {
    /// True means proceed
    async fn confirm(&self, message: &str) -> bool;
}

/// Presents a single toast
pub trait ToastSink: Send + Sync {
    fn show(&self, toast: &Toast);
}
