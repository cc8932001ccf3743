//! Remote API payload shapes
//!
//! Every endpoint wraps its payload in `{status, data}` on success or
//! `{status, message}` on failure.

use crate::models::Note;
use serde::{Deserialize, Serialize};

/// Response wrapper shared by every endpoint
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// Payload of GET /notes and GET /notes/archived
#[derive(Debug, Deserialize)]
pub struct NotesData {
    pub notes: Vec<Note>,
}

/// Payload of POST /notes
#[derive(Debug, Deserialize)]
pub struct NoteData {
    pub note: Note,
}

/// Payload of POST /authentications
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    pub access_token: String,
}

/// Payload of POST /users
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub user_id: String,
}

/// Payload of GET /users/me
#[derive(Debug, Deserialize)]
pub struct UserData {
    pub user: UserInfo,
}

/// The authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
}
