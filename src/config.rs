//! Application configuration constants
//!
//! Central location for storage key names, remote API defaults, and
//! validation boundaries used throughout the application.

// ===== Storage Keys =====

/// Key under which the full note collection is persisted
pub const NOTES_KEY: &str = "notes-app/v1";
/// One-time seed marker; present once the sample collection has been written
pub const SEEDED_KEY: &str = "notes-app/seeded";
/// Persisted theme preference ("light" or "dark")
pub const THEME_KEY: &str = "notes-app/theme";
/// Pinned-id map, kept separately because the remote API has no pin concept
pub const PINNED_KEY: &str = "notes-app/pinned";
/// Bearer token for the remote notes service
pub const ACCESS_TOKEN_KEY: &str = "accessToken";
/// Optional base-URL override stored alongside the rest of the state
pub const API_BASE_KEY: &str = "NOTES_API_BASE";

// ===== Remote API =====

/// Production notes service
pub const DEFAULT_API_BASE: &str = "https://notes-api.dicoding.dev/v2";

/// Environment variable consulted before falling back to the default base URL
pub const API_BASE_ENV: &str = "NOTES_API_BASE";

/// Per-request timeout in seconds
pub const API_TIMEOUT_SECS: u64 = 15;

// ===== Validation Limits =====

/// Maximum title length in bytes after trimming
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum body length in bytes after trimming
pub const MAX_BODY_LENGTH: usize = 10_000;

/// Maximum accepted size of an imported notes file (1 MiB)
pub const MAX_IMPORT_BYTES: usize = 1_048_576;

// ===== Toasts =====

/// How long a single toast stays visible before the next one is shown
pub const TOAST_DURATION_MS: u64 = 2200;
