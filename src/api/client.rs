//! Remote notes service client
//!
//! Issues authenticated HTTP calls against the notes REST API and
//! normalizes success and failure into `Result` values. Any non-2xx
//! response is a failure regardless of body shape; the server's `message`
//! is surfaced when present. The bearer token lives in the local store so
//! a login survives restarts.

use crate::api::models::{Envelope, LoginData, NoteData, NotesData, RegisterData, UserData, UserInfo};
use crate::config;
use crate::error::{AppError, Result};
use crate::models::Note;
use crate::storage::LocalStore;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

/// Client for the remote notes service
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: LocalStore,
}

impl ApiClient {
    /// Create a client. Base URL resolution priority: explicit override,
    /// then the `NOTES_API_BASE` store key, then the environment variable,
    /// then the compiled default.
    pub async fn new(store: LocalStore, base_url: Option<String>) -> Result<Self> {
        let base_url = match base_url {
            Some(url) => url,
            None => match store.get(config::API_BASE_KEY).await? {
                Some(url) if !url.trim().is_empty() => url.trim().to_string(),
                _ => std::env::var(config::API_BASE_ENV)
                    .ok()
                    .filter(|url| !url.trim().is_empty())
                    .unwrap_or_else(|| config::DEFAULT_API_BASE.to_string()),
            },
        };

        let http = reqwest::Client::builder()
            .user_agent(concat!("pinnote/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config::API_TIMEOUT_SECS))
            .build()?;

        tracing::info!("API client targeting {}", base_url);

        Ok(Self {
            http,
            base_url,
            store,
        })
    }

    // ===== Token lifecycle =====

    pub async fn put_access_token(&self, token: &str) -> Result<()> {
        self.store.set(config::ACCESS_TOKEN_KEY, token).await
    }

    pub async fn get_access_token(&self) -> Result<Option<String>> {
        self.store.get(config::ACCESS_TOKEN_KEY).await
    }

    pub async fn clear_access_token(&self) -> Result<()> {
        self.store.remove(config::ACCESS_TOKEN_KEY).await
    }

    pub async fn is_logged_in(&self) -> bool {
        matches!(self.get_access_token().await, Ok(Some(token)) if !token.is_empty())
    }

    // ===== Endpoints =====

    /// Register a new user, returning the server-assigned user id
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let body = json!({ "name": name, "email": email, "password": password });
        let data: Option<RegisterData> = self
            .request(Method::POST, "/users", Some(body), false)
            .await?;

        data.map(|d| d.user_id)
            .ok_or_else(|| AppError::Generic("register response missing user id".to_string()))
    }

    /// Log in and store the returned bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let body = json!({ "email": email, "password": password });
        let data: Option<LoginData> = self
            .request(Method::POST, "/authentications", Some(body), false)
            .await?;

        let token = data
            .map(|d| d.access_token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Generic("login response missing access token".to_string()))?;

        self.put_access_token(&token).await?;
        tracing::info!("Logged in; access token stored");
        Ok(token)
    }

    /// Fetch the authenticated user
    pub async fn get_user_logged(&self) -> Result<UserInfo> {
        let data: Option<UserData> = self.request(Method::GET, "/users/me", None, true).await?;

        data.map(|d| d.user)
            .ok_or_else(|| AppError::Generic("user response missing user".to_string()))
    }

    /// Fetch all active notes
    pub async fn get_notes(&self) -> Result<Vec<Note>> {
        let data: Option<NotesData> = self.request(Method::GET, "/notes", None, true).await?;
        Ok(data.map(|d| d.notes).unwrap_or_default())
    }

    /// Fetch all archived notes
    pub async fn get_archived_notes(&self) -> Result<Vec<Note>> {
        let data: Option<NotesData> = self
            .request(Method::GET, "/notes/archived", None, true)
            .await?;
        Ok(data.map(|d| d.notes).unwrap_or_default())
    }

    /// Create a note on the server and return it
    pub async fn create_note(&self, title: &str, body: &str) -> Result<Note> {
        let payload = json!({ "title": title, "body": body });
        let data: Option<NoteData> = self
            .request(Method::POST, "/notes", Some(payload), true)
            .await?;

        data.map(|d| d.note)
            .ok_or_else(|| AppError::Generic("create response missing note".to_string()))
    }

    /// Delete a note by id
    pub async fn delete_note(&self, id: &str) -> Result<()> {
        let path = format!("/notes/{}", Self::require_id(id)?);
        self.request::<serde_json::Value>(Method::DELETE, &path, None, true)
            .await?;
        Ok(())
    }

    /// Move a note to the archived collection
    pub async fn archive_note(&self, id: &str) -> Result<()> {
        let path = format!("/notes/{}/archive", Self::require_id(id)?);
        self.request::<serde_json::Value>(Method::POST, &path, None, true)
            .await?;
        Ok(())
    }

    /// Move a note back to the active collection
    pub async fn unarchive_note(&self, id: &str) -> Result<()> {
        let path = format!("/notes/{}/unarchive", Self::require_id(id)?);
        self.request::<serde_json::Value>(Method::POST, &path, None, true)
            .await?;
        Ok(())
    }

    // ===== Internals =====

    fn require_id(id: &str) -> Result<String> {
        if id.trim().is_empty() {
            return Err(AppError::Validation("note id is required".to_string()));
        }
        Ok(urlencoding::encode(id).into_owned())
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
        auth: bool,
    ) -> Result<Option<T>> {
        let url = format!("{}{}", self.base_url, path);

        let mut request = self
            .http
            .request(method, &url)
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some(body) = &body {
            request = request.json(body);
        }

        if auth {
            let token = self
                .get_access_token()
                .await?
                .filter(|t| !t.is_empty())
                .ok_or_else(|| {
                    AppError::Unauthorized("no access token; please login first".to_string())
                })?;
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Err(AppError::Timeout(format!("request to {} took too long", path)));
            }
            Err(e) => return Err(e.into()),
        };

        let status = response.status();
        let envelope: Option<Envelope<T>> = response.json().await.ok();

        if !status.is_success() {
            let message = envelope
                .and_then(|env| env.message)
                .unwrap_or_else(|| status.to_string());
            tracing::warn!("{} {} failed: {}", status.as_u16(), path, message);

            if status.as_u16() == 401 {
                return Err(AppError::Unauthorized(message));
            }
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(envelope.and_then(|env| env.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_client(base: Option<String>) -> (ApiClient, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path().join("storage"));
        store.initialize().await.unwrap();
        let client = ApiClient::new(store, base).await.unwrap();
        (client, temp_dir)
    }

    #[tokio::test]
    async fn test_explicit_base_url_wins() {
        let (client, _temp) = create_test_client(Some("http://localhost:3001/v2".into())).await;
        assert_eq!(client.base_url, "http://localhost:3001/v2");
    }

    #[tokio::test]
    async fn test_store_override_beats_default() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalStore::new(temp_dir.path().join("storage"));
        store.initialize().await.unwrap();
        store
            .set(config::API_BASE_KEY, "http://127.0.0.1:9999/v2")
            .await
            .unwrap();

        let client = ApiClient::new(store, None).await.unwrap();
        assert_eq!(client.base_url, "http://127.0.0.1:9999/v2");
    }

    #[tokio::test]
    async fn test_token_roundtrip() {
        let (client, _temp) = create_test_client(Some("http://localhost/v2".into())).await;

        assert!(!client.is_logged_in().await);

        client.put_access_token("tok-abc").await.unwrap();
        assert!(client.is_logged_in().await);
        assert_eq!(
            client.get_access_token().await.unwrap(),
            Some("tok-abc".to_string())
        );

        client.clear_access_token().await.unwrap();
        assert!(!client.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_auth_call_without_token_fails_before_sending() {
        // unreachable base URL: the call must fail on the missing token,
        // not on the network
        let (client, _temp) = create_test_client(Some("http://127.0.0.1:1/v2".into())).await;

        let result = client.get_notes().await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_ids_are_percent_encoded() {
        assert_eq!(
            ApiClient::require_id("notes/1 a").unwrap(),
            "notes%2F1%20a"
        );
        assert!(matches!(
            ApiClient::require_id("  "),
            Err(AppError::Validation(_))
        ));
    }
}
