//! Authenticated session handles.
//!
//! A [`SessionProvider`] hands out the credential attached to every API
//! request. Providers follow a get-or-create contract: the first caller
//! establishes the session, later callers reuse it. Creation is serialized
//! behind a single-entry lock so racing triggers never log in twice.

use super::client::Client;
use super::error::FetchError;
use async_trait::async_trait;
use log::*;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const SESSION_EXTENSION: &str = ".tw_session";
const LEGACY_SESSION_EXTENSION: &str = ".json";

/// Credential attached to API requests.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csrf_token: Option<String>,
}

impl Session {
    pub fn bearer(token: &str) -> Self {
        Session {
            token: token.to_owned(),
            csrf_token: None,
        }
    }
}

/// Source of the session used by the gateway.
///
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Return the current session, creating it on first use.
    async fn session(&self, client: &Client) -> Result<Session, FetchError>;

    /// Forget the current session so the next call creates a fresh one.
    async fn invalidate(&self) {}
}

/// Pre-issued bearer token (API v2).
///
pub struct StaticBearer {
    session: Session,
}

impl StaticBearer {
    pub fn new(token: &str) -> Self {
        StaticBearer {
            session: Session::bearer(token),
        }
    }
}

#[async_trait]
impl SessionProvider for StaticBearer {
    async fn session(&self, _client: &Client) -> Result<Session, FetchError> {
        Ok(self.session.clone())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Application-only bearer token exchanged from a consumer key and secret
/// (REST API v1.1).
///
pub struct AppOnlyBearer {
    consumer_key: String,
    consumer_secret: String,
    cached: Mutex<Option<Session>>,
}

impl AppOnlyBearer {
    pub fn new(consumer_key: &str, consumer_secret: &str) -> Self {
        AppOnlyBearer {
            consumer_key: consumer_key.to_owned(),
            consumer_secret: consumer_secret.to_owned(),
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionProvider for AppOnlyBearer {
    async fn session(&self, client: &Client) -> Result<Session, FetchError> {
        let mut cached = self.cached.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }

        debug!("Exchanging consumer credentials for an application bearer token...");
        let request = client
            .request(Method::POST, "oauth2/token")
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .form(&[("grant_type", "client_credentials")]);
        let body = client.send(request).await.map_err(into_auth_failure)?;
        let token: TokenResponse = serde_json::from_value(body)?;

        let session = Session::bearer(&token.access_token);
        *cached = Some(session.clone());
        Ok(session)
    }

    async fn invalidate(&self) {
        self.cached.lock().await.take();
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    auth_token: String,
    #[serde(default)]
    csrf_token: Option<String>,
}

/// Username/password login whose token is persisted between runs.
///
pub struct LoginSession {
    username: String,
    password: String,
    store: SessionStore,
    cached: Mutex<Option<Session>>,
}

impl LoginSession {
    pub fn new(username: &str, password: &str, store: SessionStore) -> Self {
        LoginSession {
            username: username.to_owned(),
            password: password.to_owned(),
            store,
            cached: Mutex::new(None),
        }
    }
}

#[async_trait]
impl SessionProvider for LoginSession {
    async fn session(&self, client: &Client) -> Result<Session, FetchError> {
        let mut cached = self.cached.lock().await;
        if let Some(session) = cached.as_ref() {
            return Ok(session.clone());
        }

        if let Some(session) = self.store.load() {
            debug!("Reusing stored session from {}", self.store.path().display());
            *cached = Some(session.clone());
            return Ok(session);
        }

        info!("Logging in to Twitter as {}...", &self.username);
        let request = client
            .request(Method::POST, "1.1/session/login")
            .json(&json!({ "username": &self.username, "password": &self.password }));
        let body = client.send(request).await.map_err(into_auth_failure)?;
        let login: LoginResponse = serde_json::from_value(body)?;

        let session = Session {
            token: login.auth_token,
            csrf_token: login.csrf_token,
        };
        if let Err(e) = self.store.save(&session) {
            warn!(
                "Failed to persist session to {}: {}",
                self.store.path().display(),
                e
            );
        }
        *cached = Some(session.clone());
        Ok(session)
    }

    async fn invalidate(&self) {
        self.cached.lock().await.take();
        if let Err(e) = self.store.clear() {
            warn!(
                "Failed to remove stale session {}: {}",
                self.store.path().display(),
                e
            );
        }
    }
}

/// Login endpoints report rejected credentials with assorted statuses.
///
fn into_auth_failure(error: FetchError) -> FetchError {
    match error {
        FetchError::NotFound | FetchError::Protected | FetchError::AuthRequired => {
            FetchError::AuthFailed
        }
        other => other,
    }
}

/// On-disk session token file, keyed by bot-instance name.
///
#[derive(Clone, Debug)]
pub struct SessionStore {
    base: PathBuf,
}

impl SessionStore {
    /// Returns a store for files named `{base}.tw_session`.
    ///
    pub fn new(base: impl Into<PathBuf>) -> Self {
        SessionStore { base: base.into() }
    }

    pub fn path(&self) -> PathBuf {
        with_extension(&self.base, SESSION_EXTENSION)
    }

    fn legacy_path(&self) -> PathBuf {
        with_extension(&self.base, LEGACY_SESSION_EXTENSION)
    }

    /// Rename a session saved under the old `.json` name, unless a
    /// `.tw_session` file already exists. Returns whether a rename happened.
    ///
    pub fn migrate(&self) -> io::Result<bool> {
        let legacy = self.legacy_path();
        let current = self.path();
        if legacy.is_file() && !current.is_file() {
            fs::rename(&legacy, &current)?;
            info!(
                "Renamed session file {} to {}",
                legacy.display(),
                current.display()
            );
            return Ok(true);
        }
        Ok(false)
    }

    /// Returns the stored session, if one exists and can be read.
    ///
    pub fn load(&self) -> Option<Session> {
        let path = self.path();
        let contents = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!("Ignoring unreadable session file {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> io::Result<()> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string(session)?;
        fs::write(path, contents)
    }

    pub fn clear(&self) -> io::Result<()> {
        match fs::remove_file(self.path()) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(extension);
    PathBuf::from(name)
}
