//! Process-wide authentication state.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};
use tracing::info;

use crate::error::ClientError;
use crate::kv::{KeyValueStore, load_json, save_json};

const SESSION_KEY: &str = "session";

/// Account record returned by login and OTP verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.firstname, self.lastname);
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}

/// Body of a successful login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: UserProfile,
}

fn default_token_type() -> String {
    "bearer".into()
}

/// Immutable credentials of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub token_type: String,
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub expires_at: Option<OffsetDateTime>,
    pub user: UserProfile,
}

impl Session {
    /// An `expires_in` past the representable date range means no expiry;
    /// one before it means already expired.
    pub fn from_login(response: LoginResponse, now: OffsetDateTime) -> Self {
        Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_at: response
                .expires_in
                .and_then(|seconds| match now.checked_add(Duration::seconds(seconds)) {
                    None if seconds < 0 => Some(now),
                    expires_at => expires_at,
                }),
            user: response.user,
        }
    }

    pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    /// `Authorization` header value, e.g. `Bearer abc`.
    pub fn authorization(&self) -> String {
        let scheme = match self.token_type.to_ascii_lowercase().as_str() {
            "bearer" | "" => "Bearer".to_string(),
            _ => self.token_type.clone(),
        };
        format!("{scheme} {}", self.access_token)
    }
}

/// Holds the one current [`Session`], persisted under a single key.
pub struct AuthContext {
    store: Arc<dyn KeyValueStore>,
    current: RwLock<Option<Arc<Session>>>,
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("authenticated", &self.current().is_some())
            .finish()
    }
}

impl AuthContext {
    pub fn anonymous(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    /// Restores a persisted session, if any.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, ClientError> {
        let session: Option<Session> = load_json(store.as_ref(), SESSION_KEY)?;
        Ok(Self {
            store,
            current: RwLock::new(session.map(Arc::new)),
        })
    }

    pub fn login(&self, response: LoginResponse) -> Result<Arc<Session>, ClientError> {
        let session = Session::from_login(response, OffsetDateTime::now_utc());
        info!(user = %session.user.email, "signed in");
        self.replace(session)
    }

    /// Swaps in a renewed token. The response must belong to the signed-in
    /// user; anything else leaves the current session untouched.
    pub fn refresh(&self, response: LoginResponse) -> Result<Arc<Session>, ClientError> {
        let current = self
            .current()
            .ok_or_else(|| ClientError::Auth("no session to refresh".into()))?;
        if current.user.id != response.user.id {
            return Err(ClientError::Auth(format!(
                "refreshed token belongs to user '{}', not '{}'",
                response.user.id, current.user.id
            )));
        }
        self.replace(Session::from_login(response, OffsetDateTime::now_utc()))
    }

    pub fn logout(&self) -> Result<(), ClientError> {
        self.store.remove(SESSION_KEY)?;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("signed out");
        Ok(())
    }

    pub fn current(&self) -> Option<Arc<Session>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current()
            .is_some_and(|session| session.is_valid_at(OffsetDateTime::now_utc()))
    }

    /// Header value for an authenticated call; fails before any I/O when
    /// there is no usable session.
    pub fn authorization(&self) -> Result<String, ClientError> {
        let session = self
            .current()
            .ok_or_else(|| ClientError::Auth("not signed in".into()))?;
        if !session.is_valid_at(OffsetDateTime::now_utc()) {
            return Err(ClientError::Auth("session expired".into()));
        }
        Ok(session.authorization())
    }

    fn replace(&self, session: Session) -> Result<Arc<Session>, ClientError> {
        save_json(self.store.as_ref(), SESSION_KEY, &session)?;
        let session = Arc::new(session);
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(session)
    }
}
