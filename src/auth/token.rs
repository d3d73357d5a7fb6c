//! Access token lifecycle for the directory API.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::client::transport::{HttpRequest, HttpTransport};
use crate::{Error, Result};

/// Remaining lifetime below which a token is treated as expired.
pub const EXPIRY_MARGIN_SECS: i64 = 5;

/// Credentials used to obtain access tokens.
///
/// Secrets are never printed by `Debug`.
#[derive(Clone)]
pub enum Credentials {
    /// A bare refresh token
    RefreshToken(SecretString),
    /// A username paired with a refresh token
    UserRefreshToken {
        /// Account username
        username: String,
        /// Long-lived refresh token
        refresh_token: SecretString,
    },
    /// A username and password
    UserPassword {
        /// Account username
        username: String,
        /// Account password
        password: SecretString,
    },
}

impl Credentials {
    /// Credentials from a bare refresh token.
    pub fn refresh_token(refresh_token: impl Into<String>) -> Self {
        Credentials::RefreshToken(SecretString::from(refresh_token.into()))
    }

    /// Credentials from a username and refresh token.
    pub fn user_refresh_token(
        username: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Credentials::UserRefreshToken {
            username: username.into(),
            refresh_token: SecretString::from(refresh_token.into()),
        }
    }

    /// Credentials from a username and password.
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials::UserPassword {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::RefreshToken(_) => f
                .debug_tuple("RefreshToken")
                .field(&"[REDACTED]")
                .finish(),
            Credentials::UserRefreshToken { username, .. } => f
                .debug_struct("UserRefreshToken")
                .field("username", username)
                .field("refresh_token", &"[REDACTED]")
                .finish(),
            Credentials::UserPassword { username, .. } => f
                .debug_struct("UserPassword")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

/// A bearer token and the instant it stops being usable.
#[derive(Clone)]
pub(crate) struct AccessToken {
    value: SecretString,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Flattened credential fields; a grant is picked from whichever are set.
#[derive(Clone, Default)]
struct CredentialSet {
    username: Option<String>,
    refresh_token: Option<SecretString>,
    password: Option<SecretString>,
}

impl From<Credentials> for CredentialSet {
    fn from(creds: Credentials) -> Self {
        match creds {
            Credentials::RefreshToken(refresh_token) => Self {
                refresh_token: Some(refresh_token),
                ..Default::default()
            },
            Credentials::UserRefreshToken {
                username,
                refresh_token,
            } => Self {
                username: Some(username),
                refresh_token: Some(refresh_token),
                password: None,
            },
            Credentials::UserPassword { username, password } => Self {
                username: Some(username),
                password: Some(password),
                refresh_token: None,
            },
        }
    }
}

impl CredentialSet {
    /// Fields from `self` win; anything missing falls back to `stored`.
    fn or(self, stored: &CredentialSet) -> CredentialSet {
        CredentialSet {
            username: self.username.or_else(|| stored.username.clone()),
            refresh_token: self.refresh_token.or_else(|| stored.refresh_token.clone()),
            password: self.password.or_else(|| stored.password.clone()),
        }
    }

    fn grant(&self) -> Result<Grant<'_>> {
        match (&self.username, &self.refresh_token, &self.password) {
            (Some(username), Some(refresh_token), _) => Ok(Grant::RefreshToken {
                username: Some(username.as_str()),
                refresh_token,
            }),
            (Some(username), None, Some(password)) => Ok(Grant::Password { username, password }),
            (None, Some(refresh_token), _) => Ok(Grant::RefreshToken {
                username: None,
                refresh_token,
            }),
            _ => Err(Error::Auth(
                "no refresh token or username/password available".to_string(),
            )),
        }
    }
}

enum Grant<'a> {
    RefreshToken {
        username: Option<&'a str>,
        refresh_token: &'a SecretString,
    },
    Password {
        username: &'a str,
        password: &'a SecretString,
    },
}

impl Grant<'_> {
    fn name(&self) -> &'static str {
        match self {
            Grant::RefreshToken { .. } => "refresh_token",
            Grant::Password { .. } => "password",
        }
    }

    fn body(&self) -> String {
        match self {
            Grant::RefreshToken {
                username: Some(username),
                refresh_token,
            } => format!(
                "username={}&refresh_token={}&grant_type=refresh_token",
                username,
                refresh_token.expose_secret()
            ),
            Grant::RefreshToken {
                username: None,
                refresh_token,
            } => format!(
                "refresh_token={}&grant_type=refresh_token",
                refresh_token.expose_secret()
            ),
            Grant::Password { username, password } => format!(
                "username={}&password={}&grant_type=password",
                username,
                urlencoding::encode(password.expose_secret())
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    refresh_token: Option<String>,
}

struct TokenState {
    credentials: CredentialSet,
    token: Option<AccessToken>,
    headers: Option<HeaderMap>,
}

/// Hands out bearer tokens, refreshing them against the token endpoint
/// when they are missing or about to expire.
///
/// # Thread Safety
///
/// Cloning shares state. The check-then-refresh sequence runs under one
/// lock, so concurrent callers trigger a single refresh.
#[derive(Clone)]
pub struct TokenManager {
    state: Arc<Mutex<TokenState>>,
    transport: Arc<dyn HttpTransport>,
    token_url: String,
}

impl TokenManager {
    pub(crate) fn new(
        credentials: Credentials,
        token_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(TokenState {
                credentials: credentials.into(),
                token: None,
                headers: None,
            })),
            transport,
            token_url: token_url.into(),
        }
    }

    /// Seed the manager with a token obtained elsewhere.
    pub async fn set_token(&self, value: impl Into<String>, expires_at: DateTime<Utc>) {
        let mut state = self.state.lock().await;
        state.token = Some(AccessToken {
            value: SecretString::from(value.into()),
            expires_at,
        });
        state.headers = None;
    }

    /// Whether the stored token has more than the expiry margin left.
    ///
    /// Never performs I/O.
    pub async fn is_valid(&self) -> bool {
        let state = self.state.lock().await;
        state
            .token
            .as_ref()
            .is_some_and(|t| t.is_valid_at(Utc::now()))
    }

    /// Expiry of the stored token, if any.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.state.lock().await.token.as_ref().map(|t| t.expires_at)
    }

    /// Drop the stored token and cached headers.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.token = None;
        state.headers = None;
    }

    /// Return a usable access token, fetching a new one if needed.
    ///
    /// `credentials` override the stored ones field by field for this
    /// call; a rotated refresh token from the response is stored either
    /// way.
    ///
    /// # Errors
    ///
    /// [`Error::Auth`] when no grant can be formed or the token endpoint
    /// rejects the request.
    pub async fn valid_token(&self, credentials: Option<&Credentials>) -> Result<String> {
        let mut state = self.state.lock().await;
        self.ensure_token(&mut state, credentials).await?;
        match &state.token {
            Some(token) => Ok(token.value.expose_secret().to_string()),
            None => Err(Error::Auth("token endpoint returned no token".to_string())),
        }
    }

    /// Standard request headers including `Authorization: Bearer`.
    ///
    /// The map is built once per token and reused until the token stops
    /// being valid.
    pub async fn auth_headers(&self) -> Result<HeaderMap> {
        let mut state = self.state.lock().await;
        let fresh = state
            .token
            .as_ref()
            .is_some_and(|t| t.is_valid_at(Utc::now()));

        if fresh {
            if let Some(headers) = &state.headers {
                return Ok(headers.clone());
            }
        } else {
            state.headers = None;
            self.ensure_token(&mut state, None).await?;
        }

        let token = state
            .token
            .as_ref()
            .ok_or_else(|| Error::Auth("token endpoint returned no token".to_string()))?;
        let headers = bearer_headers(token.value.expose_secret())?;
        state.headers = Some(headers.clone());
        Ok(headers)
    }

    async fn ensure_token(
        &self,
        state: &mut TokenState,
        credentials: Option<&Credentials>,
    ) -> Result<()> {
        if state
            .token
            .as_ref()
            .is_some_and(|t| t.is_valid_at(Utc::now()))
        {
            return Ok(());
        }

        let effective = match credentials {
            Some(creds) => CredentialSet::from(creds.clone()).or(&state.credentials),
            None => state.credentials.clone(),
        };
        let grant = effective.grant()?;
        tracing::info!(grant = grant.name(), url = %self.token_url, "requesting access token");

        let response = self
            .transport
            .send(HttpRequest {
                method: Method::POST,
                url: self.token_url.clone(),
                headers: json_headers(),
                body: Some(grant.body().into_bytes()),
            })
            .await?;

        if !response.is_success() {
            return Err(Error::Auth(format!(
                "token request failed ({}): {}",
                response.status,
                response.text()
            )));
        }

        let token: TokenResponse = serde_json::from_slice(&response.body)?;
        let expires_at = Duration::try_seconds(token.expires_in)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| {
                Error::Auth(format!(
                    "token endpoint returned an out-of-range expires_in: {}",
                    token.expires_in
                ))
            })?;
        state.token = Some(AccessToken {
            value: SecretString::from(token.access_token),
            expires_at,
        });
        state.headers = None;
        if let Some(rotated) = token.refresh_token {
            tracing::debug!("storing rotated refresh token");
            state.credentials.refresh_token = Some(SecretString::from(rotated));
        }

        Ok(())
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

fn json_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn bearer_headers(token: &str) -> Result<HeaderMap> {
    let mut headers = json_headers();
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| Error::Auth("access token is not a valid header value".to_string()))?;
    value.set_sensitive(true);
    headers.insert(AUTHORIZATION, value);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::transport::MockTransport;
    use serde_json::json;

    const TOKEN_URL: &str = "https://auth.test/oauth/token";

    fn manager(credentials: Credentials) -> (TokenManager, MockTransport) {
        let transport = MockTransport::new();
        let manager = TokenManager::new(credentials, TOKEN_URL, Arc::new(transport.clone()));
        (manager, transport)
    }

    fn push_token(transport: &MockTransport, token: &str, refresh: Option<&str>) {
        let mut body = json!({"access_token": token, "expires_in": 3600});
        if let Some(r) = refresh {
            body["refresh_token"] = json!(r);
        }
        transport.push_json(Method::POST, TOKEN_URL, 200, body);
    }

    fn body_of(request: &HttpRequest) -> String {
        String::from_utf8(request.body.clone().unwrap_or_default()).unwrap()
    }

    #[test]
    fn test_validity_margin() {
        let now = Utc::now();
        let token = |secs| AccessToken {
            value: SecretString::from("t".to_string()),
            expires_at: now + Duration::seconds(secs),
        };

        assert!(token(6).is_valid_at(now));
        assert!(!token(5).is_valid_at(now));
        assert!(!token(0).is_valid_at(now));
        assert!(!token(-30).is_valid_at(now));
    }

    #[tokio::test]
    async fn test_valid_token_skips_network_when_fresh() {
        let (manager, transport) = manager(Credentials::password("ada", "pw"));
        manager
            .set_token("cached", Utc::now() + Duration::seconds(600))
            .await;

        assert!(manager.is_valid().await);
        assert_eq!(manager.valid_token(None).await.unwrap(), "cached");
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_near_expiry_triggers_one_refresh() {
        let (manager, transport) = manager(Credentials::user_refresh_token("ada", "r1"));
        manager
            .set_token("stale", Utc::now() + Duration::seconds(5))
            .await;
        push_token(&transport, "fresh", None);

        assert!(!manager.is_valid().await);
        assert_eq!(manager.valid_token(None).await.unwrap(), "fresh");
        assert_eq!(manager.valid_token(None).await.unwrap(), "fresh");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            body_of(&requests[0]),
            "username=ada&refresh_token=r1&grant_type=refresh_token"
        );
        assert_eq!(
            requests[0].headers.get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(requests[0].headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_password_is_percent_encoded() {
        let (manager, transport) = manager(Credentials::password("ada", "p@ss w&rd/="));
        push_token(&transport, "tok", None);

        manager.valid_token(None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            body_of(&requests[0]),
            "username=ada&password=p%40ss%20w%26rd%2F%3D&grant_type=password"
        );
    }

    #[tokio::test]
    async fn test_refresh_grant_preferred_over_password() {
        let (manager, transport) = manager(Credentials::password("ada", "pw"));
        push_token(&transport, "tok", None);

        manager
            .valid_token(Some(&Credentials::refresh_token("override")))
            .await
            .unwrap();

        assert_eq!(
            body_of(&transport.requests()[0]),
            "username=ada&refresh_token=override&grant_type=refresh_token"
        );
    }

    #[tokio::test]
    async fn test_rotated_refresh_token_is_stored() {
        let (manager, transport) = manager(Credentials::password("ada", "pw"));
        push_token(&transport, "first", Some("rotated"));
        push_token(&transport, "second", None);

        manager.valid_token(None).await.unwrap();
        manager.invalidate().await;
        assert_eq!(manager.valid_token(None).await.unwrap(), "second");

        let requests = transport.requests();
        assert_eq!(
            body_of(&requests[1]),
            "username=ada&refresh_token=rotated&grant_type=refresh_token"
        );
    }

    #[tokio::test]
    async fn test_bare_refresh_token_grant() {
        let (manager, transport) = manager(Credentials::refresh_token("r0"));
        push_token(&transport, "tok", None);

        manager.valid_token(None).await.unwrap();
        assert_eq!(
            body_of(&transport.requests()[0]),
            "refresh_token=r0&grant_type=refresh_token"
        );
    }

    #[tokio::test]
    async fn test_token_endpoint_failure_is_auth_error() {
        let (manager, transport) = manager(Credentials::password("ada", "wrong"));
        transport.push_json(Method::POST, TOKEN_URL, 401, json!({"error": "invalid_grant"}));

        let err = manager.valid_token(None).await.unwrap_err();
        assert!(matches!(err, Error::Auth(ref m) if m.contains("invalid_grant")));
        assert!(!manager.is_valid().await);
    }

    #[tokio::test]
    async fn test_auth_headers_cached_until_expiry() {
        let (manager, transport) = manager(Credentials::user_refresh_token("ada", "r1"));
        push_token(&transport, "tok-1", None);

        let headers = manager.auth_headers().await.unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-1");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");

        manager.auth_headers().await.unwrap();
        assert_eq!(transport.requests().len(), 1);

        manager
            .set_token("tok-old", Utc::now() - Duration::seconds(1))
            .await;
        push_token(&transport, "tok-2", None);
        let headers = manager.auth_headers().await.unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok-2");
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_out_of_range_expires_in_is_auth_error() {
        let (manager, transport) = manager(Credentials::refresh_token("r"));
        for expires_in in [1_000_000_000_000_000i64, 9_000_000_000_000_000] {
            transport.push_json(
                Method::POST,
                TOKEN_URL,
                200,
                json!({"access_token": "x", "expires_in": expires_in}),
            );
            let err = manager.valid_token(None).await.unwrap_err();
            assert!(matches!(err, Error::Auth(ref m) if m.contains("expires_in")));
            assert!(!manager.is_valid().await);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_share_one_refresh() {
        let (manager, transport) = manager(Credentials::user_refresh_token("ada", "r1"));
        push_token(&transport, "shared", None);

        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..8 {
            let manager = manager.clone();
            tasks.spawn(async move { manager.valid_token(None).await });
        }
        while let Some(result) = tasks.join_next().await {
            assert_eq!(result.unwrap().unwrap(), "shared");
        }

        assert_eq!(transport.requests().len(), 1);
    }

    #[test]
    fn test_credentials_debug_redacts_secrets() {
        let debug_str = format!("{:?}", Credentials::password("ada", "super-secret"));
        assert!(!debug_str.contains("super-secret"));
        assert!(debug_str.contains("REDACTED"));
        assert!(debug_str.contains("ada"));
    }
}
