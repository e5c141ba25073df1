//! Session state shared by every request of one authenticated context.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::{AccountNumber, ApiVersion, Error, Result};

/// Response/request header carrying the client session token.
pub const CST: &str = "CST";
/// Response/request header carrying the account security token.
pub const X_SECURITY_TOKEN: &str = "X-SECURITY-TOKEN";

const X_IG_API_KEY: HeaderName = HeaderName::from_static("x-ig-api-key");
const VERSION: HeaderName = HeaderName::from_static("version");
const CST_HEADER: HeaderName = HeaderName::from_static("cst");
const X_SECURITY_TOKEN_HEADER: HeaderName = HeaderName::from_static("x-security-token");

/// Authentication state for the IG API.
///
/// Holds the API key and, after a successful login, the `CST` and
/// `X-SECURITY-TOKEN` tokens that every later request must carry.
///
/// # Thread Safety
///
/// Clones share the same state, so one session can back several clients.
/// Requests hold a read lock while building headers and sending; logins
/// take the write lock, so a token update never lands halfway through a
/// request.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<SessionInner>>,
}

pub(crate) struct SessionInner {
    api_key: SecretString,
    cst: Option<SecretString>,
    security_token: Option<SecretString>,
    current_account: Option<AccountNumber>,
}

impl Session {
    /// Create an unauthenticated session for an API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_secret(SecretString::from(api_key.into()))
    }

    pub(crate) fn from_secret(api_key: SecretString) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner {
                api_key,
                cst: None,
                security_token: None,
                current_account: None,
            })),
        }
    }

    /// Returns `true` once both security tokens are present.
    pub async fn is_authenticated(&self) -> bool {
        let inner = self.inner.read().await;
        inner.cst.is_some() && inner.security_token.is_some()
    }

    /// Returns `true` if a `CST` token is set.
    pub async fn has_cst(&self) -> bool {
        self.inner.read().await.cst.is_some()
    }

    /// Returns `true` if an `X-SECURITY-TOKEN` is set.
    pub async fn has_security_token(&self) -> bool {
        self.inner.read().await.security_token.is_some()
    }

    /// Account the session is currently dealing on, as reported at login
    /// or by the last account switch.
    pub async fn current_account(&self) -> Option<AccountNumber> {
        self.inner.read().await.current_account.clone()
    }

    /// Forget both tokens and the current account.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.cst = None;
        inner.security_token = None;
        inner.current_account = None;
    }

    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, SessionInner> {
        self.inner.read().await
    }

    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, SessionInner> {
        self.inner.write().await
    }
}

impl SessionInner {
    /// Headers for one request: API key, content negotiation, the
    /// per-call version and whichever security tokens are set.
    pub(crate) fn headers(&self, version: ApiVersion) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(X_IG_API_KEY, secret_value(&self.api_key, "X-IG-API-KEY")?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json; charset=UTF-8"),
        );
        headers.insert(VERSION, HeaderValue::from(u16::from(version.get())));

        if let Some(cst) = &self.cst {
            headers.insert(CST_HEADER, secret_value(cst, CST)?);
        }
        if let Some(token) = &self.security_token {
            headers.insert(X_SECURITY_TOKEN_HEADER, secret_value(token, X_SECURITY_TOKEN)?);
        }

        Ok(headers)
    }

    /// Capture the security tokens from a login response.
    ///
    /// A missing header leaves the corresponding token untouched unless
    /// `strict` is set, in which case nothing is stored and the call fails.
    pub(crate) fn apply_security_headers(&mut self, response: &HeaderMap, strict: bool) -> Result<()> {
        let cst = header_text(response, CST)?;
        let token = header_text(response, X_SECURITY_TOKEN)?;

        if strict {
            if cst.is_none() {
                return Err(Error::MissingSecurityToken(CST));
            }
            if token.is_none() {
                return Err(Error::MissingSecurityToken(X_SECURITY_TOKEN));
            }
        }

        match cst {
            Some(value) => {
                self.cst = Some(SecretString::from(value));
                tracing::debug!("CST set");
            }
            None => tracing::warn!("Login response carried no CST header"),
        }
        match token {
            Some(value) => {
                self.security_token = Some(SecretString::from(value));
                tracing::debug!("X-SECURITY-TOKEN set");
            }
            None => tracing::warn!("Login response carried no X-SECURITY-TOKEN header"),
        }

        Ok(())
    }

    /// Replace whichever tokens a later response re-issued. IG sends a
    /// fresh `X-SECURITY-TOKEN` after an account switch.
    pub(crate) fn refresh_tokens(&mut self, response: &HeaderMap) -> Result<()> {
        if let Some(value) = header_text(response, CST)? {
            self.cst = Some(SecretString::from(value));
        }
        if let Some(value) = header_text(response, X_SECURITY_TOKEN)? {
            self.security_token = Some(SecretString::from(value));
        }
        Ok(())
    }

    pub(crate) fn set_current_account(&mut self, account: Option<AccountNumber>) {
        self.current_account = account;
    }

    pub(crate) fn clear_tokens(&mut self) {
        self.cst = None;
        self.security_token = None;
        self.current_account = None;
    }
}

fn secret_value(secret: &SecretString, name: &'static str) -> Result<HeaderValue> {
    let mut value =
        HeaderValue::from_str(secret.expose_secret()).map_err(|_| Error::InvalidHeader(name))?;
    value.set_sensitive(true);
    Ok(value)
}

fn header_text(headers: &HeaderMap, name: &'static str) -> Result<Option<String>> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map(str::to_string)
                .map_err(|_| Error::InvalidHeader(name))
        })
        .transpose()
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_key", &"[REDACTED]")
            .field("cst", &"[REDACTED]")
            .field("security_token", &"[REDACTED]")
            .finish()
    }
}
