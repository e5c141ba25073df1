//! HTTP client implementation for the IG API.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

use crate::api::{AccountsService, DealingService, MarketDataService, WatchlistsService};
use crate::auth::Session;
use crate::{AccountNumber, ApiVersion, Environment, Error, Result};

use super::config::{ClientConfig, Credentials, ParamEncoding};

/// Header IG reads to treat a POST as a DELETE that carries a body.
const METHOD_OVERRIDE: &str = "_method";

/// The main client for interacting with the IG API.
///
/// The client owns the HTTP connection pool and the shared [`Session`],
/// and hands out one service per resource area.
///
/// # Example
///
/// ```no_run
/// use ig_rest::{Credentials, IgClient};
///
/// # async fn example() -> ig_rest::Result<()> {
/// let client = IgClient::login(Credentials::from_env()?).await?;
///
/// let accounts = client.accounts().list().await?;
/// println!("{} accounts", accounts.len());
///
/// let prefs = client.accounts().preferences().await?;
/// println!("trailing stops: {}", prefs.trailing_stops_enabled);
/// # Ok(())
/// # }
/// ```
pub struct IgClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) session: Session,
    pub(crate) config: ClientConfig,
    pub(crate) credentials: Credentials,
    base_url: String,
}

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET; parameters go in the query string
    Get,
    /// POST with a JSON body
    Post,
    /// PUT with a JSON body
    Put,
    /// DELETE with an optional JSON body, sent as a POST carrying the
    /// `_method: DELETE` override header
    Delete,
}

impl Method {
    fn has_body(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        })
    }
}

/// An uninterpreted API response.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body text
    pub body: String,
}

impl RawResponse {
    /// Decode the body of a 200 response, or turn any other status into
    /// [`Error::Api`] for `endpoint`.
    pub fn json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        if self.status != StatusCode::OK {
            return Err(Error::from_api_response(
                endpoint,
                self.status.as_u16(),
                &self.body,
            ));
        }
        if self.body.trim().is_empty() {
            return Ok(serde_json::from_value(Value::Null)?);
        }
        Ok(serde_json::from_str(&self.body)?)
    }
}

impl IgClient {
    /// Create an unauthenticated client. Call
    /// [`authenticate`](Self::authenticate) before any other request.
    pub fn new(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let session = Session::from_secret(credentials.api_key().clone());
        Self::with_session(session, credentials, config)
    }

    /// Create a client and log in.
    pub async fn login(credentials: Credentials) -> Result<Self> {
        Self::login_with_config(credentials, ClientConfig::default()).await
    }

    /// Create a client with custom configuration and log in.
    ///
    /// If the credentials name an account other than the one IG logged
    /// into, the session is switched to it.
    pub async fn login_with_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let client = Self::new(credentials, config)?;
        client.authenticate().await?;

        if let Some(wanted) = client.inner.credentials.account_number() {
            if client.inner.session.current_account().await.as_ref() != Some(wanted) {
                client.switch_account(wanted, false).await?;
            }
        }
        Ok(client)
    }

    /// Create a client over an existing, possibly shared, session.
    pub fn with_session(
        session: Session,
        credentials: Credentials,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let base_url = match &config.base_url {
            Some(url) => {
                Url::parse(url)?;
                url.trim_end_matches('/').to_string()
            }
            None => credentials.environment().api_base_url().to_string(),
        };

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                session,
                config,
                credentials,
                base_url,
            }),
        })
    }

    /// Log in and store the security tokens on the session.
    ///
    /// On a 200 response the `CST` and `X-SECURITY-TOKEN` headers are
    /// stored. A missing header is logged and skipped unless
    /// [`ClientConfig::strict_auth`] is set. Any other status fails with
    /// [`Error::Authentication`] carrying the raw body.
    pub async fn authenticate(&self) -> Result<()> {
        let inner = &self.inner;
        let body = serde_json::json!({
            "identifier": inner.credentials.identifier(),
            "password": inner.credentials.password(),
        });

        let response = inner
            .request(Method::Post, "/session", ApiVersion::V2, Some(&body))
            .await?;

        if response.status != StatusCode::OK {
            return Err(Error::Authentication {
                status: response.status.as_u16(),
                body: response.body,
            });
        }

        let account = serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|v| v.get("currentAccountId")?.as_str().map(AccountNumber::from));

        let mut session = inner.session.write().await;
        session.apply_security_headers(&response.headers, inner.config.strict_auth)?;
        tracing::info!(
            identifier = inner.credentials.identifier(),
            account = ?account,
            "Authenticated with IG"
        );
        session.set_current_account(account);
        Ok(())
    }

    /// Switch the session to another account.
    pub async fn switch_account(&self, account: &AccountNumber, make_default: bool) -> Result<()> {
        let inner = &self.inner;
        let body = serde_json::json!({
            "accountId": account,
            "defaultAccount": make_default,
        });

        let response = inner
            .request(Method::Put, "/session", ApiVersion::V1, Some(&body))
            .await?;
        let _: Value = response.json("/session")?;

        let mut session = inner.session.write().await;
        session.refresh_tokens(&response.headers)?;
        session.set_current_account(Some(account.clone()));
        tracing::info!(account = %account, "Switched IG account");
        Ok(())
    }

    /// Log out and forget the security tokens.
    pub async fn logout(&self) -> Result<()> {
        let inner = &self.inner;
        let response = inner
            .request(Method::Delete, "/session", ApiVersion::V1, None)
            .await?;

        // IG answers a logout with 204 No Content.
        if !response.status.is_success() {
            return Err(Error::from_api_response(
                "/session",
                response.status.as_u16(),
                &response.body,
            ));
        }

        inner.session.write().await.clear_tokens();
        tracing::info!("Logged out of IG");
        Ok(())
    }

    /// Issue a request and return the response uninterpreted.
    ///
    /// `endpoint` is appended to the base URL as is. `params` go in the
    /// query string for GET and in the JSON body otherwise.
    pub async fn raw_request<P: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        version: ApiVersion,
        params: Option<&P>,
    ) -> Result<RawResponse> {
        let params = params.map(serde_json::to_value).transpose()?;
        self.inner
            .request(method, endpoint, version, params.as_ref())
            .await
    }

    /// Get the market data service.
    pub fn market_data(&self) -> MarketDataService {
        MarketDataService::new(self.inner.clone())
    }

    /// Get the accounts and history service.
    pub fn accounts(&self) -> AccountsService {
        AccountsService::new(self.inner.clone())
    }

    /// Get the watchlists service.
    pub fn watchlists(&self) -> WatchlistsService {
        WatchlistsService::new(self.inner.clone())
    }

    /// Get the dealing service.
    pub fn dealing(&self) -> DealingService {
        DealingService::new(self.inner.clone())
    }

    /// Get a reference to the session.
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// The gateway selected by the credentials.
    pub fn environment(&self) -> Environment {
        self.inner.credentials.environment()
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }
}

impl ClientInner {
    fn url(&self, method: Method, endpoint: &str, params: Option<&Value>) -> Result<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, endpoint))?;

        if method.has_body() {
            return Ok(url);
        }

        match (params, self.config.param_encoding) {
            (None, _) | (Some(Value::Null), _) => {}
            (Some(params), ParamEncoding::JsonText) => url.set_query(Some(&params.to_string())),
            (Some(Value::Object(map)), ParamEncoding::Query) => {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in map {
                    if let Some(text) = query_text(value) {
                        pairs.append_pair(key, &text);
                    }
                }
            }
            (Some(other), ParamEncoding::Query) => {
                return Err(Error::InvalidInput(format!(
                    "query parameters must be a JSON object, got {other}"
                )));
            }
        }

        Ok(url)
    }

    /// Send one request with the session's current headers.
    ///
    /// The session read lock is held until the response arrives.
    pub(crate) async fn request(
        &self,
        method: Method,
        endpoint: &str,
        version: ApiVersion,
        params: Option<&Value>,
    ) -> Result<RawResponse> {
        let url = self.url(method, endpoint, params)?;

        let session = self.session.read().await;
        let headers = session.headers(version)?;

        let mut builder = match method {
            Method::Get => self.http.get(url),
            Method::Post | Method::Delete => self.http.post(url),
            Method::Put => self.http.put(url),
        }
        .headers(headers);

        if method == Method::Delete {
            builder = builder.header(METHOD_OVERRIDE, "DELETE");
        }
        if let (true, Some(body)) = (method.has_body(), params) {
            builder = builder.json(body);
        }

        tracing::debug!(%method, endpoint, %version, "Sending IG request");
        let response = builder.send().await?;
        drop(session);

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        tracing::debug!(status = status.as_u16(), endpoint, "Received IG response");

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }

    /// Make a GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str, version: ApiVersion) -> Result<T> {
        self.request(Method::Get, endpoint, version, None)
            .await?
            .json(endpoint)
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_with_query<T: DeserializeOwned, Q: Serialize>(
        &self,
        endpoint: &str,
        version: ApiVersion,
        query: &Q,
    ) -> Result<T> {
        let params = serde_json::to_value(query)?;
        self.request(Method::Get, endpoint, version, Some(&params))
            .await?
            .json(endpoint)
    }

    /// Make a POST request.
    pub(crate) async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        version: ApiVersion,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::Post, endpoint, version, Some(&body))
            .await?
            .json(endpoint)
    }

    /// Make a PUT request.
    pub(crate) async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        version: ApiVersion,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(Method::Put, endpoint, version, Some(&body))
            .await?
            .json(endpoint)
    }

    /// Make a DELETE request, with an optional body.
    pub(crate) async fn delete<T: DeserializeOwned, B: Serialize>(
        &self,
        endpoint: &str,
        version: ApiVersion,
        body: Option<&B>,
    ) -> Result<T> {
        let body = body.map(serde_json::to_value).transpose()?;
        self.request(Method::Delete, endpoint, version, body.as_ref())
            .await?
            .json(endpoint)
    }
}

fn query_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(query_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

/// Percent-encode a value for use as one path segment.
pub(crate) fn path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl Clone for IgClient {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl fmt::Debug for IgClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgClient")
            .field("base_url", &self.inner.base_url)
            .field("config", &self.inner.config)
            .finish()
    }
}
