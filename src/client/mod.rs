//! HTTP client and service layer for the IG REST API.
//!
//! [`IgClient`] is the entry point. It owns the connection pool and the
//! shared session; resource areas are reached through its services.
//!
//! # Example
//!
//! ```no_run
//! use ig_rest::{ClientConfig, Credentials, IgClient};
//!
//! # async fn example() -> ig_rest::Result<()> {
//! let credentials = Credentials::new("identifier", "password", "api-key", "demo");
//! let client = IgClient::login_with_config(credentials, ClientConfig::default()).await?;
//!
//! let watchlists = client.watchlists().list().await?;
//! # Ok(())
//! # }
//! ```

mod config;
mod http;
pub mod paginated;

pub use config::{ClientConfig, Credentials, ParamEncoding};
pub use http::{IgClient, Method, RawResponse};
pub use paginated::{PageCursor, PageData, DEFAULT_PAGE_SIZE};
pub(crate) use http::{path_segment, ClientInner};
