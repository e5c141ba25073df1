//! Authentication and session management for the IG API.
//!
//! IG authenticates with a login (`POST /session`) whose response
//! headers carry two tokens, `CST` and `X-SECURITY-TOKEN`. Both are
//! stored in a [`Session`] and attached to every later request.
//!
//! ```no_run
//! use ig_rest::{Credentials, IgClient};
//!
//! # async fn example() -> ig_rest::Result<()> {
//! let client = IgClient::login(Credentials::from_env()?).await?;
//! assert!(client.session().is_authenticated().await);
//! # Ok(())
//! # }
//! ```
//!
//! A session can be shared between clients:
//!
//! ```no_run
//! use ig_rest::{ClientConfig, Credentials, IgClient};
//!
//! # async fn example() -> ig_rest::Result<()> {
//! let credentials = Credentials::from_env()?;
//! let first = IgClient::login(credentials.clone()).await?;
//! let second = IgClient::with_session(
//!     first.session().clone(),
//!     credentials,
//!     ClientConfig::default(),
//! )?;
//! # Ok(())
//! # }
//! ```

mod session;

pub use session::{Session, CST, X_SECURITY_TOKEN};
