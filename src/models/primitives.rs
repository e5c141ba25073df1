//! Primitive types and newtypes for type-safe API interactions.
//!
//! IG identifies instruments, deals and watchlists with opaque strings.
//! The newtypes here keep them from being mixed up at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a string.
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// IG's identifier for a tradable instrument.
    ///
    /// ```
    /// use ig_rest::Epic;
    ///
    /// let epic = Epic::new("CS.D.GBPUSD.TODAY.IP");
    /// assert_eq!(epic.as_str(), "CS.D.GBPUSD.TODAY.IP");
    /// ```
    Epic
);

string_id!(
    /// Identifier of an open position or working order.
    DealId
);

string_id!(
    /// Token for a submitted action, exchanged later for a deal confirmation.
    DealReference
);

string_id!(
    /// Identifier of a watchlist.
    WatchlistId
);

string_id!(
    /// An IG account identifier (e.g. `"ABC12"`).
    AccountNumber
);

string_id!(
    /// Identifier of a market navigation node.
    NodeId
);

/// Value of the per-request `VERSION` header.
///
/// IG versions each endpoint independently with a small positive integer.
///
/// ```
/// use ig_rest::ApiVersion;
///
/// assert_eq!(ApiVersion::V2.to_string(), "2");
/// assert!(ApiVersion::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApiVersion(u8);

impl ApiVersion {
    /// Version 1.
    pub const V1: ApiVersion = ApiVersion(1);
    /// Version 2.
    pub const V2: ApiVersion = ApiVersion(2);
    /// Version 3.
    pub const V3: ApiVersion = ApiVersion(3);

    /// Create an API version, rejecting zero.
    pub fn new(version: u8) -> crate::Result<Self> {
        if version == 0 {
            return Err(crate::Error::InvalidInput(
                "API version must be at least 1".to_string(),
            ));
        }
        Ok(ApiVersion(version))
    }

    /// The numeric version.
    pub fn get(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which IG gateway to talk to.
///
/// ```
/// use ig_rest::Environment;
///
/// assert_eq!(Environment::from_account_type("LIVE"), Environment::Live);
/// assert_eq!(Environment::from_account_type("spreadbet"), Environment::Demo);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Live trading with real money.
    Live,
    /// Demo account.
    #[default]
    Demo,
}

impl Environment {
    /// Select the environment from a configured account type.
    ///
    /// Only `"live"` (any case) selects [`Environment::Live`]; every other
    /// value selects the demo gateway.
    pub fn from_account_type(account_type: &str) -> Self {
        if account_type.eq_ignore_ascii_case("live") {
            Environment::Live
        } else {
            Environment::Demo
        }
    }

    /// Get the base URL for REST API requests.
    pub fn api_base_url(&self) -> &'static str {
        match self {
            Environment::Live => "https://api.ig.com/gateway/deal",
            Environment::Demo => "https://demo-api.ig.com/gateway/deal",
        }
    }

    /// Returns `true` for the live gateway.
    pub fn is_live(&self) -> bool {
        matches!(self, Environment::Live)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Live => write!(f, "live"),
            Environment::Demo => write!(f, "demo"),
        }
    }
}
