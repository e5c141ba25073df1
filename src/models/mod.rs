//! Data models for the IG API.
//!
//! - [`primitives`] - identifiers like `Epic` and `DealId`, `ApiVersion`, `Environment`
//! - [`enums`] - wire enums (resolution, direction, order types, ...)
//! - [`market`] - price history and market navigation
//! - [`account`] - preferences and watchlist acknowledgements
//! - [`dealing`] - position and working-order requests, deal confirmations

pub mod primitives;
pub mod enums;
pub mod market;
pub mod account;
pub mod dealing;

pub use primitives::*;
pub use enums::*;
pub use market::*;
pub use account::*;
pub use dealing::*;
