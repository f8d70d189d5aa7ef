pub mod application;
mod error;
pub mod filter;
pub mod listing;
pub mod opportunity;
pub mod session;
pub mod stats;
mod tracker;
pub mod user;
mod validation;

pub use error::{Error, Result};
pub use listing::{Freshness, Keyed, Listing};
pub use session::{AdminIdentity, AdminSession, SESSION_COOKIE_NAME, SessionInfo};
pub use tracker::{RequestTracker, Ticket};
pub use validation::ValidationError;

#[doc(hidden)]
pub use anyhow::anyhow as internal_anyhow_dont_use;
