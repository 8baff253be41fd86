//! Bumble App Library
//!
//! The explicit application state behind the bumble-lite front end: who is
//! logged in, the feed being swiped, reactions, settings and uploads. One
//! [`App`] owns all of it; persistence goes through the
//! [`PersistenceGateway`](bumble_storage::PersistenceGateway).

pub mod app;
pub mod error;
pub mod feed;
pub mod likes;
pub mod session;

pub use app::{App, FeedLoad, SettingsForm};
pub use error::{AppError, AppResult};
pub use feed::{Feed, FeedState};
pub use likes::LikeBook;
