//! Data models for the application

mod account;
mod image;
mod like;
mod session;

pub use account::{Account, ParseAccountError};
pub use image::ImageItem;
pub use like::LikeKind;
pub use session::Session;
