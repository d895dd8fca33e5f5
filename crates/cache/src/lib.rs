mod models;
mod manager;
mod errors;

pub use models::{Thumbnail, ThumbnailManager};
pub use errors::ThumbnailError;
