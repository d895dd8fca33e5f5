mod models;
mod editor;
mod errors;

pub use models::{DefaultPictureEditor, EncodedImage, PictureEditor};
pub use errors::ImageError;
