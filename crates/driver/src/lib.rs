mod models;
mod dispatcher;
mod commands;
mod errors;

pub use models::{Dispatcher, UploadFile, UploadOptions, ZIP_MIME};
pub use errors::DriverError;
