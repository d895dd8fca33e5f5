mod models;
mod volume;
mod registry;
mod errors;

pub use models::{FullPath, RootRegistry, RootVolume, TOKEN_DELIMITER, VOLUME_PREFIX};
pub use errors::VolumeError;
