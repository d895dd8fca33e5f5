use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("Image codec error: {0}")]
    CodecError(#[from] image::ImageError),

    #[error("Unsupported rotation: {0} degrees (multiples of 90 only)")]
    UnsupportedRotation(i32),

    #[error("Invalid dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),
}
