use super::errors::ImageError;

/// Encoded image bytes with the mime type they were written as
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

/// Image operations on encoded bytes. Implementations are synchronous and CPU bound,
/// callers run them on a blocking thread.
pub trait PictureEditor: Send + Sync {
    fn crop(&self, data: &[u8], x: u32, y: u32, width: u32, height: u32) -> Result<EncodedImage, ImageError>;

    fn resize(&self, data: &[u8], width: u32, height: u32) -> Result<EncodedImage, ImageError>;

    fn rotate(&self, data: &[u8], degree: i32) -> Result<EncodedImage, ImageError>;

    /// Scales down to fit in a `size` x `size` box, aspect ratio kept
    fn thumbnail(&self, data: &[u8], size: u32) -> Result<EncodedImage, ImageError>;

    fn image_size(&self, data: &[u8]) -> Result<(u32, u32), ImageError>;
}

/// [`PictureEditor`] backed by the `image` crate, output keeps the input format
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPictureEditor;
