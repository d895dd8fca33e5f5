use super::errors::ImageError;
use super::models::{DefaultPictureEditor, EncodedImage, PictureEditor};
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

type Result<T> = std::result::Result<T, ImageError>;

impl DefaultPictureEditor {
    pub fn new() -> Self {
        Self
    }

    fn decode(data: &[u8]) -> Result<(DynamicImage, ImageFormat)> {
        let format = image::guess_format(data)?;
        let image = image::load_from_memory_with_format(data, format)?;
        Ok((image, format))
    }

    fn encode(image: DynamicImage, format: ImageFormat) -> Result<EncodedImage> {
        // JPEG has no alpha channel
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => image,
        };

        let mut data = Vec::new();
        image.write_to(&mut Cursor::new(&mut data), format)?;

        Ok(EncodedImage {
            data,
            mime_type: format.to_mime_type().to_string(),
        })
    }

    fn check_dimensions(width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ImageError::InvalidDimensions(width, height));
        }
        Ok(())
    }
}

impl PictureEditor for DefaultPictureEditor {
    fn crop(&self, data: &[u8], x: u32, y: u32, width: u32, height: u32) -> Result<EncodedImage> {
        Self::check_dimensions(width, height)?;
        let (image, format) = Self::decode(data)?;

        let cropped = image.crop_imm(x, y, width, height);
        if cropped.width() == 0 || cropped.height() == 0 {
            return Err(ImageError::InvalidDimensions(width, height));
        }

        Self::encode(cropped, format)
    }

    fn resize(&self, data: &[u8], width: u32, height: u32) -> Result<EncodedImage> {
        Self::check_dimensions(width, height)?;
        let (image, format) = Self::decode(data)?;

        let resized = image.resize_exact(width, height, image::imageops::FilterType::Lanczos3);
        Self::encode(resized, format)
    }

    fn rotate(&self, data: &[u8], degree: i32) -> Result<EncodedImage> {
        let (image, format) = Self::decode(data)?;

        let rotated = match degree.rem_euclid(360) {
            0 => image,
            90 => image.rotate90(),
            180 => image.rotate180(),
            270 => image.rotate270(),
            _ => return Err(ImageError::UnsupportedRotation(degree)),
        };

        Self::encode(rotated, format)
    }

    fn thumbnail(&self, data: &[u8], size: u32) -> Result<EncodedImage> {
        Self::check_dimensions(size, size)?;
        let (image, format) = Self::decode(data)?;
        tracing::debug!("Thumbnail {}x{} -> {}px ({:?})", image.width(), image.height(), size, format);

        Self::encode(image.thumbnail(size, size), format)
    }

    fn image_size(&self, data: &[u8]) -> Result<(u32, u32)> {
        let format = image::guess_format(data)?;
        let reader = image::ImageReader::with_format(Cursor::new(data), format);
        Ok(reader.into_dimensions()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([200, 10, 10]));
        let mut data = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
            .unwrap();
        data
    }

    #[test]
    fn test_image_size() {
        let editor = DefaultPictureEditor::new();
        assert_eq!(editor.image_size(&png(40, 30)).unwrap(), (40, 30));
    }

    #[test]
    fn test_resize_and_crop() {
        let editor = DefaultPictureEditor::new();

        let resized = editor.resize(&png(40, 30), 20, 10).unwrap();
        assert_eq!(resized.mime_type, "image/png");
        assert_eq!(editor.image_size(&resized.data).unwrap(), (20, 10));

        let cropped = editor.crop(&png(40, 30), 5, 5, 10, 8).unwrap();
        assert_eq!(editor.image_size(&cropped.data).unwrap(), (10, 8));
    }

    #[test]
    fn test_rotate() {
        let editor = DefaultPictureEditor::new();

        let rotated = editor.rotate(&png(40, 30), -90).unwrap();
        assert_eq!(editor.image_size(&rotated.data).unwrap(), (30, 40));

        assert!(matches!(
            editor.rotate(&png(4, 4), 45),
            Err(ImageError::UnsupportedRotation(45))
        ));
    }

    #[test]
    fn test_thumbnail_keeps_aspect() {
        let editor = DefaultPictureEditor::new();
        let thumb = editor.thumbnail(&png(200, 100), 90).unwrap();
        assert_eq!(editor.image_size(&thumb.data).unwrap(), (90, 45));
    }

    #[test]
    fn test_not_an_image() {
        let editor = DefaultPictureEditor::new();
        assert!(editor.image_size(b"plain text").is_err());
    }
}
