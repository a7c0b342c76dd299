// flightai-core/src/models/image.rs
use anyhow::{Context, Result};
use image::ImageFormat;

/// An illustrative image produced for one turn. Never cached across turns.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

impl GeneratedImage {
    /// Sniffs the encoded bytes and decodes them once to confirm the payload
    /// is a usable image.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let format =
            image::guess_format(&bytes).context("Generated image is in an unrecognized format")?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .context("Failed to decode generated image")?;
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            bytes,
            format,
        })
    }

    /// File extension matching the encoded format, e.g. `png`.
    pub fn extension(&self) -> &'static str {
        self.format.extensions_str().first().copied().unwrap_or("bin")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb};
    use std::io::Cursor;

    pub(crate) fn tiny_png() -> Vec<u8> {
        let buffer: ImageBuffer<Rgb<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(2, 3, Rgb([255, 128, 0]));
        let mut out = Cursor::new(Vec::new());
        buffer.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_from_bytes_reads_format_and_dimensions() {
        let image = GeneratedImage::from_bytes(tiny_png()).unwrap();
        assert_eq!(image.format, ImageFormat::Png);
        assert_eq!((image.width, image.height), (2, 3));
        assert_eq!(image.extension(), "png");
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        assert!(GeneratedImage::from_bytes(b"definitely not an image".to_vec()).is_err());
    }
}
