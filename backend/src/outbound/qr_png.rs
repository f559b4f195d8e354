//! QR renderer producing PNG bitmaps.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

use crate::domain::ports::{QrRenderError, QrRenderer};

const DEFAULT_MIN_DIMENSION: u32 = 256;

/// PNG renderer over the `qrcode` crate.
#[derive(Debug, Clone)]
pub struct PngQrRenderer {
    min_dimension: u32,
}

impl PngQrRenderer {
    /// Renderer producing bitmaps at least `min_dimension` pixels square.
    pub fn new(min_dimension: u32) -> Self {
        Self { min_dimension }
    }
}

impl Default for PngQrRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DIMENSION)
    }
}

impl QrRenderer for PngQrRenderer {
    fn render_png(&self, contents: &str) -> Result<Vec<u8>, QrRenderError> {
        let code =
            QrCode::new(contents.as_bytes()).map_err(|err| QrRenderError::encode(err.to_string()))?;
        let bitmap = code
            .render::<Luma<u8>>()
            .min_dimensions(self.min_dimension, self.min_dimension)
            .build();

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(bitmap)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|err| QrRenderError::image(err.to_string()))?;
        Ok(bytes)
    }
}
