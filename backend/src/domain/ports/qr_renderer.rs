//! QR bitmap rendering port.

use thiserror::Error;

/// Errors surfaced while turning a lookup URL into a bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QrRenderError {
    /// The contents could not be encoded as a QR symbol.
    #[error("QR encoding failed: {message}")]
    Encode {
        /// Adapter-provided description of the failure.
        message: String,
    },
    /// The rendered bitmap could not be serialised to an image payload.
    #[error("image encoding failed: {message}")]
    Image {
        /// Adapter-provided description of the failure.
        message: String,
    },
}

impl QrRenderError {
    /// Create an encode error with the given message.
    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode {
            message: message.into(),
        }
    }

    /// Create an image error with the given message.
    pub fn image(message: impl Into<String>) -> Self {
        Self::Image {
            message: message.into(),
        }
    }
}

/// Port over the QR rendering library.
///
/// Rendering is pure CPU work on small bitmaps, so the port is synchronous.
pub trait QrRenderer: Send + Sync {
    /// Render `contents` as a PNG image.
    fn render_png(&self, contents: &str) -> Result<Vec<u8>, QrRenderError>;
}
