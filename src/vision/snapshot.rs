//! Snapshot image returned by the engine alongside an accepted result

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Base64 JPEG of the processed scan region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    base64: String,
}

impl Snapshot {
    /// Wrap the raw base64 payload reported by the engine
    pub fn from_base64(payload: impl Into<String>) -> Self {
        Self {
            base64: payload.into(),
        }
    }

    /// Encode an already-decoded image buffer (PNG or JPEG bytes)
    pub fn from_encoded_bytes(bytes: &[u8]) -> Self {
        Self::from_base64(STANDARD.encode(bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.base64.is_empty()
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// `data:` URI suitable for an image element
    pub fn data_uri(&self) -> String {
        format!("{}{}", DATA_URI_PREFIX, self.base64)
    }

    /// Decode to RGBA pixels
    pub fn decode(&self) -> Result<RgbaImage> {
        let bytes = STANDARD
            .decode(self.base64.trim())
            .context("Snapshot is not valid base64")?;
        let image = image::load_from_memory(&bytes).context("Snapshot is not a decodable image")?;
        Ok(image.to_rgba8())
    }
}
