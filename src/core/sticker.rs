//! Sticker image handle.
//!
//! Images travel through the app as encoded bytes plus a MIME type, the same
//! shape the Gemini API uses for `inlineData` parts. Conversion to and from
//! `data:` URIs is what the proxy endpoint speaks; pixel decoding is delegated
//! to the `image` crate and only happens when a view draws the sticker.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use thiserror::Error;

/// MIME type assumed when a response or data URI does not carry one.
pub const DEFAULT_MIME_TYPE: &str = "image/png";

#[derive(Error, Debug)]
pub enum StickerImageError {
    #[error("Invalid image data URL provided.")]
    InvalidDataUrl,

    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// An encoded image (PNG unless the backend says otherwise).
#[derive(Clone, PartialEq, Eq)]
pub struct StickerImage {
    mime_type: String,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for StickerImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StickerImage")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl StickerImage {
    pub fn new(mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Build from a base64 payload as found in a Gemini `inlineData` part.
    pub fn from_base64(mime_type: Option<&str>, data: &str) -> Result<Self, StickerImageError> {
        let bytes = BASE64.decode(data.trim())?;
        Ok(Self::new(mime_type.unwrap_or(DEFAULT_MIME_TYPE), bytes))
    }

    /// Parse `data:<mime>;base64,<payload>`.
    ///
    /// Only the part after the first comma is required to be present; a
    /// missing MIME type falls back to PNG.
    pub fn from_data_url(url: &str) -> Result<Self, StickerImageError> {
        let (header, payload) = url
            .split_once(',')
            .ok_or(StickerImageError::InvalidDataUrl)?;
        if payload.trim().is_empty() {
            return Err(StickerImageError::InvalidDataUrl);
        }

        let mime_type = header
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| !mime.is_empty());

        Self::from_base64(mime_type, payload)
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode to RGBA pixels.
    pub fn decode(&self) -> Result<RgbaImage, StickerImageError> {
        Ok(image::load_from_memory(&self.bytes)?.to_rgba8())
    }

    /// Encode raw pixels as a PNG sticker.
    pub fn from_rgba(pixels: &RgbaImage) -> Result<Self, StickerImageError> {
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(pixels.clone()).write_to(&mut out, ImageFormat::Png)?;
        Ok(Self::new(DEFAULT_MIME_TYPE, out.into_inner()))
    }
}

/// Built-in sample sticker used wherever the tutorial needs an image before
/// the user has generated one: a white-bordered coral disc on light gray.
pub fn placeholder_pixels(size: u32) -> RgbaImage {
    let size = size.max(8);
    let background = Rgba([0xE5, 0xE7, 0xEB, 0xFF]);
    let border = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
    let fill = Rgba([0xFF, 0x7F, 0x50, 0xFF]);
    let eye = Rgba([0x1F, 0x29, 0x37, 0xFF]);

    let center = size as f32 / 2.0;
    let outer = size as f32 * 0.42;
    let inner = size as f32 * 0.36;
    let eye_radius = size as f32 * 0.04;
    let eyes = [
        (center - size as f32 * 0.1, center - size as f32 * 0.06),
        (center + size as f32 * 0.1, center - size as f32 * 0.06),
    ];

    RgbaImage::from_fn(size, size, |x, y| {
        let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
        let dist = ((px - center).powi(2) + (py - center).powi(2)).sqrt();
        if eyes
            .iter()
            .any(|(ex, ey)| ((px - ex).powi(2) + (py - ey).powi(2)).sqrt() <= eye_radius)
        {
            eye
        } else if dist <= inner {
            fill
        } else if dist <= outer {
            border
        } else {
            background
        }
    })
}

/// [`placeholder_pixels`] encoded as a sticker handle, for operations that
/// need to send an image to the backend.
pub fn placeholder_sticker() -> Result<StickerImage, StickerImageError> {
    StickerImage::from_rgba(&placeholder_pixels(256))
}
