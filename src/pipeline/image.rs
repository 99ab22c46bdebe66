//! Image preparation: validate an uploaded screenshot and wrap it as `ImageData`.
//!
//! Summarizer APIs accept images inline in the JSON body. We sniff the format
//! from magic bytes rather than trusting a file extension, and downscale
//! oversized images so a phone screenshot doesn't blow the request budget.

use crate::error::{EmptyInputKind, PlainTermsError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::{imageops::FilterType, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// An image ready to send to a summarizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImageInput {
    /// Base64 (standard alphabet, padded) encoding of the bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Wrap as a chat attachment. `detail: "high"` keeps fine print legible.
    pub fn to_image_data(&self) -> ImageData {
        let b64 = self.to_base64();
        debug!("Encoded image → {} bytes base64", b64.len());
        ImageData::new(b64, self.mime_type.as_str()).with_detail("high")
    }
}

/// Sniff the image format; `None` means the bytes are not an image we accept.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    match image::guess_format(bytes).ok()? {
        f @ (ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::WebP | ImageFormat::Gif) => Some(f),
        _ => None,
    }
}

/// Validate `bytes` and shrink the image if its longest edge exceeds `max_pixels`.
///
/// Images within bounds are passed through untouched (no re-encode).
/// Oversized images are resized with Lanczos3 and re-encoded as PNG.
pub fn prepare_image(bytes: &[u8], max_pixels: u32) -> Result<ImageInput, PlainTermsError> {
    if bytes.is_empty() {
        return Err(PlainTermsError::EmptyInput {
            kind: EmptyInputKind::Missing,
        });
    }

    let format = detect_format(bytes).ok_or_else(|| PlainTermsError::UnsupportedImage {
        detail: "unrecognised image format".to_string(),
    })?;

    let img = image::load_from_memory_with_format(bytes, format).map_err(|e| {
        PlainTermsError::UnsupportedImage {
            detail: e.to_string(),
        }
    })?;

    let (w, h) = (img.width(), img.height());
    if max_pixels == 0 || w.max(h) <= max_pixels {
        debug!("Image {}x{} {:?} within bounds", w, h, format);
        return Ok(ImageInput {
            bytes: bytes.to_vec(),
            mime_type: format.to_mime_type().to_string(),
        });
    }

    let resized = img.resize(max_pixels, max_pixels, FilterType::Lanczos3);
    let mut buf = Vec::new();
    resized
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| PlainTermsError::Internal(format!("Image re-encode failed: {e}")))?;

    debug!(
        "Image {}x{} → {}x{} ({} bytes PNG)",
        w,
        h,
        resized.width(),
        resized.height(),
        buf.len()
    );

    Ok(ImageInput {
        bytes: buf,
        mime_type: "image/png".to_string(),
    })
}
