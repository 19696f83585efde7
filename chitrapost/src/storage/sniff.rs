//! Magic-number content detection
//!
//! The client's filename and declared content type are never consulted; only
//! the leading bytes decide.

use std::fmt;
use thiserror::Error;

/// Number of leading bytes inspected
pub const SNIFF_LEN: usize = 512;

/// Accepted image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    Png,
}

impl ImageKind {
    /// MIME type
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// Content is not an accepted image
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unsupported content type: {}", detected.unwrap_or("unknown"))]
pub struct Unsupported {
    /// What the bytes looked like, if anything recognisable
    pub detected: Option<&'static str>,
}

/// Classify `bytes` by their first [`SNIFF_LEN`] bytes
///
/// # Errors
///
/// Returns [`Unsupported`] for anything but JPEG or PNG, including empty
/// input.
pub fn sniff(bytes: &[u8]) -> Result<ImageKind, Unsupported> {
    let prefix = &bytes[..bytes.len().min(SNIFF_LEN)];
    match infer::get(prefix).map(|kind| kind.mime_type()) {
        Some("image/jpeg") => Ok(ImageKind::Jpeg),
        Some("image/png") => Ok(ImageKind::Png),
        detected => Err(Unsupported { detected }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    fn padded(magic: &[u8], len: usize) -> Vec<u8> {
        let mut bytes = magic.to_vec();
        bytes.resize(len, 0);
        bytes
    }

    #[test]
    fn test_accepts_png_and_jpeg() {
        assert_eq!(sniff(&padded(&PNG_MAGIC, 64)), Ok(ImageKind::Png));
        assert_eq!(sniff(&padded(&JPEG_MAGIC, 64)), Ok(ImageKind::Jpeg));
    }

    #[test]
    fn test_only_prefix_is_inspected() {
        let mut bytes = padded(&PNG_MAGIC, 4096);
        bytes[SNIFF_LEN..SNIFF_LEN + 6].copy_from_slice(b"GIF89a");
        assert_eq!(sniff(&bytes), Ok(ImageKind::Png));
    }

    #[test]
    fn test_rejects_other_images() {
        let err = sniff(&padded(b"GIF89a", 64)).unwrap_err();
        assert_eq!(err.detected, Some("image/gif"));
    }

    #[test]
    fn test_rejects_text_and_empty() {
        assert_eq!(sniff(b"hello, world"), Err(Unsupported { detected: None }));
        assert_eq!(sniff(&[]), Err(Unsupported { detected: None }));
    }

    #[test]
    fn test_display() {
        assert_eq!(ImageKind::Png.to_string(), "image/png");
        assert_eq!(
            Unsupported { detected: None }.to_string(),
            "Unsupported content type: unknown"
        );
    }
}
