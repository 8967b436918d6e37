//! Single-image normalization

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;

use super::ImageError;

/// Quality used when none is configured
pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Decode any supported raster and re-encode it as RGB JPEG.
///
/// `quality` is clamped to 1..=100.
pub fn normalize(raw: &[u8], quality: u8) -> Result<Vec<u8>, ImageError> {
    let decoded = image::load_from_memory(raw).map_err(|e| ImageError::Decode(e.to_string()))?;
    let rgb = decoded.to_rgb8();

    let mut jpeg = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, quality.clamp(1, 100));
        encoder
            .encode_image(&rgb)
            .map_err(|e| ImageError::Encode(e.to_string()))?;
    }

    tracing::trace!(
        width = rgb.width(),
        height = rgb.height(),
        input_bytes = raw.len(),
        output_bytes = jpeg.len(),
        "Normalized image"
    );

    Ok(jpeg)
}

/// Base64 in, base64 JPEG out. Malformed base64 fails before decoding.
pub fn normalize_base64(image_base64: &str, quality: u8) -> Result<String, ImageError> {
    let raw = STANDARD
        .decode(image_base64.trim())
        .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;

    let jpeg = normalize(&raw, quality)?;
    Ok(STANDARD.encode(jpeg))
}

/// Normalize an image read from disk
pub fn normalize_file(path: &Path, quality: u8) -> Result<Vec<u8>, ImageError> {
    let raw = std::fs::read(path)?;
    normalize(&raw, quality)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Cursor;

    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    /// A small translucent PNG
    pub fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 12, Rgba([200, 30, 30, 128])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .expect("png encode");
        buf
    }

    pub fn jpeg_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(8, 8, image::Rgb([10, 120, 240])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .expect("jpeg encode");
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{jpeg_bytes, png_bytes};
    use super::*;

    #[test]
    fn test_png_becomes_rgb_jpeg() {
        let jpeg = normalize(&png_bytes(), DEFAULT_JPEG_QUALITY).unwrap();

        assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn test_jpeg_is_reencoded() {
        let jpeg = normalize(&jpeg_bytes(), 50).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_quality_changes_size() {
        let noisy = {
            let img = image::RgbImage::from_fn(64, 64, |x, y| {
                image::Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x ^ y) * 5 % 256) as u8])
            });
            let mut buf = Vec::new();
            image::DynamicImage::ImageRgb8(img)
                .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
                .unwrap();
            buf
        };

        let low = normalize(&noisy, 10).unwrap();
        let high = normalize(&noisy, 100).unwrap();
        assert!(low.len() < high.len());
    }

    #[test]
    fn test_corrupt_input_is_decode_error() {
        let result = normalize(b"definitely not an image", DEFAULT_JPEG_QUALITY);
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_base64_roundtrip() {
        let encoded = STANDARD.encode(png_bytes());
        let normalized = normalize_base64(&encoded, DEFAULT_JPEG_QUALITY).unwrap();

        let jpeg = STANDARD.decode(normalized).unwrap();
        assert_eq!(image::guess_format(&jpeg).unwrap(), image::ImageFormat::Jpeg);
    }

    #[test]
    fn test_malformed_base64_is_rejected_before_decode() {
        let result = normalize_base64("***not base64***", DEFAULT_JPEG_QUALITY);
        assert!(matches!(result, Err(ImageError::InvalidBase64(_))));

        // Valid base64 of garbage reaches the decoder instead
        let result = normalize_base64(&STANDARD.encode(b"garbage"), DEFAULT_JPEG_QUALITY);
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_normalize_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sample_img.png");
        std::fs::write(&path, png_bytes()).unwrap();

        let jpeg = normalize_file(&path, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let missing = normalize_file(&dir.path().join("missing.png"), DEFAULT_JPEG_QUALITY);
        assert!(matches!(missing, Err(ImageError::Io(_))));
    }
}
