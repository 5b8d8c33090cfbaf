//! Image normalization: raw upload bytes → bounded, alpha-free, base64 JPEG.
//!
//! Vision APIs accept images as base64 data-URIs embedded in the JSON request
//! body. Uploads arrive in arbitrary formats and color modes, so three things
//! must happen before transmission:
//!
//! - **Flatten**: transparent regions are composited onto an opaque white
//!   canvas. JPEG has no alpha channel, and models read transparent pixels as
//!   black otherwise — turning a white-background screenshot into an
//!   unreadable negative.
//! - **Bound**: neither dimension may exceed the configured cap (downscale
//!   only, aspect ratio preserved, Lanczos3). Models tile large images and
//!   charge per tile; 1024 px keeps invoice line items legible.
//! - **Re-encode**: JPEG at the configured quality. Screenshots compress an
//!   order of magnitude smaller than PNG at quality 85 with no measurable
//!   loss in model accuracy.
//!
//! The transformation is deterministic for identical input bytes.

use crate::error::PipelineError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Rgb, RgbImage};
use tracing::debug;

/// Normalize raw image bytes into a base64-encoded JPEG.
///
/// Decode failure and encode failure both surface as
/// [`PipelineError::Normalization`]; no panic, no partial output.
pub fn normalize_image(
    bytes: &[u8],
    max_dim: u32,
    jpeg_quality: u8,
) -> Result<String, PipelineError> {
    let img = image::load_from_memory(bytes).map_err(|e| PipelineError::Normalization {
        detail: e.to_string(),
    })?;

    let rgb = flatten_onto_white(img);

    let (w, h) = rgb.dimensions();
    let rgb = if w > max_dim || h > max_dim {
        // `resize` fits within the bounding box preserving aspect ratio; the
        // guard above keeps it from ever scaling up.
        DynamicImage::ImageRgb8(rgb)
            .resize(max_dim, max_dim, FilterType::Lanczos3)
            .to_rgb8()
    } else {
        rgb
    };

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, jpeg_quality);
    rgb.write_with_encoder(encoder)
        .map_err(|e| PipelineError::Normalization {
            detail: e.to_string(),
        })?;

    debug!(
        "Normalized image: {}x{} → {}x{}, {} JPEG bytes",
        w,
        h,
        rgb.width(),
        rgb.height(),
        buf.len()
    );

    Ok(STANDARD.encode(&buf))
}

/// Composite any alpha channel onto an opaque white canvas.
///
/// Palette and grayscale-alpha sources are promoted to RGBA by the decoder,
/// so a single alpha check covers every transparency-capable mode. Images
/// without alpha are coerced to three-channel color directly.
fn flatten_onto_white(img: DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }

    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let blend =
            |c: u8| -> u8 { ((c as u16 * a as u16 + 255u16 * (255 - a as u16)) / 255) as u8 };
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(img: DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    fn decode_b64_jpeg(b64: &str) -> DynamicImage {
        let jpeg = STANDARD.decode(b64).expect("valid base64");
        image::load_from_memory_with_format(&jpeg, ImageFormat::Jpeg).expect("valid JPEG")
    }

    #[test]
    fn output_dimensions_are_bounded() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2000, 3000, Rgb([10, 20, 30])));
        let b64 = normalize_image(&png_bytes(img), 1024, 85).unwrap();
        let out = decode_b64_jpeg(&b64);
        assert!(out.width() <= 1024 && out.height() <= 1024);
        // Aspect ratio preserved: the longer side lands on the bound
        assert_eq!(out.height(), 1024);
        assert!(out.width() < 700, "got {}", out.width());
    }

    #[test]
    fn small_images_are_never_upscaled() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([200, 0, 0])));
        let b64 = normalize_image(&png_bytes(img), 1024, 85).unwrap();
        let out = decode_b64_jpeg(&b64);
        assert_eq!((out.width(), out.height()), (40, 30));
    }

    #[test]
    fn transparent_pixels_flatten_to_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([0, 0, 0, 0])));
        let b64 = normalize_image(&png_bytes(img), 1024, 85).unwrap();
        let out = decode_b64_jpeg(&b64).to_rgb8();
        // JPEG is lossy; allow a small tolerance around pure white.
        let px = out.get_pixel(8, 8);
        assert!(px.0.iter().all(|&c| c >= 250), "expected ~white, got {px:?}");
    }

    #[test]
    fn semi_transparent_red_blends_toward_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(16, 16, Rgba([255, 0, 0, 128])));
        let b64 = normalize_image(&png_bytes(img), 1024, 85).unwrap();
        let out = decode_b64_jpeg(&b64).to_rgb8();
        let px = out.get_pixel(8, 8);
        // 50% red over white ≈ (255, 127, 127)
        assert!(px.0[0] >= 240);
        assert!(px.0[1] > 100 && px.0[1] < 160, "got {px:?}");
    }

    #[test]
    fn undecodable_bytes_are_a_normalization_error() {
        let err = normalize_image(b"definitely not an image", 1024, 85).unwrap_err();
        assert!(matches!(err, PipelineError::Normalization { .. }));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(64, 64, Rgb([1, 2, 3])));
        let bytes = png_bytes(img);
        assert_eq!(
            normalize_image(&bytes, 1024, 85).unwrap(),
            normalize_image(&bytes, 1024, 85).unwrap()
        );
    }
}
