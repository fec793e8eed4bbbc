//! Access-key barcode generation.
//!
//! The 44-digit key is encoded as Code 128 with no human-readable line;
//! the key is printed separately as grouped text. Code 128-C is tried
//! first (optimal for all-numeric data), falling back to Code 128-B.
//!
//! Encoding failure is recoverable by design: the caller leaves the
//! barcode region blank and the render still completes.

use barcoders::sym::code128::Code128;
use log::warn;
use printpdf::image_crate::{DynamicImage, GrayImage};

/// Bar height in pixels of the generated raster.
const BAR_HEIGHT_PX: u32 = 60;
/// Horizontal pixels per module.
const MODULE_PX: u32 = 2;
/// White quiet zone on each side, in pixels.
const QUIET_ZONE_PX: u32 = 10;

/// Encode the access key as a Code 128 barcode raster.
///
/// Returns `None` when the key is empty or the symbology rejects it; the
/// failure is logged and the render continues without a barcode.
pub fn encode_access_key(key: &str) -> Option<DynamicImage> {
    if key.is_empty() {
        warn!("access key empty; barcode region will be blank");
        return None;
    }

    // Charset selectors: Ć (U+0106) switches to 128-C, Ɓ (U+0181) to 128-B.
    let charset_c = format!("\u{0106}{key}");
    let barcode = Code128::new(&charset_c).or_else(|_| {
        let charset_b = format!("\u{0181}{key}");
        Code128::new(&charset_b)
    });

    let barcode = match barcode {
        Ok(b) => b,
        Err(e) => {
            warn!("access key not encodable as Code 128: {e}");
            return None;
        }
    };

    let encoded: Vec<u8> = barcode.encode();
    rasterize(&encoded)
}

/// Turn the 0/1 module sequence into a grayscale image with quiet zones.
fn rasterize(modules: &[u8]) -> Option<DynamicImage> {
    let width = modules.len() as u32 * MODULE_PX + QUIET_ZONE_PX * 2;
    let mut buf = vec![255u8; (width * BAR_HEIGHT_PX) as usize];

    for (i, &bar) in modules.iter().enumerate() {
        if bar != 1 {
            continue;
        }
        for dx in 0..MODULE_PX {
            let px = QUIET_ZONE_PX + i as u32 * MODULE_PX + dx;
            for y in 0..BAR_HEIGHT_PX {
                buf[(y * width + px) as usize] = 0;
            }
        }
    }

    let Some(gray) = GrayImage::from_raw(width, BAR_HEIGHT_PX, buf) else {
        warn!("barcode raster buffer mismatch; barcode region will be blank");
        return None;
    };
    Some(DynamicImage::ImageLuma8(gray))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_valid_key() {
        let key = "31250517291576000158550120009513541348716910";
        let image = encode_access_key(key).unwrap();
        assert!(image.width() > 2 * QUIET_ZONE_PX);
        assert_eq!(image.height(), BAR_HEIGHT_PX);
    }

    #[test]
    fn test_encode_has_dark_and_light_modules() {
        let image = encode_access_key(&"4".repeat(44)).unwrap();
        let gray = image.to_luma8();
        let mut seen = std::collections::HashSet::new();
        for p in gray.pixels() {
            seen.insert(p.0[0]);
        }
        assert!(seen.contains(&0));
        assert!(seen.contains(&255));
    }

    #[test]
    fn test_empty_key_is_none() {
        assert!(encode_access_key("").is_none());
    }

    #[test]
    fn test_alphanumeric_falls_back_to_charset_b() {
        // Not a valid access key, but 128-B should still encode it rather
        // than aborting the render.
        assert!(encode_access_key("ABC123").is_some());
    }
}
