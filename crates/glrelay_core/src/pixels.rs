//! Pixel layout helpers for texture uploads and `readPixels`.

use glrelay_shared::constants as gl;

/// Channels per pixel for an unpacked `format`, 0 if unknown.
#[must_use]
pub fn components(format: u32) -> usize {
    match format {
        gl::RED | gl::RED_INTEGER | gl::ALPHA | gl::LUMINANCE | gl::DEPTH_COMPONENT
        | gl::STENCIL_INDEX => 1,
        gl::RG | gl::RG_INTEGER | gl::LUMINANCE_ALPHA | gl::DEPTH_STENCIL => 2,
        gl::RGB | gl::RGB_INTEGER => 3,
        gl::RGBA | gl::RGBA_INTEGER => 4,
        _ => 0,
    }
}

/// Bytes one pixel of `ty`/`format` occupies, 0 if unknown.
///
/// Packed types carry every channel in one value, so `format` doesn't
/// matter for them.
#[must_use]
pub fn bytes_per_pixel(ty: u32, format: u32) -> usize {
    match ty {
        gl::UNSIGNED_SHORT_4_4_4_4 | gl::UNSIGNED_SHORT_5_5_5_1 | gl::UNSIGNED_SHORT_5_6_5 => 2,
        gl::UNSIGNED_INT_24_8 => 4,
        gl::UNSIGNED_BYTE | gl::BYTE => components(format),
        gl::UNSIGNED_SHORT | gl::SHORT | gl::HALF_FLOAT => 2 * components(format),
        gl::UNSIGNED_INT | gl::INT | gl::FLOAT => 4 * components(format),
        _ => 0,
    }
}

/// Largest image the engine will allocate for one upload or read-back.
pub const MAX_IMAGE_BYTES: usize = 1 << 30;

/// Bytes one row of `width` pixels occupies, without padding.
///
/// Negative widths count as 0. `None` if the row exceeds [`MAX_IMAGE_BYTES`].
#[must_use]
pub fn row_size(width: i32, ty: u32, format: u32) -> Option<usize> {
    let width = usize::try_from(width).unwrap_or(0);
    width
        .checked_mul(bytes_per_pixel(ty, format))
        .filter(|&bytes| bytes <= MAX_IMAGE_BYTES)
}

/// Bytes a `width` x `height` image of `ty`/`format` occupies, without row
/// padding.
///
/// Negative sizes count as 0. `None` if the image exceeds
/// [`MAX_IMAGE_BYTES`].
#[must_use]
pub fn image_size(width: i32, height: i32, ty: u32, format: u32) -> Option<usize> {
    let height = usize::try_from(height).unwrap_or(0);
    row_size(width, ty, format)?
        .checked_mul(height)
        .filter(|&bytes| bytes <= MAX_IMAGE_BYTES)
}

/// Reverses the row order of an image in place.
///
/// Trailing bytes that don't fill a whole row are left alone.
pub fn flip_rows(pixels: &mut [u8], row_bytes: usize, rows: usize) {
    if row_bytes == 0 || rows < 2 {
        return;
    }
    let rows = rows.min(pixels.len() / row_bytes);
    let (mut top, mut bottom) = (0, rows.saturating_sub(1));
    while top < bottom {
        let (head, tail) = pixels.split_at_mut(bottom * row_bytes);
        head[top * row_bytes..(top + 1) * row_bytes].swap_with_slice(&mut tail[..row_bytes]);
        top += 1;
        bottom -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(bytes_per_pixel(gl::UNSIGNED_BYTE, gl::RGBA), 4);
        assert_eq!(bytes_per_pixel(gl::UNSIGNED_BYTE, gl::RGB), 3);
        assert_eq!(bytes_per_pixel(gl::UNSIGNED_SHORT_5_6_5, gl::RGB), 2);
        assert_eq!(bytes_per_pixel(gl::FLOAT, gl::RGBA), 16);
        assert_eq!(bytes_per_pixel(0xFFFF, gl::RGBA), 0);
        assert_eq!(image_size(2, 3, gl::UNSIGNED_BYTE, gl::RGBA), Some(24));
        assert_eq!(image_size(-1, 3, gl::UNSIGNED_BYTE, gl::RGBA), Some(0));
    }

    #[test]
    fn test_image_size_rejects_huge_images() {
        assert_eq!(image_size(i32::MAX, i32::MAX, gl::FLOAT, gl::RGBA), None);
        assert_eq!(image_size(65_536, 65_536, gl::UNSIGNED_BYTE, gl::RGBA), None);
        assert_eq!(row_size(i32::MAX, gl::FLOAT, gl::RGBA), None);
        assert_eq!(image_size(i32::MAX, 0, gl::UNSIGNED_BYTE, gl::RED), Some(0));
        assert_eq!(
            image_size(16_384, 16_384, gl::UNSIGNED_BYTE, gl::RGBA),
            Some(MAX_IMAGE_BYTES)
        );
    }

    #[test]
    fn test_flip_rows() {
        let mut pixels = vec![1, 1, 2, 2, 3, 3];
        flip_rows(&mut pixels, 2, 3);
        assert_eq!(pixels, vec![3, 3, 2, 2, 1, 1]);

        let mut even = vec![1, 2, 3, 4];
        flip_rows(&mut even, 1, 4);
        assert_eq!(even, vec![4, 3, 2, 1]);
    }
}
