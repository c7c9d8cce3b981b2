use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};

/// Scale `width x height` down to fit `max_width x max_height`, keeping aspect.
///
/// The width bound is applied first; the height bound is then re-checked
/// against the width-scaled result. Never upscales.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (width, height);

    if w > max_width {
        h = ((h as f64 * max_width as f64 / w as f64).round() as u32).max(1);
        w = max_width;
    }

    if h > max_height {
        w = ((w as f64 * max_height as f64 / h as f64).round() as u32).max(1);
        h = max_height;
    }

    (w, h)
}

/// Select appropriate filter type based on resize ratio
pub fn select_filter(orig_width: u32, orig_height: u32, new_width: u32, new_height: u32) -> FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        FilterType::Triangle
    } else if max_ratio > 1.5 {
        FilterType::CatmullRom
    } else {
        FilterType::Lanczos3
    }
}

/// Fit `img` within the bounds; returns the input untouched when it already fits.
pub fn resize_to_fit(img: DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let (orig_width, orig_height) = img.dimensions();
    let (width, height) = fit_within(orig_width, orig_height, max_width, max_height);

    if (width, height) == (orig_width, orig_height) {
        return img;
    }

    let filter = select_filter(orig_width, orig_height, width, height);
    img.resize_exact(width, height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn test_fit_width_bound_first() {
        assert_eq!(fit_within(3000, 1500, 1920, 1080), (1920, 960));
    }

    #[test]
    fn test_fit_second_pass_on_height() {
        // 4000x3000 -> 1920x1440 after the width pass, then 1440x1080.
        assert_eq!(fit_within(4000, 3000, 1920, 1080), (1440, 1080));
    }

    #[test]
    fn test_fit_height_only() {
        assert_eq!(fit_within(1000, 2000, 1920, 1080), (540, 1080));
    }

    #[test]
    fn test_fit_never_upscales() {
        assert_eq!(fit_within(800, 600, 1920, 1080), (800, 600));
        assert_eq!(fit_within(1920, 1080, 1920, 1080), (1920, 1080));
    }

    #[test]
    fn test_fit_preserves_aspect_within_one_pixel() {
        for (w, h) in [(3001, 1499), (2500, 1111), (5000, 37), (1921, 1)] {
            let (nw, nh) = fit_within(w, h, 1920, 1080);
            assert!(nw <= 1920 && nh <= 1080);
            let expected_h = (h as f64 * nw as f64 / w as f64).round() as i64;
            assert!((expected_h - nh as i64).abs() <= 1, "{}x{} -> {}x{}", w, h, nw, nh);
        }
    }

    #[test]
    fn test_fit_keeps_minimum_of_one() {
        assert_eq!(fit_within(10000, 2, 100, 100), (100, 1));
    }

    #[test]
    fn test_select_filter() {
        assert_eq!(select_filter(1000, 1000, 100, 100), FilterType::Triangle);
        assert_eq!(select_filter(1000, 1000, 600, 600), FilterType::CatmullRom);
        assert_eq!(select_filter(1000, 1000, 900, 900), FilterType::Lanczos3);
    }

    #[test]
    fn test_resize_to_fit() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(400, 200, Rgba([0, 0, 255, 255])));
        let resized = resize_to_fit(img, 100, 100);
        assert_eq!(resized.dimensions(), (100, 50));

        let small = DynamicImage::ImageRgba8(RgbaImage::from_pixel(40, 20, Rgba([0, 0, 255, 255])));
        assert_eq!(resize_to_fit(small, 100, 100).dimensions(), (40, 20));
    }
}
