use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

/// Edge length of a feed row thumbnail, in pixels.
pub const THUMBNAIL_SIZE: u32 = 60;

/// Scale `img` to cover a `size`×`size` square and crop the overflow evenly.
pub fn fit_thumbnail(img: &DynamicImage, size: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || size == 0 {
        return RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 0]));
    }
    img.resize_to_fill(size, size, FilterType::Lanczos3).to_rgba8()
}
