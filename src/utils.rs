use eframe::egui;
use image::DynamicImage;

use crate::error::ApiError;

pub const VIEWER_MAX_SIZE: (u32, u32) = (1920, 1080);
pub const THUMBNAIL_MAX_SIZE: (u32, u32) = (320, 240);

pub fn resize_to_limit(img: &DynamicImage, max_width: u32, max_height: u32) -> DynamicImage {
    let width = img.width();
    let height = img.height();

    if width <= max_width && height <= max_height {
        return img.clone();
    }

    let ratio = (max_width as f32 / width as f32).min(max_height as f32 / height as f32);

    let new_width = ((width as f32 * ratio) as u32).max(1);
    let new_height = ((height as f32 * ratio) as u32).max(1);

    img.resize(new_width, new_height, image::imageops::FilterType::Triangle)
}

/// Decode encoded image bytes and downscale them into an uploadable egui image.
pub fn decode_picture(bytes: &[u8], limit: (u32, u32)) -> Result<egui::ColorImage, ApiError> {
    let img = image::load_from_memory(bytes).map_err(|err| ApiError::Decode(err.to_string()))?;
    let img = resize_to_limit(&img, limit.0, limit.1);
    let rgba = img.to_rgba8();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [rgba.width() as usize, rgba.height() as usize],
        rgba.as_raw(),
    ))
}

/// Largest size with the image's aspect ratio that fits in `available`.
pub fn fit_size(image_size: egui::Vec2, available: egui::Vec2) -> egui::Vec2 {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (available.x / image_size.x).min(available.y / image_size.y);
    image_size * scale.max(0.0)
}
