// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for PaddleOCR

use image::{imageops, DynamicImage, GenericImageView, Rgb, RgbImage};
use ndarray::Array4;

/// Square input size for the detection model
pub const DET_INPUT_SIZE: u32 = 640;

/// Recognition model input height
pub const REC_INPUT_HEIGHT: u32 = 48;

/// Maximum width for recognition model input
pub const REC_MAX_WIDTH: u32 = 320;

/// ImageNet mean
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// ImageNet std
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

const PAD_GRAY: Rgb<u8> = Rgb([128, 128, 128]);

/// Build the detection input tensor `[1, 3, 640, 640]`.
///
/// The image is scaled to fit, centered on gray padding and normalized.
/// The returned `PreprocessInfo` maps detections back to the original image.
pub fn preprocess_for_detection(image: &DynamicImage) -> (Array4<f32>, PreprocessInfo) {
    let info = PreprocessInfo::new(image, DET_INPUT_SIZE);
    let padded = resize_with_padding(image, DET_INPUT_SIZE).to_rgb8();
    (to_nchw(&padded), info)
}

/// Build a recognition input tensor `[1, 3, 48, W]` from a cropped text line.
///
/// Width follows the crop's aspect ratio, clamped to `[4, REC_MAX_WIDTH]`.
pub fn preprocess_for_recognition(crop: &DynamicImage) -> Array4<f32> {
    let (w, h) = crop.dimensions();
    let scale = REC_INPUT_HEIGHT as f32 / h.max(1) as f32;
    let width = ((w as f32 * scale).round() as u32).clamp(4, REC_MAX_WIDTH);

    let resized = crop
        .resize_exact(width, REC_INPUT_HEIGHT, imageops::FilterType::Triangle)
        .to_rgb8();
    to_nchw(&resized)
}

/// Normalize an RGB image into an NCHW tensor
fn to_nchw(rgb: &RgbImage) -> Array4<f32> {
    let (w, h) = rgb.dimensions();
    let mut tensor = Array4::zeros((1, 3, h as usize, w as usize));

    for (x, y, pixel) in rgb.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}

/// Scale to fit inside `target x target` and center on gray padding
pub fn resize_with_padding(image: &DynamicImage, target: u32) -> DynamicImage {
    let mut canvas = RgbImage::from_pixel(target, target, PAD_GRAY);

    let info = PreprocessInfo::new(image, target);
    if info.scaled_width > 0 && info.scaled_height > 0 {
        let resized = image
            .resize_exact(
                info.scaled_width,
                info.scaled_height,
                imageops::FilterType::Triangle,
            )
            .to_rgb8();
        imageops::overlay(
            &mut canvas,
            &resized,
            info.offset_x as i64,
            info.offset_y as i64,
        );
    }

    DynamicImage::ImageRgb8(canvas)
}

/// Crop an axis-aligned region, clamped to the image bounds.
///
/// Returns `None` when nothing of the region lies inside the image.
pub fn crop_region(image: &DynamicImage, x: f32, y: f32, width: f32, height: f32) -> Option<DynamicImage> {
    let (img_w, img_h) = image.dimensions();

    let left = x.floor().max(0.0) as u32;
    let top = y.floor().max(0.0) as u32;
    let right = ((x + width).ceil().max(0.0) as u32).min(img_w);
    let bottom = ((y + height).ceil().max(0.0) as u32).min(img_h);

    if left >= right || top >= bottom {
        return None;
    }

    Some(image.crop_imm(left, top, right - left, bottom - top))
}

/// Geometry of the letterbox applied by `resize_with_padding`
#[derive(Debug, Clone, Copy)]
pub struct PreprocessInfo {
    pub scale: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub original_width: u32,
    pub original_height: u32,
}

impl PreprocessInfo {
    pub fn new(image: &DynamicImage, target: u32) -> Self {
        let (orig_w, orig_h) = image.dimensions();

        if orig_w == 0 || orig_h == 0 {
            return Self {
                scale: 1.0,
                offset_x: 0,
                offset_y: 0,
                scaled_width: 0,
                scaled_height: 0,
                original_width: orig_w,
                original_height: orig_h,
            };
        }

        let scale = (target as f32 / orig_w as f32).min(target as f32 / orig_h as f32);
        let scaled_width = ((orig_w as f32 * scale).round() as u32).clamp(1, target);
        let scaled_height = ((orig_h as f32 * scale).round() as u32).clamp(1, target);

        Self {
            scale,
            offset_x: (target - scaled_width) / 2,
            offset_y: (target - scaled_height) / 2,
            scaled_width,
            scaled_height,
            original_width: orig_w,
            original_height: orig_h,
        }
    }

    /// Map a point from model input space back to the original image
    pub fn map_to_original(&self, x: f32, y: f32) -> (f32, f32) {
        let orig_x = (x - self.offset_x as f32) / self.scale;
        let orig_y = (y - self.offset_y as f32) / self.scale;
        (
            orig_x.clamp(0.0, self.original_width as f32),
            orig_y.clamp(0.0, self.original_height as f32),
        )
    }
}
