#![allow(dead_code)]

use std::fs;
use std::path::Path;

use image::{GrayImage, Luma};

pub fn write_gray(path: &Path, image: &GrayImage) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    image.save(path).expect("write image file");
}

/// A flat image with every pixel set to `value`.
pub fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}

/// Bright squares on a dark background; plenty of corners for FAST.
pub fn squares(width: u32, height: u32, seed: u32) -> GrayImage {
    let mut image = uniform(width, height, 20);
    let step = 24 + seed % 8;
    for (i, top) in (20..height.saturating_sub(30)).step_by(step as usize).enumerate() {
        for (j, left) in (20..width.saturating_sub(30)).step_by(step as usize).enumerate() {
            if (i + j) % 2 == 1 {
                continue;
            }
            let size = 10 + ((i * 3 + j * 5) as u32 + seed) % 6;
            let shade = 180 + ((i * 7 + j * 11) as u8 % 60);
            for y in top..(top + size).min(height) {
                for x in left..(left + size).min(width) {
                    image.put_pixel(x, y, Luma([shade]));
                }
            }
        }
    }
    image
}

pub fn write_detections(path: &Path, json: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, json).expect("write detections file");
}
