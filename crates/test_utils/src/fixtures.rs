//! Pre-built Test Fixtures
//!
//! Images are generated in memory with the `image` crate, so tests never
//! depend on files on disk.

use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use std::io::Cursor;

use domain_assessment::{Detection, ScriptedDetector};

/// Synthetic PNG images
pub struct ImageFixtures;

impl ImageFixtures {
    /// A single-colour RGB image
    pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
        encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(rgb))))
    }

    /// Grayscale horizontal gradient from black to white
    pub fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let span = width.saturating_sub(1).max(1);
        let image = GrayImage::from_fn(width, height, |x, _| Luma([(x * 255 / span) as u8]));
        encode(DynamicImage::ImageLuma8(image))
    }

    /// Alternating black and white squares of `cell` pixels
    pub fn checkerboard_png(width: u32, height: u32, cell: u32) -> Vec<u8> {
        let cell = cell.max(1);
        let image = GrayImage::from_fn(width, height, |x, y| {
            if (x / cell + y / cell) % 2 == 0 {
                Luma([0])
            } else {
                Luma([255])
            }
        });
        encode(DynamicImage::ImageLuma8(image))
    }

    /// A small "before" scene
    pub fn pre_disaster() -> Vec<u8> {
        Self::gradient_png(32, 32)
    }

    /// The same scene after heavy change
    pub fn post_disaster() -> Vec<u8> {
        Self::checkerboard_png(32, 32, 4)
    }

    /// Bytes that no image decoder accepts
    pub fn corrupt() -> Vec<u8> {
        b"definitely not an image".to_vec()
    }
}

fn encode(image: DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("encoding an in-memory PNG cannot fail");
    buffer.into_inner()
}

/// Canned detection sets
pub struct DetectionFixtures;

impl DetectionFixtures {
    pub fn street_scene() -> Vec<Detection> {
        vec![
            Detection::new("car", 0.92),
            Detection::new("house", 0.88),
            Detection::new("tree", 0.75),
        ]
    }

    pub fn flooded_street() -> Vec<Detection> {
        vec![Detection::new("boat", 0.81), Detection::new("house", 0.66)]
    }

    /// Detector that sees the street scene, then the flooded street
    pub fn flood_detector() -> ScriptedDetector {
        ScriptedDetector::new(vec![Self::street_scene(), Self::flooded_street()])
    }

    /// Detector that sees nothing in either image
    pub fn blind_detector() -> ScriptedDetector {
        ScriptedDetector::new(Vec::new())
    }
}

/// Canned strings used across tests
pub struct StringFixtures;

impl StringFixtures {
    pub fn location() -> &'static str {
        "Houston"
    }

    pub fn trigger_code() -> &'static str {
        "TRG-RAIN-001"
    }

    pub fn parameter() -> &'static str {
        "rainfall_mm"
    }
}
