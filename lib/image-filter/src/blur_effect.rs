use crate::{Effect, ImageFilterResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;
use rayon::prelude::*;

/// Bloom configuration (gaussian blur from imageproc, screen blended back)
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BloomConfig {
    #[derivative(Default(value = "0.5"))]
    intensity: f32,

    #[derivative(Default(value = "10.0"))]
    radius: f32,
}

impl BloomConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for BloomConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()> {
        let intensity = self.intensity.clamp(0.0, 1.0);
        if intensity <= 0.0 || image.width() == 0 || image.height() == 0 {
            return Ok(());
        }

        // Radius is roughly three standard deviations of the glow.
        let sigma = self.radius / 3.0;
        let glow = if sigma > 0.0 {
            imageproc::filter::gaussian_blur_f32(&*image, sigma)
        } else {
            image.clone()
        };

        image
            .par_chunks_exact_mut(4)
            .zip(glow.par_chunks_exact(4))
            .for_each(|(pixel, glow)| {
                for i in 0..3 {
                    let base = pixel[i] as f32;
                    let light = glow[i] as f32 * intensity;
                    let screen = 255.0 - (255.0 - base) * (255.0 - light) / 255.0;
                    pixel[i] = screen.clamp(0.0, 255.0).round() as u8;
                }
            });

        Ok(())
    }
}

/// Motion blur configuration. Each pixel averages the samples along a line
/// of `radius` pixels on both sides, oriented by `angle` in degrees.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct MotionBlurConfig {
    #[derivative(Default(value = "20.0"))]
    radius: f32,

    #[derivative(Default(value = "0.0"))]
    angle: f32,
}

impl MotionBlurConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for MotionBlurConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()> {
        let half = self.radius.round() as i64;
        let (width, height) = image.dimensions();
        if half < 1 || width == 0 || height == 0 {
            return Ok(());
        }

        let source = image.clone();
        let (sin, cos) = self.angle.to_radians().sin_cos();
        let offsets = (-half..=half)
            .map(|t| {
                (
                    (t as f32 * cos).round() as i64,
                    (t as f32 * sin).round() as i64,
                )
            })
            .collect::<Vec<_>>();
        let count = offsets.len() as u32;

        image
            .par_chunks_exact_mut(width as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                    let mut sum = [0u32; 3];

                    for (dx, dy) in &offsets {
                        let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as u32;
                        let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as u32;
                        let sample = source.get_pixel(sx, sy);
                        sum[0] += sample[0] as u32;
                        sum[1] += sample[1] as u32;
                        sum[2] += sample[2] as u32;
                    }

                    for i in 0..3 {
                        pixel[i] = ((sum[i] + count / 2) / count) as u8;
                    }
                }
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn stripes() -> RgbaImage {
        RgbaImage::from_fn(20, 10, |x, _| {
            if x % 2 == 0 {
                Rgba([0, 0, 0, 255])
            } else {
                Rgba([200, 200, 200, 255])
            }
        })
    }

    #[test]
    fn test_bloom_zero_intensity_is_identity() {
        let original = stripes();
        let mut img = original.clone();
        BloomConfig::new().with_intensity(0.0).apply(&mut img).unwrap();
        assert_eq!(img, original);
    }

    #[test]
    fn test_bloom_brightens() {
        let original = stripes();
        let mut img = original.clone();
        BloomConfig::new()
            .with_intensity(1.0)
            .with_radius(6.0)
            .apply(&mut img)
            .unwrap();

        for (before, after) in original.pixels().zip(img.pixels()) {
            assert!(after[0] >= before[0]);
            assert_eq!(after[3], before[3]);
        }
        assert!(img.get_pixel(10, 5)[0] > 0);
    }

    #[test]
    fn test_motion_blur_horizontal_averages_stripes() {
        let mut img = stripes();
        MotionBlurConfig::new().with_radius(4.0).apply(&mut img).unwrap();

        // 9 samples centred on an even column: 4 bright, 5 dark
        let centre = img.get_pixel(10, 5);
        assert_eq!(centre[0], ((4 * 200 + 4) / 9) as u8);
        assert_eq!(centre[3], 255);
    }

    #[test]
    fn test_motion_blur_vertical_leaves_columns() {
        let original = stripes();
        let mut img = original.clone();
        MotionBlurConfig::new()
            .with_radius(3.0)
            .with_angle(90.0)
            .apply(&mut img)
            .unwrap();
        assert_eq!(img, original);
    }
}
