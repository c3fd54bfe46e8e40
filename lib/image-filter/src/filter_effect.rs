use crate::{Effect, ImageFilterResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;
use rayon::prelude::*;

/// Sepia tone configuration
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SepiaConfig {
    #[derivative(Default(value = "1.0"))]
    intensity: f32,
}

impl SepiaConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for SepiaConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()> {
        let intensity = self.intensity.clamp(0.0, 1.0);

        image.par_chunks_exact_mut(4).for_each(|pixel| {
            let r = pixel[0] as f32;
            let g = pixel[1] as f32;
            let b = pixel[2] as f32;

            let tr = (0.393 * r + 0.769 * g + 0.189 * b).min(255.0);
            let tg = (0.349 * r + 0.686 * g + 0.168 * b).min(255.0);
            let tb = (0.272 * r + 0.534 * g + 0.131 * b).min(255.0);

            pixel[0] = (r * (1.0 - intensity) + tr * intensity).round() as u8;
            pixel[1] = (g * (1.0 - intensity) + tg * intensity).round() as u8;
            pixel[2] = (b * (1.0 - intensity) + tb * intensity).round() as u8;
        });

        Ok(())
    }
}

/// Vignette configuration.
///
/// `radius` is the width of the darkening band as a percentage (0 - 100) of
/// the distance from the image centre to a corner, `intensity` the darkening
/// reached at the corners.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct VignetteConfig {
    #[derivative(Default(value = "0.0"))]
    intensity: f32,

    #[derivative(Default(value = "1.0"))]
    radius: f32,
}

impl VignetteConfig {
    pub fn new() -> Self {
        Self::default()
    }

    fn shade(&self, distance: f32, max_distance: f32) -> f32 {
        let band = (self.radius.clamp(0.0, 100.0) / 100.0) * max_distance;
        if band <= f32::EPSILON {
            return 1.0;
        }

        let inner = max_distance - band;
        let t = ((distance - inner) / band).clamp(0.0, 1.0);

        // smoothstep
        let falloff = t * t * (3.0 - 2.0 * t);
        1.0 - self.intensity.clamp(0.0, 1.0) * falloff
    }
}

impl Effect for VignetteConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()> {
        let width = image.width() as usize;
        if width == 0 {
            return Ok(());
        }

        let center_x = image.width() as f32 / 2.0;
        let center_y = image.height() as f32 / 2.0;
        let max_distance = (center_x * center_x + center_y * center_y).sqrt();

        image
            .par_chunks_exact_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                let dy = y as f32 + 0.5 - center_y;

                for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                    let dx = x as f32 + 0.5 - center_x;
                    let factor = self.shade((dx * dx + dy * dy).sqrt(), max_distance);

                    pixel[0] = (pixel[0] as f32 * factor).round() as u8;
                    pixel[1] = (pixel[1] as f32 * factor).round() as u8;
                    pixel[2] = (pixel[2] as f32 * factor).round() as u8;
                }
            });

        Ok(())
    }
}
