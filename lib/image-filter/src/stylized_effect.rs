use crate::{Effect, ImageFilterError, ImageFilterResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, RgbaImage};
use photon_rs::PhotonImage;
use rayon::prelude::*;

/// Crystallize configuration. Pixels are grouped into Voronoi cells whose
/// seeds sit on a jittered grid of `radius` pixels.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CrystallizeConfig {
    #[derivative(Default(value = "20.0"))]
    radius: f32,
}

impl CrystallizeConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

// Integer hash, stable across runs so the cell layout never changes.
fn cell_hash(cx: u32, cy: u32, salt: u32) -> u32 {
    let mut h = cx.wrapping_mul(0x9E37_79B1)
        ^ cy.wrapping_mul(0x85EB_CA77)
        ^ salt.wrapping_mul(0xC2B2_AE3D);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h = h.wrapping_mul(0x297A_2D39);
    h ^ (h >> 15)
}

fn cell_seed(cx: u32, cy: u32, cell: u32, width: u32, height: u32) -> (u32, u32) {
    let x = cx * cell + cell_hash(cx, cy, 1) % cell;
    let y = cy * cell + cell_hash(cx, cy, 2) % cell;
    (x.min(width - 1), y.min(height - 1))
}

impl Effect for CrystallizeConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()> {
        let cell = self.radius.round() as u32;
        let (width, height) = image.dimensions();
        if cell < 1 || width == 0 || height == 0 {
            return Ok(());
        }

        let source = image.clone();
        let cells_x = width.div_ceil(cell);
        let cells_y = height.div_ceil(cell);

        image
            .par_chunks_exact_mut(width as usize * 4)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as u32;
                let cy = y / cell;

                for (x, pixel) in row.chunks_exact_mut(4).enumerate() {
                    let x = x as u32;
                    let cx = x / cell;
                    // Only the 3x3 neighbouring cells are searched, so a few
                    // borders next to far-jittered seeds are approximate.
                    let mut nearest = (u64::MAX, (x, y));

                    for ny in cy.saturating_sub(1)..=(cy + 1).min(cells_y - 1) {
                        for nx in cx.saturating_sub(1)..=(cx + 1).min(cells_x - 1) {
                            let (sx, sy) = cell_seed(nx, ny, cell, width, height);
                            let dx = sx.abs_diff(x) as u64;
                            let dy = sy.abs_diff(y) as u64;
                            let distance = dx * dx + dy * dy;

                            if distance < nearest.0 {
                                nearest = (distance, (sx, sy));
                            }
                        }
                    }

                    let (sx, sy) = nearest.1;
                    pixel.copy_from_slice(&source.get_pixel(sx, sy).0);
                }
            });

        Ok(())
    }
}

/// Pixellate configuration. `scale` is the block edge in pixels.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PixellateConfig {
    #[derivative(Default(value = "8.0"))]
    scale: f32,
}

impl PixellateConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for PixellateConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()> {
        let block_size = self.scale.round() as i32;
        if block_size < 2 {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        let mut photon_img = PhotonImage::new(image.as_raw().clone(), width, height);
        photon_rs::effects::pixelize(&mut photon_img, block_size);

        *image = RgbaImage::from_raw(width, height, photon_img.get_raw_pixels()).ok_or_else(
            || ImageFilterError::RenderFailure("pixelize returned a short buffer".to_string()),
        )?;

        Ok(())
    }
}

/// Edge detection configuration. Sobel gradient magnitude of the luminance,
/// multiplied by `intensity`, drawn on black.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EdgesConfig {
    #[derivative(Default(value = "1.0"))]
    intensity: f32,
}

impl EdgesConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for EdgesConfig {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Ok(());
        }

        let luma = GrayImage::from_fn(width, height, |x, y| {
            let p = image.get_pixel(x, y);
            let l = (299 * p[0] as u32 + 587 * p[1] as u32 + 114 * p[2] as u32 + 500) / 1000;
            Luma([l as u8])
        });
        let gradients = imageproc::gradients::sobel_gradients(&luma);
        let intensity = self.intensity.max(0.0);

        image
            .par_chunks_exact_mut(width as usize * 4)
            .zip(gradients.par_chunks_exact(width as usize))
            .for_each(|(row, magnitudes)| {
                for (pixel, magnitude) in row.chunks_exact_mut(4).zip(magnitudes) {
                    let val = (*magnitude as f32 * intensity).clamp(0.0, 255.0).round() as u8;
                    pixel[0] = val;
                    pixel[1] = val;
                    pixel[2] = val;
                }
            });

        Ok(())
    }
}
