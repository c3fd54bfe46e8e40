use crate::{
    Effect, ImageFilterError, ImageFilterResult,
    blur_effect::{BloomConfig, MotionBlurConfig},
    descriptor::FilterDescriptor,
    filter_effect::{SepiaConfig, VignetteConfig},
    parameter::{FilterParameters, ParameterKey},
    stylized_effect::{CrystallizeConfig, EdgesConfig, PixellateConfig},
};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbaImage;

/// Backend that turns a filter plus its keyed parameters into pixels.
pub trait RenderEngine: Send + Sync {
    fn render(
        &self,
        filter: FilterDescriptor,
        params: &FilterParameters,
        image: &RgbaImage,
    ) -> ImageFilterResult<RgbaImage>;
}

impl<E: RenderEngine + ?Sized> RenderEngine for std::sync::Arc<E> {
    fn render(
        &self,
        filter: FilterDescriptor,
        params: &FilterParameters,
        image: &RgbaImage,
    ) -> ImageFilterResult<RgbaImage> {
        (**self).render(filter, params, image)
    }
}

/// CPU renderer for every `FilterDescriptor`. Parameters absent from `params`
/// fall back to each effect's own default.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct CpuEngine {
    #[derivative(Default(value = "0.0"))]
    motion_blur_angle: f32,
}

impl CpuEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn effect(&self, filter: FilterDescriptor, params: &FilterParameters) -> Box<dyn Effect> {
        let intensity = params.get(ParameterKey::Intensity);
        let radius = params.get(ParameterKey::Radius);
        let scale = params.get(ParameterKey::Scale);

        match filter {
            FilterDescriptor::SepiaTone => {
                let mut config = SepiaConfig::new();
                if let Some(v) = intensity {
                    config = config.with_intensity(v);
                }
                Box::new(config)
            }
            FilterDescriptor::Vignette => {
                let mut config = VignetteConfig::new();
                if let Some(v) = intensity {
                    config = config.with_intensity(v);
                }
                if let Some(v) = radius {
                    config = config.with_radius(v);
                }
                Box::new(config)
            }
            FilterDescriptor::Crystallize => {
                let mut config = CrystallizeConfig::new();
                if let Some(v) = radius {
                    config = config.with_radius(v);
                }
                Box::new(config)
            }
            FilterDescriptor::Bloom => {
                let mut config = BloomConfig::new();
                if let Some(v) = intensity {
                    config = config.with_intensity(v);
                }
                if let Some(v) = radius {
                    config = config.with_radius(v);
                }
                Box::new(config)
            }
            FilterDescriptor::Pixellate => {
                let mut config = PixellateConfig::new();
                if let Some(v) = scale {
                    config = config.with_scale(v);
                }
                Box::new(config)
            }
            FilterDescriptor::Edges => {
                let mut config = EdgesConfig::new();
                if let Some(v) = intensity {
                    config = config.with_intensity(v);
                }
                Box::new(config)
            }
            FilterDescriptor::MotionBlur => {
                let mut config = MotionBlurConfig::new().with_angle(self.motion_blur_angle);
                if let Some(v) = radius {
                    config = config.with_radius(v);
                }
                Box::new(config)
            }
        }
    }
}

impl RenderEngine for CpuEngine {
    fn render(
        &self,
        filter: FilterDescriptor,
        params: &FilterParameters,
        image: &RgbaImage,
    ) -> ImageFilterResult<RgbaImage> {
        if params.keys().iter().any(|key| !filter.accepts(*key)) {
            return Err(ImageFilterError::RenderFailure(format!(
                "{filter} does not accept {params}"
            )));
        }

        let mut output = image.clone();
        self.effect(filter, params).apply(&mut output)?;

        if output.dimensions() != image.dimensions() {
            return Err(ImageFilterError::RenderFailure(format!(
                "{filter} changed the image size from {:?} to {:?}",
                image.dimensions(),
                output.dimensions()
            )));
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_rejects_unaccepted_keys() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        let mut params = FilterParameters::new();
        params.set(ParameterKey::Scale, 10.0);

        let err = CpuEngine::new()
            .render(FilterDescriptor::SepiaTone, &params, &img)
            .unwrap_err();
        assert!(matches!(err, ImageFilterError::RenderFailure(_)));
    }

    #[test]
    fn test_renders_every_filter_with_defaults() {
        let img = RgbaImage::from_fn(24, 16, |x, y| Rgba([(x * 10) as u8, (y * 15) as u8, 60, 255]));
        let engine = CpuEngine::new();

        for filter in FilterDescriptor::all() {
            let output = engine.render(*filter, &FilterParameters::new(), &img).unwrap();
            assert_eq!(output.dimensions(), img.dimensions(), "{filter}");
        }
    }

    #[test]
    fn test_motion_blur_angle_is_forwarded() {
        let img = RgbaImage::from_fn(12, 12, |x, _| Rgba([(x * 20) as u8, 0, 0, 255]));
        let mut params = FilterParameters::new();
        params.set(ParameterKey::Radius, 3.0);

        let horizontal = CpuEngine::new()
            .render(FilterDescriptor::MotionBlur, &params, &img)
            .unwrap();
        let vertical = CpuEngine::new()
            .with_motion_blur_angle(90.0)
            .render(FilterDescriptor::MotionBlur, &params, &img)
            .unwrap();

        assert_ne!(horizontal, img);
        assert_eq!(vertical, img);
    }
}
