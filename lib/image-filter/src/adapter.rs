//! Maps a single normalized intensity onto the keyed parameters of whichever
//! filter is selected, then renders once.

use crate::{
    ImageFilterError, ImageFilterResult, RenderableImage,
    descriptor::FilterDescriptor,
    engine::{CpuEngine, RenderEngine},
    parameter::{FilterParameters, Intensity, ParameterKey},
    source,
};
use std::time::Instant;

/// Stateless adapter over a `RenderEngine`. Safe to share between threads and
/// to call once per slider event.
#[derive(Debug, Clone, Default)]
pub struct FilterAdapter<E = CpuEngine> {
    engine: E,
}

impl FilterAdapter<CpuEngine> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E: RenderEngine> FilterAdapter<E> {
    pub fn with_engine(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Parameters for `filter` at `intensity`. Keys the filter does not accept
    /// are left unset.
    pub fn parameters(filter: FilterDescriptor, intensity: impl Into<Intensity>) -> FilterParameters {
        let intensity = intensity.into();
        let mut params = FilterParameters::new();

        for key in ParameterKey::ALL {
            if filter.accepts(key) {
                params.set(key, key.scale(intensity));
            }
        }

        params
    }

    pub fn apply(
        &self,
        filter: FilterDescriptor,
        intensity: impl Into<Intensity>,
        input: &RenderableImage,
    ) -> ImageFilterResult<RenderableImage> {
        let (width, height) = input.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageFilterError::InvalidInput(format!(
                "image has no pixels ({width}x{height})"
            )));
        }

        let params = Self::parameters(filter, intensity);
        let start = Instant::now();

        let output = self.engine.render(filter, &params, input).map_err(|e| match e {
            ImageFilterError::InvalidInput(_) | ImageFilterError::RenderFailure(_) => e,
            other => ImageFilterError::RenderFailure(other.to_string()),
        })?;

        log::debug!(
            "applied {filter} {params} to {width}x{height} in {:.2?}",
            start.elapsed()
        );

        Ok(output)
    }

    /// Decode `bytes` and apply the filter to the result.
    pub fn apply_encoded(
        &self,
        filter: FilterDescriptor,
        intensity: impl Into<Intensity>,
        bytes: &[u8],
    ) -> ImageFilterResult<RenderableImage> {
        let input = source::decode(bytes)?;
        self.apply(filter, intensity, &input)
    }
}

/// Apply `filter` with the default CPU engine.
pub fn apply(
    filter: FilterDescriptor,
    intensity: impl Into<Intensity>,
    input: &RenderableImage,
) -> ImageFilterResult<RenderableImage> {
    FilterAdapter::new().apply(filter, intensity, input)
}
