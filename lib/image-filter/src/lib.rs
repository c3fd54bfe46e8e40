pub mod adapter;
pub mod blur_effect;
pub mod descriptor;
pub mod engine;
pub mod export;
pub mod filter_effect;
pub mod parameter;
pub mod session;
pub mod source;
pub mod stylized_effect;

use image::RgbaImage;

pub use adapter::{FilterAdapter, apply};
pub use descriptor::FilterDescriptor;
pub use engine::{CpuEngine, RenderEngine};
pub use parameter::{FilterParameters, Intensity, ParameterKey};
pub use session::{FilterSession, SessionEvent};

/// Decoded RGBA8 pixel buffer handed in and produced by every filter.
pub type RenderableImage = RgbaImage;

pub type ImageFilterResult<T> = Result<T, ImageFilterError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageFilterError {
    #[error("Invalid input image: {0}")]
    InvalidInput(String),
    #[error("Render failure: {0}")]
    RenderFailure(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Effect {
    fn apply(&self, image: &mut RgbaImage) -> ImageFilterResult<()>;
}
