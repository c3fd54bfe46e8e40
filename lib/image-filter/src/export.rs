use crate::{ImageFilterError, ImageFilterResult, RenderableImage};
use image::{DynamicImage, ImageEncoder, codecs::jpeg::JpegEncoder, codecs::png::PngEncoder};
use std::{fmt, path::Path, str::FromStr};

pub const DEFAULT_JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ImageFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            _ => Err(ImageFilterError::InvalidInput(format!(
                "unsupported export format `{s}`"
            ))),
        }
    }
}

/// Encode for sharing. JPEG output drops the alpha channel.
pub fn encode(
    image: &RenderableImage,
    format: ExportFormat,
    jpeg_quality: u8,
) -> ImageFilterResult<Vec<u8>> {
    let mut bytes = Vec::new();
    let (width, height) = image.dimensions();

    let result = match format {
        ExportFormat::Png => PngEncoder::new(&mut bytes).write_image(
            image.as_raw(),
            width,
            height,
            image::ExtendedColorType::Rgba8,
        ),
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100)).write_image(
                rgb.as_raw(),
                width,
                height,
                image::ExtendedColorType::Rgb8,
            )
        }
    };

    result.map_err(|e| ImageFilterError::RenderFailure(format!("encode {format} failed: {e}")))?;
    Ok(bytes)
}

pub fn save(
    image: &RenderableImage,
    path: impl AsRef<Path>,
    format: ExportFormat,
    jpeg_quality: u8,
) -> ImageFilterResult<()> {
    let path = path.as_ref();
    let bytes = encode(image, format, jpeg_quality)?;
    std::fs::write(path, &bytes)?;

    log::info!("saved {} ({} bytes) to {}", format, bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn sample() -> RgbaImage {
        RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 30) as u8, (y * 30) as u8, 128, 255]))
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("PNG".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("jpeg".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::from_path("a/b/photo.JPG"), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_path("photo"), None);
    }

    #[test]
    fn test_encode_signatures() {
        let png = encode(&sample(), ExportFormat::Png, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);

        let jpeg = encode(&sample(), ExportFormat::Jpeg, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_png_is_lossless() {
        let png = encode(&sample(), ExportFormat::Png, DEFAULT_JPEG_QUALITY).unwrap();
        assert_eq!(crate::source::decode(&png).unwrap(), sample());
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        save(&sample(), &path, ExportFormat::Jpeg, 80).unwrap();

        let decoded = crate::source::load(&path).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
    }
}
