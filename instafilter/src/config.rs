use anyhow::{Context, Result};
use derivative::Derivative;
use image_filter::{FilterDescriptor, export::ExportFormat};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub filter: Filter,
    pub export: Export,
    pub render: Render,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Filter {
    #[derivative(Default(value = "\"sepia-tone\".to_string()"))]
    pub name: String,

    #[derivative(Default(value = "0.5"))]
    pub intensity: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Export {
    #[derivative(Default(value = "\"png\".to_string()"))]
    pub format: String,

    #[derivative(Default(value = "image_filter::export::DEFAULT_JPEG_QUALITY"))]
    pub jpeg_quality: u8,
}

#[derive(Serialize, Deserialize, Debug, Clone, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Render {
    /// Direction of the motion blur streaks, in degrees.
    #[derivative(Default(value = "0.0"))]
    pub motion_blur_angle: f32,
}

impl Config {
    /// Read `path`, falling back to defaults when no file is given or it
    /// does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            log::debug!("{} not found, using default config", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {} failed", path.display()))?;
        let config = Self::parse(&text)
            .with_context(|| format!("parse config {} failed", path.display()))?;

        log::debug!("{config:?}");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn default_filter(&self) -> Result<FilterDescriptor> {
        Ok(self.filter.name.parse()?)
    }

    pub fn export_format(&self) -> Result<ExportFormat> {
        Ok(self.export.format.parse()?)
    }

    fn validate(&self) -> Result<()> {
        self.default_filter()?;
        self.export_format()?;
        Ok(())
    }
}
