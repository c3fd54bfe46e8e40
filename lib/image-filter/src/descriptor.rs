use crate::{ImageFilterError, parameter::ParameterKey};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::{fmt, str::FromStr};

use ParameterKey::{Intensity, Radius, Scale};

/// The filters a user can pick from. Each variant carries a fixed set of
/// parameter keys it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FilterDescriptor {
    SepiaTone = 0,
    Vignette,
    Crystallize,
    Bloom,
    Pixellate,
    Edges,
    MotionBlur,
}

impl FilterDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            FilterDescriptor::SepiaTone => "Sepia Tone",
            FilterDescriptor::Vignette => "Vignette",
            FilterDescriptor::Crystallize => "Crystallize",
            FilterDescriptor::Bloom => "Bloom",
            FilterDescriptor::Pixellate => "Pixellate",
            FilterDescriptor::Edges => "Edges",
            FilterDescriptor::MotionBlur => "Motion Blur",
        }
    }

    pub fn accepted_keys(&self) -> &'static [ParameterKey] {
        match self {
            FilterDescriptor::SepiaTone => &[Intensity],
            FilterDescriptor::Vignette => &[Intensity, Radius],
            FilterDescriptor::Crystallize => &[Radius],
            FilterDescriptor::Bloom => &[Intensity, Radius],
            FilterDescriptor::Pixellate => &[Scale],
            FilterDescriptor::Edges => &[Intensity],
            FilterDescriptor::MotionBlur => &[Radius],
        }
    }

    pub fn accepts(&self, key: ParameterKey) -> bool {
        self.accepted_keys().contains(&key)
    }

    /// Picker order.
    pub fn all() -> &'static [FilterDescriptor] {
        &[
            FilterDescriptor::SepiaTone,
            FilterDescriptor::Vignette,
            FilterDescriptor::Crystallize,
            FilterDescriptor::Bloom,
            FilterDescriptor::Pixellate,
            FilterDescriptor::Edges,
            FilterDescriptor::MotionBlur,
        ]
    }
}

// Not derived: num_enum reads a `#[default]` variant as the catch-all for
// `try_from`, which would turn unknown discriminants into `SepiaTone`.
impl Default for FilterDescriptor {
    fn default() -> Self {
        FilterDescriptor::SepiaTone
    }
}

impl fmt::Display for FilterDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterDescriptor {
    type Err = ImageFilterError;

    /// Accepts display names and their kebab/snake/compact spellings,
    /// ignoring case: "Motion Blur", "motion-blur", "motion_blur", "motionblur".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalize = |s: &str| {
            s.chars()
                .filter(|c| !matches!(c, ' ' | '-' | '_'))
                .flat_map(char::to_lowercase)
                .collect::<String>()
        };

        let wanted = normalize(s);
        FilterDescriptor::all()
            .iter()
            .find(|filter| normalize(filter.name()) == wanted)
            .copied()
            .ok_or_else(|| ImageFilterError::InvalidInput(format!("unknown filter `{s}`")))
    }
}
