use std::fmt;

/// Upper bound of a radius parameter at full intensity, in pixels.
pub const RADIUS_RANGE: f32 = 100.0;

/// Upper bound of a scale parameter at full intensity, in pixels.
pub const SCALE_RANGE: f32 = 50.0;

/// Tunable parameters a filter may accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    Intensity,
    Radius,
    Scale,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 3] = [
        ParameterKey::Intensity,
        ParameterKey::Radius,
        ParameterKey::Scale,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParameterKey::Intensity => "intensity",
            ParameterKey::Radius => "radius",
            ParameterKey::Scale => "scale",
        }
    }

    /// Map a normalized intensity onto this key's native range.
    pub fn scale(&self, intensity: Intensity) -> f32 {
        match self {
            ParameterKey::Intensity => intensity.value(),
            ParameterKey::Radius => intensity.value() * RADIUS_RANGE,
            ParameterKey::Scale => intensity.value() * SCALE_RANGE,
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Normalized effect strength, always within `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Intensity(f32);

impl Intensity {
    pub const MIN: Intensity = Intensity(0.0);
    pub const MAX: Intensity = Intensity(1.0);

    /// Out of range values are clamped, NaN becomes `0.0`.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self::MIN;
        }

        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl From<f32> for Intensity {
    fn from(value: f32) -> Self {
        Self::new(value)
    }
}

impl From<f64> for Intensity {
    fn from(value: f64) -> Self {
        Self::new(value as f32)
    }
}

/// Keyed parameter values produced for a single filter application.
/// A key is present only when it was explicitly set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterParameters {
    intensity: Option<f32>,
    radius: Option<f32>,
    scale: Option<f32>,
}

impl FilterParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: ParameterKey, value: f32) {
        *self.slot_mut(key) = Some(value);
    }

    pub fn get(&self, key: ParameterKey) -> Option<f32> {
        match key {
            ParameterKey::Intensity => self.intensity,
            ParameterKey::Radius => self.radius,
            ParameterKey::Scale => self.scale,
        }
    }

    pub fn contains(&self, key: ParameterKey) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        ParameterKey::ALL.iter().all(|key| !self.contains(*key))
    }

    /// Keys that were set, in `ParameterKey::ALL` order.
    pub fn keys(&self) -> Vec<ParameterKey> {
        ParameterKey::ALL
            .into_iter()
            .filter(|key| self.contains(*key))
            .collect()
    }

    fn slot_mut(&mut self, key: ParameterKey) -> &mut Option<f32> {
        match key {
            ParameterKey::Intensity => &mut self.intensity,
            ParameterKey::Radius => &mut self.radius,
            ParameterKey::Scale => &mut self.scale,
        }
    }
}

impl fmt::Display for FilterParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let items = ParameterKey::ALL
            .iter()
            .filter_map(|key| self.get(*key).map(|v| format!("{key}={v:.2}")))
            .collect::<Vec<_>>();

        write!(f, "[{}]", items.join(", "))
    }
}
