use std::fmt;

use crate::error::ModelError;

/// Number of classes the deployed classifier must predict.
pub const LABEL_COUNT: usize = 5;

/// Daily rainfall intensity, lightest to heaviest. The discriminant is the
/// classifier's class id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RainfallCategory {
    VeryLight = 0,
    Light = 1,
    Moderate = 2,
    Heavy = 3,
    VeryHeavy = 4,
}

impl RainfallCategory {
    pub const ALL: [RainfallCategory; LABEL_COUNT] = [
        RainfallCategory::VeryLight,
        RainfallCategory::Light,
        RainfallCategory::Moderate,
        RainfallCategory::Heavy,
        RainfallCategory::VeryHeavy,
    ];

    pub fn from_class_id(id: usize) -> Result<Self, ModelError> {
        Self::ALL.get(id).copied().ok_or(ModelError::UnknownClass(id))
    }

    pub fn class_id(&self) -> usize {
        *self as usize
    }

    /// Label shown to forecasters.
    pub fn label(&self) -> &'static str {
        match self {
            RainfallCategory::VeryLight => "Hujan Sangat Ringan",
            RainfallCategory::Light => "Hujan Ringan",
            RainfallCategory::Moderate => "Hujan Sedang",
            RainfallCategory::Heavy => "Hujan Lebat",
            RainfallCategory::VeryHeavy => "Hujan Sangat Lebat",
        }
    }

    pub fn english(&self) -> &'static str {
        match self {
            RainfallCategory::VeryLight => "very light rain",
            RainfallCategory::Light => "light rain",
            RainfallCategory::Moderate => "moderate rain",
            RainfallCategory::Heavy => "heavy rain",
            RainfallCategory::VeryHeavy => "very heavy rain",
        }
    }

    /// Short description from the dashboard legend.
    pub fn description(&self) -> &'static str {
        match self {
            RainfallCategory::VeryLight => "Gerimis sebentar, tidak mengganggu aktivitas luar.",
            RainfallCategory::Light => "Hujan kecil yang terjadi terus menerus selama beberapa jam.",
            RainfallCategory::Moderate => "Hujan mulai deras, bisa menyebabkan genangan kecil.",
            RainfallCategory::Heavy => "Hujan deras, bisa menyebabkan banjir kecil di beberapa tempat.",
            RainfallCategory::VeryHeavy => "Badai deras, biasanya disertai petir dan angin kencang.",
        }
    }
}

impl fmt::Display for RainfallCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
