//! Loaded artifacts and the per-request classification flow.
//!
//! A `Session` is built once at start-up and never mutated afterwards, so a
//! shared reference is all any caller needs.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::{ArtifactPaths, Config};
use crate::data::observation::{RawObservation, ValidationRules};
use crate::data::preprocessing::{self, FeatureVector, MissingScalerPolicy, ScalingReport, FEATURE_COUNT};
use crate::data::scaler::{MinMaxScaler, RobustScaler, ScalerGroup};
use crate::error::{LoadError, RequestError};
use crate::model::classifier::{Classifier, ClassifierArtifact};
use crate::model::labels::{RainfallCategory, LABEL_COUNT};
use crate::utils::io::{load_artifact, ReadError};

/// Non-fatal problem found while loading.
#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactWarning {
    /// `path` is `None` when the bundle was assembled in memory.
    ScalerUnavailable {
        group: ScalerGroup,
        path: Option<PathBuf>,
        reason: String,
    },
}

impl fmt::Display for ArtifactWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactWarning::ScalerUnavailable {
                group,
                path: Some(path),
                reason,
            } => write!(
                f,
                "{} scaler not loaded from {} ({}); predictions may be less accurate",
                group,
                path.display(),
                reason
            ),
            ArtifactWarning::ScalerUnavailable { group, path: None, reason } => write!(
                f,
                "{} scaler {}; predictions may be less accurate",
                group, reason
            ),
        }
    }
}

/// The classifier and both scalers, read once and immutable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactBundle {
    pub classifier: ClassifierArtifact,
    pub robust: Option<RobustScaler>,
    pub minmax: Option<MinMaxScaler>,
}

impl ArtifactBundle {
    /// Checks that the classifier is structurally sound and sized for the
    /// 9-column pipeline and the 5-entry label table.
    pub fn new(
        classifier: ClassifierArtifact,
        robust: Option<RobustScaler>,
        minmax: Option<MinMaxScaler>,
    ) -> Result<Self, LoadError> {
        classifier.validate().map_err(LoadError::InvalidClassifier)?;
        if classifier.n_features() != FEATURE_COUNT {
            return Err(LoadError::FeatureCountMismatch {
                expected: FEATURE_COUNT,
                found: classifier.n_features(),
            });
        }
        if classifier.n_classes() != LABEL_COUNT {
            return Err(LoadError::ClassCountMismatch {
                expected: LABEL_COUNT,
                found: classifier.n_classes(),
            });
        }
        Ok(ArtifactBundle {
            classifier,
            robust,
            minmax,
        })
    }

    /// Loads all three artifacts. Only the classifier is mandatory.
    pub fn load(paths: &ArtifactPaths) -> Result<(Self, Vec<ArtifactWarning>), LoadError> {
        let classifier = load_classifier(&paths.classifier)?;
        info!(
            "Loaded {} classifier from {}",
            classifier.kind(),
            paths.classifier.display()
        );

        let mut warnings = Vec::new();
        let robust = load_scaler(&paths.robust_scaler, ScalerGroup::Robust, &mut warnings, RobustScaler::fits);
        let minmax = load_scaler(&paths.minmax_scaler, ScalerGroup::MinMax, &mut warnings, MinMaxScaler::fits);

        let bundle = ArtifactBundle::new(classifier, robust, minmax)?;
        Ok((bundle, warnings))
    }
}

fn load_classifier(path: &Path) -> Result<ClassifierArtifact, LoadError> {
    load_artifact(path).map_err(|e| match e {
        ReadError::Io(source) => LoadError::ClassifierUnreadable {
            path: path.to_path_buf(),
            source,
        },
        ReadError::Decode(source) => LoadError::ClassifierCorrupt {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn load_scaler<S: serde::de::DeserializeOwned>(
    path: &Path,
    group: ScalerGroup,
    warnings: &mut Vec<ArtifactWarning>,
    fits: fn(&S, ScalerGroup) -> bool,
) -> Option<S> {
    let reason = match load_artifact::<S>(path) {
        Ok(scaler) if fits(&scaler, group) => {
            info!("Loaded {} scaler from {}", group, path.display());
            return Some(scaler);
        }
        Ok(_) => format!(
            "parameters must be finite and cover {} columns",
            group.columns().len()
        ),
        Err(e) => e.to_string(),
    };

    let warning = ArtifactWarning::ScalerUnavailable {
        group,
        path: Some(path.to_path_buf()),
        reason,
    };
    warn!("{}", warning);
    warnings.push(warning);
    None
}

/// Pipeline switches that apply to every request.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PipelineSettings {
    pub validation: ValidationRules,
    pub missing_scaler: MissingScalerPolicy,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        PipelineSettings {
            validation: config.validation.rules(),
            missing_scaler: config.scaling.missing_scaler,
        }
    }
}

/// Successful answer to one request.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub category: RainfallCategory,
    pub probabilities: Vec<f64>,
    pub features: FeatureVector,
    pub scaling: ScalingReport,
}

impl Classification {
    /// Probability the model gave its chosen class.
    pub fn confidence(&self) -> f64 {
        self.probabilities
            .get(self.category.class_id())
            .copied()
            .unwrap_or(0.0)
    }

    /// Degraded-mode notice to show next to the label, if any group went
    /// through unscaled.
    pub fn scaling_warning(&self) -> Option<String> {
        let skipped = self.scaling.skipped_groups();
        if skipped.is_empty() {
            return None;
        }
        let groups = skipped
            .iter()
            .map(|g| g.to_string())
            .collect::<Vec<_>>()
            .join(" and ");
        Some(format!(
            "{} scaling was skipped because the scaler is unavailable; the prediction may be less accurate",
            groups
        ))
    }
}

#[derive(Debug)]
pub struct Session {
    bundle: ArtifactBundle,
    settings: PipelineSettings,
    warnings: Vec<ArtifactWarning>,
}

impl Session {
    pub fn open(config: &Config) -> Result<Self, LoadError> {
        let (bundle, warnings) = ArtifactBundle::load(&config.artifacts)?;
        Ok(Session {
            bundle,
            settings: PipelineSettings::from_config(config),
            warnings,
        })
    }

    /// Reads the config at `path` (defaults if absent) and opens a session.
    pub fn from_config_file(path: &Path) -> Result<Self, LoadError> {
        let config = Config::load(path)?;
        Self::open(&config)
    }

    pub fn from_bundle(bundle: ArtifactBundle, settings: PipelineSettings) -> Self {
        let mut warnings = Vec::new();
        for (group, present) in [
            (ScalerGroup::Robust, bundle.robust.is_some()),
            (ScalerGroup::MinMax, bundle.minmax.is_some()),
        ] {
            if !present {
                warnings.push(ArtifactWarning::ScalerUnavailable {
                    group,
                    path: None,
                    reason: "was not provided".to_string(),
                });
            }
        }
        Session {
            bundle,
            settings,
            warnings,
        }
    }

    pub fn bundle(&self) -> &ArtifactBundle {
        &self.bundle
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Warnings from start-up, to be shown before any input is taken.
    pub fn warnings(&self) -> &[ArtifactWarning] {
        &self.warnings
    }

    /// Validates, prepares and classifies one observation.
    ///
    /// Validation failures return before the classifier is touched.
    pub fn classify(&self, raw: &RawObservation) -> Result<Classification, RequestError> {
        let observation = raw.validate(&self.settings.validation).map_err(|e| {
            warn!("Rejected observation: {}", e);
            e
        })?;

        let prepared = preprocessing::prepare(
            &observation,
            self.bundle.robust.as_ref(),
            self.bundle.minmax.as_ref(),
            self.settings.missing_scaler,
        )
        .map_err(|e| {
            error!("Feature preparation failed: {}", e);
            e
        })?;

        let prediction = self
            .bundle
            .classifier
            .predict(prepared.vector.as_slice())
            .map_err(|e| {
                error!("Classifier failed: {}", e);
                e
            })?;
        let category = RainfallCategory::from_class_id(prediction.class_id)?;
        debug!("Class probabilities: {:?}", prediction.probabilities);
        info!("Classified as {} (class {})", category, prediction.class_id);

        Ok(Classification {
            category,
            probabilities: prediction.probabilities,
            features: prepared.vector,
            scaling: prepared.scaling,
        })
    }
}
