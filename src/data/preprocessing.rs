use ndarray::{Array1, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::data::observation::CompleteObservation;
use crate::data::scaler::{FeatureScaler, MinMaxScaler, RobustScaler, ScalerGroup};
use crate::error::ScaleError;

/// Continuous inputs, `[tn, tx, tavg, rhavg, ss, ffx, dddx, ffavg]`.
pub const CONTINUOUS_FEATURES: usize = 8;
/// Continuous inputs plus the compass code.
pub const FEATURE_COUNT: usize = CONTINUOUS_FEATURES + 1;
/// Position of the wind direction at maximum speed.
pub const DDDX_INDEX: usize = 6;
/// Position of the unscaled compass code.
pub const COMPASS_INDEX: usize = 8;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees.to_radians()
}

/// The exact 9-column row the classifier was fitted on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        FeatureVector(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn compass_code(&self) -> f64 {
        self.0[COMPASS_INDEX]
    }
}

/// What to do when a group's scaler artifact could not be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingScalerPolicy {
    /// Feed that group to the model unscaled. Predictions degrade.
    #[default]
    Skip,
    /// Refuse to classify.
    Refuse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupScaling {
    Applied,
    Skipped,
}

/// How each group was treated for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingReport {
    pub robust: GroupScaling,
    pub minmax: GroupScaling,
}

impl ScalingReport {
    pub fn skipped_groups(&self) -> Vec<ScalerGroup> {
        let mut skipped = Vec::new();
        if self.robust == GroupScaling::Skipped {
            skipped.push(ScalerGroup::Robust);
        }
        if self.minmax == GroupScaling::Skipped {
            skipped.push(ScalerGroup::MinMax);
        }
        skipped
    }

    pub fn is_degraded(&self) -> bool {
        !self.skipped_groups().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreparedFeatures {
    pub vector: FeatureVector,
    pub scaling: ScalingReport,
}

/// Turns a validated observation into the classifier's input row.
///
/// `dddx` is converted to radians, each group goes through its scaler and is
/// written back in place, and the compass code is appended untouched.
pub fn prepare(
    observation: &CompleteObservation,
    robust: Option<&RobustScaler>,
    minmax: Option<&MinMaxScaler>,
    policy: MissingScalerPolicy,
) -> Result<PreparedFeatures, ScaleError> {
    let mut continuous = Array1::from(observation.values.to_vec());
    continuous[DDDX_INDEX] = degrees_to_radians(continuous[DDDX_INDEX]);
    debug!("Raw continuous features: {:?}", continuous);

    let scaling = ScalingReport {
        robust: apply_group(&mut continuous, ScalerGroup::Robust, robust, policy)?,
        minmax: apply_group(&mut continuous, ScalerGroup::MinMax, minmax, policy)?,
    };

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, v) in values.iter_mut().zip(continuous.iter()) {
        *slot = *v;
    }
    values[COMPASS_INDEX] = f64::from(observation.direction.code());

    let vector = FeatureVector::new(values);
    debug!("Prepared feature vector: {:?}", vector.as_slice());

    Ok(PreparedFeatures { vector, scaling })
}

fn apply_group<S: FeatureScaler>(
    features: &mut Array1<f64>,
    group: ScalerGroup,
    scaler: Option<&S>,
    policy: MissingScalerPolicy,
) -> Result<GroupScaling, ScaleError> {
    let Some(scaler) = scaler else {
        return match policy {
            MissingScalerPolicy::Skip => {
                warn!("No {} scaler loaded, passing columns {:?} through unscaled", group, group.columns());
                Ok(GroupScaling::Skipped)
            }
            MissingScalerPolicy::Refuse => Err(ScaleError::Unavailable { group }),
        };
    };

    let columns = group.columns();
    let subset = features.select(Axis(0), columns);
    let scaled = scaler.transform(subset.view())?;
    for (&col, &v) in columns.iter().zip(scaled.iter()) {
        features[col] = v;
    }
    Ok(GroupScaling::Applied)
}
