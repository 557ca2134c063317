//! Pre-fitted column scalers.
//!
//! Both scalers are fitted offline on the historical station record and
//! loaded read-only. Nothing here fits anything; a scaler either comes from
//! its artifact or it does not exist.

use ndarray::{Array1, ArrayView1, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ScaleError;

/// Which feature group a scaler belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalerGroup {
    /// Temperatures and wind speeds, columns 0, 1, 2, 5, 7.
    Robust,
    /// Humidity, sunshine, wind direction in radians, columns 3, 4, 6.
    MinMax,
}

impl ScalerGroup {
    /// Positions of this group's columns in the continuous feature order.
    pub fn columns(&self) -> &'static [usize] {
        match self {
            ScalerGroup::Robust => &[0, 1, 2, 5, 7],
            ScalerGroup::MinMax => &[3, 4, 6],
        }
    }
}

impl fmt::Display for ScalerGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalerGroup::Robust => write!(f, "robust"),
            ScalerGroup::MinMax => write!(f, "min-max"),
        }
    }
}

pub trait FeatureScaler {
    fn n_features(&self) -> usize;

    /// Column-wise forward transform of one sample.
    fn transform(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ScaleError>;

    fn inverse_transform(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ScaleError>;

    fn check_width(&self, x: &ArrayView1<f64>) -> Result<(), ScaleError> {
        if x.len() != self.n_features() {
            return Err(ScaleError::ShapeMismatch {
                expected: self.n_features(),
                found: x.len(),
            });
        }
        Ok(())
    }
}

fn ensure_finite(out: Array1<f64>) -> Result<Array1<f64>, ScaleError> {
    match out.iter().position(|v| !v.is_finite()) {
        Some(column) => Err(ScaleError::NonFinite {
            column,
            value: out[column],
        }),
        None => Ok(out),
    }
}

/// Zero-width spreads would divide by zero; those columns pass through
/// unscaled instead, as they did at fit time.
fn nonzero(scale: &Array1<f64>) -> Array1<f64> {
    scale.mapv(|s| if s == 0.0 { 1.0 } else { s })
}

/// Median / interquartile-range scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    /// Per-column median.
    pub center: Array1<f64>,
    /// Per-column interquartile range.
    pub scale: Array1<f64>,
}

impl RobustScaler {
    pub fn new(center: Array1<f64>, scale: Array1<f64>) -> Result<Self, ScaleError> {
        if center.len() != scale.len() {
            return Err(ScaleError::ShapeMismatch {
                expected: center.len(),
                found: scale.len(),
            });
        }
        Ok(RobustScaler { center, scale })
    }

    fn is_consistent(&self) -> bool {
        self.center.len() == self.scale.len()
    }
}

impl FeatureScaler for RobustScaler {
    fn n_features(&self) -> usize {
        self.center.len()
    }

    fn transform(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ScaleError> {
        self.check_width(&x)?;
        ensure_finite((&x - &self.center) / &nonzero(&self.scale))
    }

    fn inverse_transform(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ScaleError> {
        self.check_width(&x)?;
        ensure_finite(&x * &nonzero(&self.scale) + &self.center)
    }
}

/// Linear rescaling of the historical `[data_min, data_max]` onto
/// `feature_range`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    pub data_min: Array1<f64>,
    pub data_max: Array1<f64>,
    pub feature_range: (f64, f64),
}

impl MinMaxScaler {
    pub fn new(data_min: Array1<f64>, data_max: Array1<f64>) -> Result<Self, ScaleError> {
        if data_min.len() != data_max.len() {
            return Err(ScaleError::ShapeMismatch {
                expected: data_min.len(),
                found: data_max.len(),
            });
        }
        Ok(MinMaxScaler {
            data_min,
            data_max,
            feature_range: (0.0, 1.0),
        })
    }

    pub fn with_feature_range(mut self, lo: f64, hi: f64) -> Self {
        self.feature_range = (lo, hi);
        self
    }

    fn is_consistent(&self) -> bool {
        self.data_min.len() == self.data_max.len()
    }

    /// Per-column multiplier and offset: `x * scale + offset`.
    fn coefficients(&self) -> (Array1<f64>, Array1<f64>) {
        let (lo, hi) = self.feature_range;
        let range = nonzero(&(&self.data_max - &self.data_min));
        let scale = range.mapv(|r| (hi - lo) / r);
        let mut offset = Array1::zeros(scale.len());
        Zip::from(&mut offset)
            .and(&self.data_min)
            .and(&scale)
            .for_each(|o, &min, &s| *o = lo - min * s);
        (scale, offset)
    }
}

impl FeatureScaler for MinMaxScaler {
    fn n_features(&self) -> usize {
        self.data_min.len()
    }

    fn transform(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ScaleError> {
        self.check_width(&x)?;
        let (scale, offset) = self.coefficients();
        ensure_finite(&x * &scale + &offset)
    }

    fn inverse_transform(&self, x: ArrayView1<f64>) -> Result<Array1<f64>, ScaleError> {
        self.check_width(&x)?;
        let (scale, offset) = self.coefficients();
        ensure_finite((&x - &offset) / &scale)
    }
}

// Deserialized scalers are only trusted once their parameter arrays are
// finite and agree in length with each other and with the group they are
// loaded for.
impl RobustScaler {
    pub(crate) fn fits(&self, group: ScalerGroup) -> bool {
        self.is_consistent()
            && all_finite(&self.center)
            && all_finite(&self.scale)
            && self.n_features() == group.columns().len()
    }
}

impl MinMaxScaler {
    pub(crate) fn fits(&self, group: ScalerGroup) -> bool {
        let (lo, hi) = self.feature_range;
        self.is_consistent()
            && all_finite(&self.data_min)
            && all_finite(&self.data_max)
            && lo.is_finite()
            && hi.is_finite()
            && self.n_features() == group.columns().len()
    }
}

fn all_finite(values: &Array1<f64>) -> bool {
    values.iter().all(|v| v.is_finite())
}
