use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::compass::CompassDirection;
use crate::error::ObservationError;

/// The eight numeric inputs, in the order the model was fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    MinTemperature,
    MaxTemperature,
    AvgTemperature,
    AvgHumidity,
    SunshineDuration,
    MaxWindSpeed,
    MaxWindDirection,
    AvgWindSpeed,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::MinTemperature,
        Field::MaxTemperature,
        Field::AvgTemperature,
        Field::AvgHumidity,
        Field::SunshineDuration,
        Field::MaxWindSpeed,
        Field::MaxWindDirection,
        Field::AvgWindSpeed,
    ];

    /// Station log column name.
    pub fn code(&self) -> &'static str {
        match self {
            Field::MinTemperature => "tn",
            Field::MaxTemperature => "tx",
            Field::AvgTemperature => "tavg",
            Field::AvgHumidity => "rhavg",
            Field::SunshineDuration => "ss",
            Field::MaxWindSpeed => "ffx",
            Field::MaxWindDirection => "dddx",
            Field::AvgWindSpeed => "ffavg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::MinTemperature => "minimum temperature (°C)",
            Field::MaxTemperature => "maximum temperature (°C)",
            Field::AvgTemperature => "average temperature (°C)",
            Field::AvgHumidity => "average relative humidity (%)",
            Field::SunshineDuration => "sunshine duration (hours)",
            Field::MaxWindSpeed => "maximum wind speed (m/s)",
            Field::MaxWindDirection => "wind direction at maximum speed (°)",
            Field::AvgWindSpeed => "average wind speed (m/s)",
        }
    }

    /// Inclusive range accepted by the entry form.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Field::MinTemperature | Field::MaxTemperature | Field::AvgTemperature => (0.0, 100.0),
            Field::AvgHumidity => (0.0, 100.0),
            Field::SunshineDuration => (0.0, 24.0),
            Field::MaxWindSpeed | Field::AvgWindSpeed => (0.0, 100.0),
            Field::MaxWindDirection => (0.0, 360.0),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.code())
    }
}

/// One day of readings as entered by the user.
///
/// Numeric fields are `None` until filled in. `dddx` is in degrees here; the
/// radian conversion happens during feature preparation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub tn: Option<f64>,
    pub tx: Option<f64>,
    pub tavg: Option<f64>,
    pub rhavg: Option<f64>,
    pub ss: Option<f64>,
    pub ffx: Option<f64>,
    pub ffavg: Option<f64>,
    pub dddx: Option<f64>,
    pub dddcar: Option<CompassDirection>,
}

impl RawObservation {
    pub fn get(&self, field: Field) -> Option<f64> {
        match field {
            Field::MinTemperature => self.tn,
            Field::MaxTemperature => self.tx,
            Field::AvgTemperature => self.tavg,
            Field::AvgHumidity => self.rhavg,
            Field::SunshineDuration => self.ss,
            Field::MaxWindSpeed => self.ffx,
            Field::MaxWindDirection => self.dddx,
            Field::AvgWindSpeed => self.ffavg,
        }
    }

    pub fn set(&mut self, field: Field, value: Option<f64>) {
        let slot = match field {
            Field::MinTemperature => &mut self.tn,
            Field::MaxTemperature => &mut self.tx,
            Field::AvgTemperature => &mut self.tavg,
            Field::AvgHumidity => &mut self.rhavg,
            Field::SunshineDuration => &mut self.ss,
            Field::MaxWindSpeed => &mut self.ffx,
            Field::MaxWindDirection => &mut self.dddx,
            Field::AvgWindSpeed => &mut self.ffavg,
        };
        *slot = value;
    }

    /// Checks presence and ranges, returning the complete reading on success.
    ///
    /// With `zero_is_missing` a reading of exactly 0 counts as "not filled
    /// in". That is how the entry form has always behaved, and it means a
    /// genuinely calm or sunless day cannot be classified.
    pub fn validate(&self, rules: &ValidationRules) -> Result<CompleteObservation, ObservationError> {
        let mut missing = Vec::new();
        let mut values = [0.0; 8];

        for (slot, field) in values.iter_mut().zip(Field::ALL) {
            match self.get(field) {
                None => missing.push(field),
                Some(v) if rules.zero_is_missing && v == 0.0 => missing.push(field),
                Some(v) => *slot = v,
            }
        }
        if !missing.is_empty() {
            return Err(ObservationError::Missing(missing));
        }

        for (&value, field) in values.iter().zip(Field::ALL) {
            if !value.is_finite() {
                return Err(ObservationError::NonFinite { field, value });
            }
            if rules.enforce_ranges {
                let (min, max) = field.range();
                if value < min || value > max {
                    return Err(ObservationError::OutOfRange { field, value, min, max });
                }
            }
        }

        let direction = self.dddcar.ok_or(ObservationError::NoDirection)?;

        Ok(CompleteObservation { values, direction })
    }
}

/// Validation switches, taken from the `[validation]` config table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationRules {
    pub zero_is_missing: bool,
    pub enforce_ranges: bool,
}

impl Default for ValidationRules {
    fn default() -> Self {
        ValidationRules {
            zero_is_missing: true,
            enforce_ranges: true,
        }
    }
}

/// A reading that passed validation: every numeric field present, in
/// `Field::ALL` order, `dddx` still in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompleteObservation {
    pub values: [f64; 8],
    pub direction: CompassDirection,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_one() -> RawObservation {
        RawObservation {
            tn: Some(20.0),
            tx: Some(30.0),
            tavg: Some(25.0),
            rhavg: Some(80.0),
            ss: Some(5.0),
            ffx: Some(3.0),
            ffavg: Some(2.0),
            dddx: Some(90.0),
            dddcar: Some(CompassDirection::East),
        }
    }

    #[test]
    fn test_complete_observation_keeps_fit_order() {
        let obs = scenario_one().validate(&ValidationRules::default()).unwrap();
        assert_eq!(obs.values, [20.0, 30.0, 25.0, 80.0, 5.0, 3.0, 90.0, 2.0]);
        assert_eq!(obs.direction, CompassDirection::East);
    }

    #[test]
    fn test_unset_field_is_reported_missing() {
        let mut raw = scenario_one();
        raw.ss = None;
        let err = raw.validate(&ValidationRules::default()).unwrap_err();
        assert_eq!(err, ObservationError::Missing(vec![Field::SunshineDuration]));
    }

    #[test]
    fn test_zero_is_missing_when_enabled() {
        let mut raw = scenario_one();
        raw.ffavg = Some(0.0);
        raw.tn = Some(0.0);
        let err = raw.validate(&ValidationRules::default()).unwrap_err();
        assert_eq!(
            err,
            ObservationError::Missing(vec![Field::MinTemperature, Field::AvgWindSpeed])
        );
    }

    #[test]
    fn test_zero_is_a_value_when_disabled() {
        let mut raw = scenario_one();
        raw.ss = Some(0.0);
        let rules = ValidationRules {
            zero_is_missing: false,
            ..ValidationRules::default()
        };
        let obs = raw.validate(&rules).expect("zero sunshine is a legitimate reading");
        assert_eq!(obs.values[4], 0.0);
    }

    #[test]
    fn test_out_of_range_value_is_rejected() {
        let mut raw = scenario_one();
        raw.ss = Some(25.0);
        match raw.validate(&ValidationRules::default()) {
            Err(ObservationError::OutOfRange { field, max, .. }) => {
                assert_eq!(field, Field::SunshineDuration);
                assert_eq!(max, 24.0);
            }
            other => panic!("expected OutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_range_check_can_be_disabled() {
        let mut raw = scenario_one();
        raw.dddx = Some(400.0);
        let rules = ValidationRules {
            enforce_ranges: false,
            ..ValidationRules::default()
        };
        assert!(raw.validate(&rules).is_ok());
    }

    #[test]
    fn test_nan_is_rejected_even_without_range_checks() {
        let mut raw = scenario_one();
        raw.rhavg = Some(f64::NAN);
        let rules = ValidationRules {
            enforce_ranges: false,
            ..ValidationRules::default()
        };
        assert!(matches!(
            raw.validate(&rules),
            Err(ObservationError::NonFinite { field: Field::AvgHumidity, .. })
        ));
    }

    #[test]
    fn test_negative_value_is_out_of_range() {
        let mut raw = scenario_one();
        raw.tn = Some(-1.0);
        assert!(matches!(
            raw.validate(&ValidationRules::default()),
            Err(ObservationError::OutOfRange { field: Field::MinTemperature, .. })
        ));
    }

    #[test]
    fn test_set_and_get_cover_every_field() {
        let mut raw = RawObservation::default();
        for (i, field) in Field::ALL.into_iter().enumerate() {
            raw.set(field, Some(i as f64 + 1.0));
        }
        for (i, field) in Field::ALL.into_iter().enumerate() {
            assert_eq!(raw.get(field), Some(i as f64 + 1.0));
        }
    }
}
