use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ObservationError;

/// Most frequent wind direction, as an 8-point compass.
///
/// The model was fitted on the integer codes 1 through 8, clockwise from
/// north. They are fed to it as-is, never scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompassDirection {
    North,
    Northeast,
    East,
    Southeast,
    South,
    Southwest,
    West,
    Northwest,
}

impl CompassDirection {
    pub const ALL: [CompassDirection; 8] = [
        CompassDirection::North,
        CompassDirection::Northeast,
        CompassDirection::East,
        CompassDirection::Southeast,
        CompassDirection::South,
        CompassDirection::Southwest,
        CompassDirection::West,
        CompassDirection::Northwest,
    ];

    pub fn code(&self) -> u8 {
        match self {
            CompassDirection::North => 1,
            CompassDirection::Northeast => 2,
            CompassDirection::East => 3,
            CompassDirection::Southeast => 4,
            CompassDirection::South => 5,
            CompassDirection::Southwest => 6,
            CompassDirection::West => 7,
            CompassDirection::Northwest => 8,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            CompassDirection::North => "N",
            CompassDirection::Northeast => "NE",
            CompassDirection::East => "E",
            CompassDirection::Southeast => "SE",
            CompassDirection::South => "S",
            CompassDirection::Southwest => "SW",
            CompassDirection::West => "W",
            CompassDirection::Northwest => "NW",
        }
    }

    /// Label shown in the selection list, e.g. `"East (E)"`.
    pub fn label(&self) -> &'static str {
        match self {
            CompassDirection::North => "North (N)",
            CompassDirection::Northeast => "Northeast (NE)",
            CompassDirection::East => "East (E)",
            CompassDirection::Southeast => "Southeast (SE)",
            CompassDirection::South => "South (S)",
            CompassDirection::Southwest => "Southwest (SW)",
            CompassDirection::West => "West (W)",
            CompassDirection::Northwest => "Northwest (NW)",
        }
    }
}

impl fmt::Display for CompassDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts the selection-list label or the bare abbreviation. Anything else is
/// an error; there is no fallback direction.
impl FromStr for CompassDirection {
    type Err = ObservationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.label() == trimmed || d.abbreviation() == trimmed)
            .ok_or_else(|| ObservationError::UnknownCompass(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_codes_are_one_through_eight_clockwise() {
        let codes: Vec<u8> = CompassDirection::ALL.iter().map(|d| d.code()).collect();
        assert_eq!(codes, vec![1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_mapping_is_a_bijection() {
        let labels: HashSet<_> = CompassDirection::ALL.iter().map(|d| d.label()).collect();
        let codes: HashSet<_> = CompassDirection::ALL.iter().map(|d| d.code()).collect();
        assert_eq!(labels.len(), 8);
        assert_eq!(codes.len(), 8);

        for direction in CompassDirection::ALL {
            let parsed: CompassDirection = direction.label().parse().unwrap();
            assert_eq!(parsed, direction);
            assert_eq!(CompassDirection::from_code(direction.code()), Some(direction));
        }
    }

    #[test]
    fn test_form_label_east_maps_to_three() {
        let d: CompassDirection = "East (E)".parse().unwrap();
        assert_eq!(d.code(), 3);
    }

    #[test]
    fn test_abbreviation_is_accepted() {
        assert_eq!("NW".parse::<CompassDirection>().unwrap(), CompassDirection::Northwest);
        assert_eq!(" SE ".parse::<CompassDirection>().unwrap(), CompassDirection::Southeast);
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        for bad in ["", "Up", "north", "NNE", "East", "9"] {
            assert_eq!(
                bad.parse::<CompassDirection>(),
                Err(ObservationError::UnknownCompass(bad.to_string())),
                "'{}' must not map to any direction",
                bad
            );
        }
    }

    #[test]
    fn test_code_outside_table_has_no_direction() {
        assert_eq!(CompassDirection::from_code(0), None);
        assert_eq!(CompassDirection::from_code(9), None);
    }

    proptest! {
        #[test]
        fn prop_arbitrary_strings_either_parse_exactly_or_fail(s in "\\PC{0,20}") {
            match s.parse::<CompassDirection>() {
                Ok(d) => {
                    let t = s.trim();
                    prop_assert!(t == d.label() || t == d.abbreviation());
                }
                Err(e) => prop_assert_eq!(e, ObservationError::UnknownCompass(s.clone())),
            }
        }
    }
}
