//! Validated search criteria for the event catalog.
//!
//! Raw inputs arrive as a mapping of field name to string (an HTML form or
//! query string, or CLI flags). [`FilterCriteria::from_fields`] turns that
//! mapping into typed, optional constraints. A field is either absent or
//! fully valid; there is no partially parsed state.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::GeoPoint;

/// A recognized search field.
///
/// The canonical name is the snake_case English name. The field names of
/// the legacy search form are accepted as aliases when parsing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
    /// Earliest event date (inclusive).
    #[strum(to_string = "date_from", serialize = "fecha_inicio")]
    DateFrom,
    /// Latest event date (inclusive).
    #[strum(to_string = "date_to", serialize = "fecha_fin")]
    DateTo,
    /// Earliest time of day (inclusive).
    #[strum(to_string = "time_from", serialize = "hora_inicio")]
    TimeFrom,
    /// Latest time of day (inclusive).
    #[strum(to_string = "time_to", serialize = "hora_fin")]
    TimeTo,
    /// Minimum magnitude (inclusive).
    #[strum(to_string = "magnitude_min", serialize = "magnitud_min")]
    MagnitudeMin,
    /// Maximum magnitude (inclusive).
    #[strum(to_string = "magnitude_max", serialize = "magnitud_max")]
    MagnitudeMax,
    /// Minimum depth in kilometers (inclusive).
    #[strum(to_string = "depth_min", serialize = "profundidad_min")]
    DepthMin,
    /// Maximum depth in kilometers (inclusive).
    #[strum(to_string = "depth_max", serialize = "profundidad_max")]
    DepthMax,
    /// Latitude of the radius search center.
    #[strum(to_string = "latitude", serialize = "latitud")]
    Latitude,
    /// Longitude of the radius search center.
    #[strum(to_string = "longitude", serialize = "longitud")]
    Longitude,
}

impl FilterField {
    /// Returns all fields in their fixed iteration order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::DateFrom,
            Self::DateTo,
            Self::TimeFrom,
            Self::TimeTo,
            Self::MagnitudeMin,
            Self::MagnitudeMax,
            Self::DepthMin,
            Self::DepthMax,
            Self::Latitude,
            Self::Longitude,
        ]
    }

    /// Describes the accepted input format, for error messages.
    #[must_use]
    pub const fn expected(self) -> &'static str {
        match self {
            Self::DateFrom | Self::DateTo => "a calendar date (YYYY-MM-DD)",
            Self::TimeFrom | Self::TimeTo => "a time of day (HH:MM or HH:MM:SS)",
            Self::MagnitudeMin | Self::MagnitudeMax => "a magnitude",
            Self::DepthMin | Self::DepthMax => "a depth in kilometers",
            Self::Latitude | Self::Longitude => "decimal degrees",
        }
    }
}

/// A typed criteria value, as bound into a query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FilterValue {
    /// A calendar date.
    Date(NaiveDate),
    /// A time of day.
    Time(NaiveTime),
    /// A magnitude, depth, or coordinate.
    Number(f64),
}

impl std::fmt::Display for FilterValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Time(time) => write!(f, "{}", time.format("%H:%M:%S")),
            // Debug keeps the decimal point (`4.0`, not `4`).
            Self::Number(value) => write!(f, "{value:?}"),
        }
    }
}

/// Error returned when raw search input cannot be turned into
/// [`FilterCriteria`].
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The value does not parse as the field's type.
    Invalid {
        /// The offending field.
        field: FilterField,
        /// The raw value as supplied.
        value: String,
    },
    /// The value parses but lies outside the allowed range.
    OutOfRange {
        /// The offending field.
        field: FilterField,
        /// The parsed value.
        value: f64,
        /// Inclusive lower bound.
        min: f64,
        /// Inclusive upper bound.
        max: f64,
    },
    /// Only one coordinate of the search center was supplied.
    Unpaired {
        /// The coordinate that was supplied.
        present: FilterField,
        /// The coordinate that is missing.
        missing: FilterField,
    },
}

impl ValidationError {
    /// Returns the field that caused the failure.
    #[must_use]
    pub const fn field(&self) -> FilterField {
        match self {
            Self::Invalid { field, .. } | Self::OutOfRange { field, .. } => *field,
            Self::Unpaired { missing, .. } => *missing,
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid { field, value } => write!(
                f,
                "invalid {field} '{value}': expected {}",
                field.expected()
            ),
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(f, "{field} {value} out of range: expected {min} to {max}"),
            Self::Unpaired { present, missing } => {
                write!(f, "{missing} is required when {present} is given")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Optional, validated constraints for an event search.
///
/// Every populated field narrows the search; all populated fields are
/// combined conjunctively. An empty criteria matches every event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Earliest event date (inclusive).
    pub date_from: Option<NaiveDate>,
    /// Latest event date (inclusive).
    pub date_to: Option<NaiveDate>,
    /// Earliest time of day (inclusive).
    pub time_from: Option<NaiveTime>,
    /// Latest time of day (inclusive).
    pub time_to: Option<NaiveTime>,
    /// Minimum magnitude (inclusive).
    pub magnitude_min: Option<f64>,
    /// Maximum magnitude (inclusive).
    pub magnitude_max: Option<f64>,
    /// Minimum depth in kilometers (inclusive).
    pub depth_min: Option<f64>,
    /// Maximum depth in kilometers (inclusive).
    pub depth_max: Option<f64>,
    /// Center of the fixed-radius proximity search.
    pub center_point: Option<GeoPoint>,
}

impl FilterCriteria {
    /// Validates raw search input.
    ///
    /// Unrecognized field names are ignored. Empty or whitespace-only values
    /// mean "no constraint". When a field is given under both its canonical
    /// name and its legacy alias, the non-empty canonical value wins.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a value fails to parse, a coordinate is
    /// out of range, or only one of `latitude`/`longitude` is supplied.
    pub fn from_fields(raw: &BTreeMap<String, String>) -> Result<Self, ValidationError> {
        let mut values: BTreeMap<FilterField, &str> = BTreeMap::new();

        for (name, value) in raw {
            let Ok(field) = name.parse::<FilterField>() else {
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            if *name == field.to_string() {
                values.insert(field, value);
            } else {
                values.entry(field).or_insert(value);
            }
        }

        let latitude = parse_field(&values, FilterField::Latitude, parse_number)?;
        let longitude = parse_field(&values, FilterField::Longitude, parse_number)?;

        let center_point = match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => {
                check_range(FilterField::Latitude, latitude, -90.0, 90.0)?;
                check_range(FilterField::Longitude, longitude, -180.0, 180.0)?;
                Some(GeoPoint::new(latitude, longitude))
            }
            (Some(_), None) => {
                return Err(ValidationError::Unpaired {
                    present: FilterField::Latitude,
                    missing: FilterField::Longitude,
                });
            }
            (None, Some(_)) => {
                return Err(ValidationError::Unpaired {
                    present: FilterField::Longitude,
                    missing: FilterField::Latitude,
                });
            }
            (None, None) => None,
        };

        Ok(Self {
            date_from: parse_field(&values, FilterField::DateFrom, parse_date)?,
            date_to: parse_field(&values, FilterField::DateTo, parse_date)?,
            time_from: parse_field(&values, FilterField::TimeFrom, parse_time)?,
            time_to: parse_field(&values, FilterField::TimeTo, parse_time)?,
            magnitude_min: parse_field(&values, FilterField::MagnitudeMin, parse_number)?,
            magnitude_max: parse_field(&values, FilterField::MagnitudeMax, parse_number)?,
            depth_min: parse_field(&values, FilterField::DepthMin, parse_number)?,
            depth_max: parse_field(&values, FilterField::DepthMax, parse_number)?,
            center_point,
        })
    }

    /// Returns the typed value of a field, if populated.
    #[must_use]
    pub fn value(&self, field: FilterField) -> Option<FilterValue> {
        match field {
            FilterField::DateFrom => self.date_from.map(FilterValue::Date),
            FilterField::DateTo => self.date_to.map(FilterValue::Date),
            FilterField::TimeFrom => self.time_from.map(FilterValue::Time),
            FilterField::TimeTo => self.time_to.map(FilterValue::Time),
            FilterField::MagnitudeMin => self.magnitude_min.map(FilterValue::Number),
            FilterField::MagnitudeMax => self.magnitude_max.map(FilterValue::Number),
            FilterField::DepthMin => self.depth_min.map(FilterValue::Number),
            FilterField::DepthMax => self.depth_max.map(FilterValue::Number),
            FilterField::Latitude => self.center_point.map(|p| FilterValue::Number(p.latitude)),
            FilterField::Longitude => self.center_point.map(|p| FilterValue::Number(p.longitude)),
        }
    }

    /// Returns `true` if no field is populated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        FilterField::all()
            .iter()
            .all(|field| self.value(*field).is_none())
    }
}

fn parse_field<T>(
    values: &BTreeMap<FilterField, &str>,
    field: FilterField,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ValidationError> {
    let Some(raw) = values.get(&field) else {
        return Ok(None);
    };

    parse(raw)
        .map(Some)
        .ok_or_else(|| ValidationError::Invalid {
            field,
            value: (*raw).to_string(),
        })
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .ok()
}

fn parse_number(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn check_range(field: FilterField, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn empty_input_yields_empty_criteria() {
        let criteria = FilterCriteria::from_fields(&BTreeMap::new()).unwrap();
        assert!(criteria.is_empty());
        assert_eq!(criteria, FilterCriteria::default());
    }

    #[test]
    fn blank_values_are_not_constraints() {
        let criteria = FilterCriteria::from_fields(&raw(&[
            ("date_from", ""),
            ("magnitude_min", "   "),
            ("latitude", ""),
            ("longitude", ""),
        ]))
        .unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn parses_every_field() {
        let criteria = FilterCriteria::from_fields(&raw(&[
            ("date_from", "2020-01-01"),
            ("date_to", "2020-12-31"),
            ("time_from", "08:30"),
            ("time_to", "17:45:10"),
            ("magnitude_min", "4.0"),
            ("magnitude_max", "6.5"),
            ("depth_min", "0"),
            ("depth_max", "120.5"),
            ("latitude", "-31.4"),
            ("longitude", "-64.2"),
        ]))
        .unwrap();

        assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(criteria.date_to, NaiveDate::from_ymd_opt(2020, 12, 31));
        assert_eq!(criteria.time_from, NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(criteria.time_to, NaiveTime::from_hms_opt(17, 45, 10));
        assert_eq!(criteria.magnitude_min, Some(4.0));
        assert_eq!(criteria.magnitude_max, Some(6.5));
        assert_eq!(criteria.depth_min, Some(0.0));
        assert_eq!(criteria.depth_max, Some(120.5));
        assert_eq!(criteria.center_point, Some(GeoPoint::new(-31.4, -64.2)));
    }

    #[test]
    fn accepts_legacy_form_names() {
        let criteria = FilterCriteria::from_fields(&raw(&[
            ("fecha_inicio", "2021-03-04"),
            ("magnitud_max", "5"),
            ("profundidad_min", "10"),
            ("latitud", "-32.0"),
            ("longitud", "-65.0"),
        ]))
        .unwrap();

        assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2021, 3, 4));
        assert_eq!(criteria.magnitude_max, Some(5.0));
        assert_eq!(criteria.depth_min, Some(10.0));
        assert_eq!(criteria.center_point, Some(GeoPoint::new(-32.0, -65.0)));
    }

    #[test]
    fn canonical_name_wins_over_alias() {
        let criteria = FilterCriteria::from_fields(&raw(&[
            ("magnitude_min", "3.0"),
            ("magnitud_min", "5.0"),
            ("date_from", "2020-01-01"),
            ("fecha_inicio", "2019-01-01"),
        ]))
        .unwrap();
        assert_eq!(criteria.magnitude_min, Some(3.0));
        assert_eq!(criteria.date_from, NaiveDate::from_ymd_opt(2020, 1, 1));
    }

    #[test]
    fn blank_canonical_value_falls_back_to_alias() {
        let criteria =
            FilterCriteria::from_fields(&raw(&[("depth_max", " "), ("profundidad_max", "50")]))
                .unwrap();
        assert_eq!(criteria.depth_max, Some(50.0));
    }

    #[test]
    fn ignores_unknown_fields() {
        let criteria =
            FilterCriteria::from_fields(&raw(&[("submit", "Buscar"), ("page", "abc")])).unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn rejects_bad_date_naming_the_field() {
        let err = FilterCriteria::from_fields(&raw(&[("date_to", "2020-13-01")])).unwrap_err();
        assert_eq!(err.field(), FilterField::DateTo);
        assert_eq!(
            err,
            ValidationError::Invalid {
                field: FilterField::DateTo,
                value: "2020-13-01".to_string(),
            }
        );
    }

    #[test]
    fn rejects_non_numeric_magnitude() {
        let err = FilterCriteria::from_fields(&raw(&[("magnitude_min", "strong")])).unwrap_err();
        assert_eq!(err.field(), FilterField::MagnitudeMin);
    }

    #[test]
    fn rejects_non_finite_numbers() {
        let err = FilterCriteria::from_fields(&raw(&[("depth_max", "NaN")])).unwrap_err();
        assert_eq!(err.field(), FilterField::DepthMax);

        let err = FilterCriteria::from_fields(&raw(&[("depth_min", "inf")])).unwrap_err();
        assert_eq!(err.field(), FilterField::DepthMin);
    }

    #[test]
    fn rejects_latitude_without_longitude() {
        let err = FilterCriteria::from_fields(&raw(&[("latitude", "-31.4")])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Unpaired {
                present: FilterField::Latitude,
                missing: FilterField::Longitude,
            }
        );
    }

    #[test]
    fn rejects_longitude_without_latitude() {
        let err = FilterCriteria::from_fields(&raw(&[("longitude", "-64.2"), ("latitude", " ")]))
            .unwrap_err();
        assert_eq!(err.field(), FilterField::Latitude);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        let err = FilterCriteria::from_fields(&raw(&[("latitude", "91"), ("longitude", "0")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::OutOfRange {
                field: FilterField::Latitude,
                ..
            }
        ));

        let err =
            FilterCriteria::from_fields(&raw(&[("latitude", "0"), ("longitude", "-180.5")]))
                .unwrap_err();
        assert_eq!(err.field(), FilterField::Longitude);
    }

    #[test]
    fn accepts_coordinate_bounds() {
        let criteria =
            FilterCriteria::from_fields(&raw(&[("latitude", "-90"), ("longitude", "180")]))
                .unwrap();
        assert_eq!(criteria.center_point, Some(GeoPoint::new(-90.0, 180.0)));
    }

    #[test]
    fn error_messages_name_the_field() {
        let err = FilterCriteria::from_fields(&raw(&[("time_from", "25:00")])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid time_from '25:00': expected a time of day (HH:MM or HH:MM:SS)"
        );

        let err = FilterCriteria::from_fields(&raw(&[("latitud", "-31.4")])).unwrap_err();
        assert_eq!(err.to_string(), "longitude is required when latitude is given");
    }

    #[test]
    fn filter_values_render_canonically() {
        assert_eq!(
            FilterValue::Date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()).to_string(),
            "2020-01-01"
        );
        assert_eq!(
            FilterValue::Time(NaiveTime::from_hms_opt(8, 5, 0).unwrap()).to_string(),
            "08:05:00"
        );
        assert_eq!(FilterValue::Number(4.0).to_string(), "4.0");
        assert_eq!(FilterValue::Number(-64.2).to_string(), "-64.2");
    }

    #[test]
    fn field_names_round_trip() {
        for field in FilterField::all() {
            let parsed: FilterField = field.to_string().parse().unwrap();
            assert_eq!(parsed, *field);
        }
    }
}
