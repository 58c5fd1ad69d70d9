//! Search flags and their conversion into raw field input.

use std::collections::BTreeMap;

use clap::Args;
use seismo_map_database_models::FilterField;

/// Criteria flags for the `search` subcommand.
///
/// Values are kept as strings so they go through the same validation as
/// the HTTP API's form input.
#[derive(Debug, Default, Args)]
pub struct SearchArgs {
    /// Earliest event date (YYYY-MM-DD)
    #[arg(long)]
    pub date_from: Option<String>,
    /// Latest event date (YYYY-MM-DD)
    #[arg(long)]
    pub date_to: Option<String>,
    /// Earliest time of day (HH:MM or HH:MM:SS)
    #[arg(long)]
    pub time_from: Option<String>,
    /// Latest time of day (HH:MM or HH:MM:SS)
    #[arg(long)]
    pub time_to: Option<String>,
    /// Minimum magnitude
    #[arg(long)]
    pub magnitude_min: Option<String>,
    /// Maximum magnitude
    #[arg(long)]
    pub magnitude_max: Option<String>,
    /// Minimum depth in kilometers
    #[arg(long)]
    pub depth_min: Option<String>,
    /// Maximum depth in kilometers
    #[arg(long)]
    pub depth_max: Option<String>,
    /// Latitude of the radius search center (requires --longitude)
    #[arg(long, allow_hyphen_values = true)]
    pub latitude: Option<String>,
    /// Longitude of the radius search center (requires --latitude)
    #[arg(long, allow_hyphen_values = true)]
    pub longitude: Option<String>,
    /// Print the results as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    const fn flag(&self, field: FilterField) -> Option<&String> {
        match field {
            FilterField::DateFrom => self.date_from.as_ref(),
            FilterField::DateTo => self.date_to.as_ref(),
            FilterField::TimeFrom => self.time_from.as_ref(),
            FilterField::TimeTo => self.time_to.as_ref(),
            FilterField::MagnitudeMin => self.magnitude_min.as_ref(),
            FilterField::MagnitudeMax => self.magnitude_max.as_ref(),
            FilterField::DepthMin => self.depth_min.as_ref(),
            FilterField::DepthMax => self.depth_max.as_ref(),
            FilterField::Latitude => self.latitude.as_ref(),
            FilterField::Longitude => self.longitude.as_ref(),
        }
    }

    /// Collects the given flags under their canonical field names.
    #[must_use]
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        FilterField::all()
            .iter()
            .filter_map(|&field| {
                self.flag(field)
                    .map(|value| (field.to_string(), value.clone()))
            })
            .collect()
    }
}
