//! Console presentation of forecasts
//!
//! `convert` holds the pure value conversions; `report` lays out each forecast
//! section as text.

pub mod convert;
mod report;

pub use report::{Report, WEEKLY_DAYS};

use thiserror::Error;

use crate::forecast::ForecastError;

/// Errors that can occur while rendering a forecast
#[derive(Debug, Error)]
pub enum PresentError {
    /// Wind bearing outside `[0, 360]`
    #[error("wind bearing of {0} degrees is out of bounds")]
    WindOutOfRange(f64),

    /// Moon phase fraction below zero or not a number
    #[error("moon phase {0} is out of bounds")]
    MoonPhaseOutOfRange(f64),

    /// A section needed for the output is missing from the response
    #[error(transparent)]
    Forecast(#[from] ForecastError),
}
