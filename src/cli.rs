//! Command-line interface parsing for Rain
//!
//! This module handles parsing of CLI arguments using clap and picks the
//! output mode. Mode flags follow a fixed priority: currently, hourly, day,
//! weekly, minutely.

use std::path::PathBuf;

use clap::Parser;

use crate::forecast::Section;

/// Rain - Weather forecasts and alerts for your location
#[derive(Parser, Debug)]
#[command(name = "rain")]
#[command(about = "Weather forecasts and alerts for your location")]
#[command(version)]
pub struct Cli {
    /// Display current weather conditions
    #[arg(short = 'c', long)]
    pub currently: bool,

    /// Display weather forecast for one or more days (0-4). Days are space-delimited
    #[arg(
        short = 'd',
        long,
        value_name = "DAY",
        num_args = 0..,
        value_parser = clap::value_parser!(u8).range(0..=4)
    )]
    pub day: Option<Vec<u8>>,

    /// Display hour-by-hour weather conditions
    #[arg(short = 'o', long)]
    pub hourly: bool,

    /// Display minute-by-minute forecast for the next hour
    #[arg(short = 'm', long)]
    pub minutely: bool,

    /// Display 5-day weather forecast (same as 'rain -d 0 1 2 3 4')
    #[arg(short = 'w', long)]
    pub weekly: bool,

    /// Use this configuration file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Geocode this address instead of the one in rain.conf
    #[arg(long, value_name = "ADDRESS")]
    pub address: Option<String>,

    /// Forget the cached coordinates and look the location up again
    #[arg(long)]
    pub relocate: bool,

    /// Print debug logs to stderr
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Output selected by the command-line flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Current conditions
    Currently,
    /// Hour-by-hour outlook
    Hourly,
    /// Specific days, in the order given
    Days(Vec<usize>),
    /// Days 0 through 4
    Weekly,
    /// Minute-by-minute outlook
    Minutely,
}

impl Mode {
    /// Picks the output mode from parsed CLI arguments
    ///
    /// # Returns
    /// * `Some(Mode)` for the highest-priority flag given
    /// * `None` if no mode flag was given, or `--day` had no values; usage help should be shown
    pub fn from_cli(cli: &Cli) -> Option<Self> {
        let days = cli.day.as_deref().filter(|days| !days.is_empty());

        if cli.currently {
            Some(Mode::Currently)
        } else if cli.hourly {
            Some(Mode::Hourly)
        } else if let Some(days) = days {
            Some(Mode::Days(days.iter().map(|&d| usize::from(d)).collect()))
        } else if cli.weekly {
            Some(Mode::Weekly)
        } else if cli.minutely {
            Some(Mode::Minutely)
        } else {
            None
        }
    }

    /// Forecast sections this mode reads
    pub fn sections(&self) -> &'static [Section] {
        match self {
            Mode::Currently => &[Section::Currently],
            Mode::Hourly => &[Section::Hourly],
            Mode::Days(_) | Mode::Weekly => &[Section::Daily],
            Mode::Minutely => &[Section::Minutely],
        }
    }
}
