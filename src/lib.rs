//! Rain Library
//!
//! This module exposes location resolution, forecast retrieval and
//! presentation for the `rain` binary and for integration tests.

pub mod cli;
pub mod forecast;
pub mod location;
pub mod present;
pub mod settings;
