//! Command-line front end for screening package validation.

pub mod logging;
pub mod run;
pub mod summary;
