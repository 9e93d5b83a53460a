//! Unit test harness for toolhead-planner.
//!
//! This module organizes unit tests for each component of the library.

mod config_parsing;
mod config_validation;
mod lookahead_properties;
mod segment_scenarios;
