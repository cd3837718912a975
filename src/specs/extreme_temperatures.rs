// src/specs/extreme_temperatures.rs
//! Extreme temperature incidents: quoted readings, weather conditions and
//! heat/cold injuries.

use crate::engine::{RuleSetSpec, RuleSpec};
use super::NO_ADULT;

pub const NAME: &str = "extreme_temperatures";

pub fn spec() -> RuleSetSpec {
    RuleSetSpec {
        name: s!(NAME),
        flag_column: s!("temperature_flag"),
        positive: vec![
            // a bare "180" never counts as a reading
            RuleSpec::new(
                "temperature_value",
                r"\b\d+(\.\d+)?\s*(f|degrees|fahrenheit|deg f|celsius)\b",
            )
            .excluding(r"180\b"),
            RuleSpec::new(
                "general_terms",
                r"\b(climatic|ambient temperature|temperature extremes|atmospheric temperature)\b",
            ),
            RuleSpec::new(
                "heat_terms",
                r"\b(extreme heat|heat index|heat warning|excessive heat|hot weather|heat stroke|heat stress)\b",
            ),
            RuleSpec::new(
                "cold_terms",
                r"\b(extreme cold|cold temperature|cold weather|low temperature|cold stress|frostbite|hyperthermia|hypothermic)\b",
            ),
            RuleSpec::new("weather_sources", r"\b(weather service|accuweather|noaa)\b"),
        ],
        negative: vec![RuleSpec::new("no_adult", NO_ADULT)],
    }
}
