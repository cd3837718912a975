// tests/classifier_rules.rs
use std::path::Path;

use citeflag::engine::Classifier;
use citeflag::specs::{self, air_transport, extreme_temperatures};
use pretty_assertions::assert_eq;

fn one(name: &str) -> Classifier {
    let none: &[&Path] = &[];
    specs::classifiers(&[name.to_string()], none).unwrap().remove(0)
}

#[test]
fn airline_cargo_narrative() {
    let r = one(air_transport::NAME).classify("The dog was transported via airline cargo to the airport");
    assert_eq!(r.flag, 1);
    assert_eq!(r.matched_positive, ["airport_terms", "transport_terms"]);
    assert!(r.matched_negative.is_empty());
    assert_eq!(
        r.explanation,
        "Matched positive rules: ['airport_terms', 'transport_terms']"
    );
}

#[test]
fn no_adult_overrides_air_transport() {
    let r = one(air_transport::NAME).classify(
        "A responsible adult was not available to accompany APHIS officials; the   airline \
         kennel was seen from outside.",
    );
    assert_eq!(r.flag, 0);
    assert_eq!(r.matched_positive, ["airport_terms"]);
    assert_eq!(r.matched_negative, ["no_adult"]);
    assert_eq!(
        r.explanation,
        "Initially matched positive rules ['airport_terms'] but overridden by negative rules ['no_adult']"
    );
}

#[test]
fn no_adult_overrides_flight_and_aircraft_terms() {
    let r = one(air_transport::NAME).classify(
        "a responsible adult was not available to accompany aphis officials; \
         the flight attendant noted the aircraft delay",
    );
    assert_eq!(r.flag, 0);
    assert_eq!(r.matched_positive, ["airport_terms", "transport_terms"]);
    assert_eq!(r.matched_negative, ["no_adult"]);
}

#[test]
fn nothing_positive_skips_negatives() {
    let r = one(extreme_temperatures::NAME)
        .classify("A responsible adult was not available to accompany APHIS officials.");
    assert_eq!(r.flag, 0);
    assert!(r.matched_positive.is_empty());
    assert!(r.matched_negative.is_empty());
    assert_eq!(r.explanation, "No positive rules matched");
}

#[test]
fn empty_and_missing_narratives_are_invalid_input() {
    let c = one(air_transport::NAME);
    for r in [c.classify(""), c.classify("   \n\t"), c.classify_opt(None)] {
        assert_eq!(r.flag, 0);
        assert_eq!(r.explanation, "Invalid input");
    }
}

#[test]
fn temperature_value_lookalikes() {
    let c = one(extreme_temperatures::NAME);
    let values = |t: &str| c.classify(t).matched_positive.contains(&"temperature_value".to_string());
    assert!(values("it was 95 degrees inside"));
    assert!(values("recorded 1180 f at the kiln"));
    assert!(values("thermometer read 180.5 f"));
    assert!(!values("citation 180 f applies"));
    assert!(!values("no numbers here"));
}

#[test]
fn classification_is_deterministic() {
    let c = one(extreme_temperatures::NAME);
    let text = "Frostbite on ears; ambient temperature 20 F per NOAA.";
    let first = c.classify(text);
    for _ in 0..10 {
        assert_eq!(c.classify(text), first);
    }
    assert_eq!(
        first.matched_positive,
        ["temperature_value", "general_terms", "cold_terms", "weather_sources"]
    );
}
