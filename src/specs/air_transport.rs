// src/specs/air_transport.rs
//! Air transport incidents: animals moved by air, or handled at an airport.

use crate::engine::{RuleSetSpec, RuleSpec};
use super::NO_ADULT;

pub const NAME: &str = "air_transport";

pub fn spec() -> RuleSetSpec {
    RuleSetSpec {
        name: s!(NAME),
        flag_column: s!("air_transport_flag"),
        positive: vec![
            RuleSpec::new(
                "airport_terms",
                r"\b(airport|airline|aircraft|international terminal|passenger terminal)\b",
            ),
            RuleSpec::new(
                "transport_terms",
                r"\b(air transport|flight|air cargo|airline cargo|air freight)\b",
            ),
            RuleSpec::new("document_terms", r"\b(waybill|airway bill|awb)\b"),
        ],
        negative: vec![RuleSpec::new("no_adult", NO_ADULT)],
    }
}
