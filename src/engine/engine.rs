// src/engine/engine.rs
use crate::core::sanitize::preprocess_narrative;
use crate::csv::format_list;
use crate::engine::types::*;

pub const INVALID_INPUT: &str = "Invalid input";
pub const NO_POSITIVE_MATCH: &str = "No positive rules matched";

/// One rule-evaluation loop shared by every flagging domain; the domain is
/// entirely in the `RuleSet`.
#[derive(Clone, Debug)]
pub struct Classifier {
    rules: RuleSet,
}

impl Classifier {
    pub fn new(rules: RuleSet) -> Self { Self { rules } }

    pub fn rules(&self) -> &RuleSet { &self.rules }

    /// Classify one narrative. `None` (missing cell) is treated as empty text.
    pub fn classify_opt(&self, text: Option<&str>) -> Classification {
        self.classify(text.unwrap_or(""))
    }

    pub fn classify(&self, text: &str) -> Classification {
        let text = preprocess_narrative(text);
        if text.is_empty() {
            return unflagged(INVALID_INPUT);
        }

        // Every positive rule runs; the explanation lists all of them.
        let matched_positive = matching(self.rules.positive(), &text);
        if matched_positive.is_empty() {
            return unflagged(NO_POSITIVE_MATCH);
        }

        // Negative rules only ever suppress a positive signal.
        let matched_negative = matching(self.rules.negative(), &text);
        let flag = u8::from(matched_negative.is_empty());
        let explanation = explain(&matched_positive, &matched_negative);

        Classification { flag, matched_positive, matched_negative, explanation }
    }
}

fn matching(rules: &[Rule], text: &str) -> Vec<String> {
    rules
        .iter()
        .filter(|r| r.is_match(text))
        .map(|r| s!(r.name()))
        .collect()
}

fn unflagged(explanation: &str) -> Classification {
    Classification {
        flag: 0,
        matched_positive: Vec::new(),
        matched_negative: Vec::new(),
        explanation: s!(explanation),
    }
}

pub fn explain(positive: &[String], negative: &[String]) -> String {
    if negative.is_empty() {
        join!("Matched positive rules: ", &format_list(positive))
    } else {
        format!(
            "Initially matched positive rules {} but overridden by negative rules {}",
            format_list(positive),
            format_list(negative)
        )
    }
}
