// src/engine/types.rs
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

/* Declarative rule specs (built-in domains and TOML rule files) */

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub name: String,
    pub pattern: String,
    /// Veto a `pattern` match that starts where this also matches.
    #[serde(default)]
    pub exclude: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RuleSetSpec {
    pub name: String,
    pub flag_column: String,
    #[serde(default)]
    pub positive: Vec<RuleSpec>,
    #[serde(default)]
    pub negative: Vec<RuleSpec>,
}

impl RuleSpec {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self { name: s!(name), pattern: s!(pattern), exclude: None }
    }

    pub fn excluding(mut self, pattern: &str) -> Self {
        self.exclude = Some(s!(pattern));
        self
    }
}

/* Compiled rules */

#[derive(Clone, Debug)]
pub struct Rule {
    name: String,
    pattern: Regex,
    exclude: Option<Exclude>,
}

/// The `exclude` pattern, anchored so a check costs the length of the match
/// attempt rather than a scan of the rest of the narrative. `after_char`
/// keeps one preceding char in the haystack for `\b` and friends.
#[derive(Clone, Debug)]
struct Exclude {
    source: String,
    at_start: Regex,
    after_char: Regex,
}

impl Exclude {
    fn compile(p: &str) -> std::result::Result<Self, regex::Error> {
        Regex::new(p)?;
        Ok(Self {
            source: s!(p),
            at_start: Regex::new(&format!("^(?:{p})"))?,
            after_char: Regex::new(&format!("^(?s:.)(?:{p})"))?,
        })
    }

    /// Does the pattern match starting exactly at byte `start`?
    fn matches_at(&self, text: &str, start: usize) -> bool {
        match text[..start].chars().next_back() {
            None => self.at_start.is_match(text),
            Some(prev) => self.after_char.is_match(&text[start - prev.len_utf8()..]),
        }
    }
}

impl Rule {
    pub fn compile(spec: &RuleSpec) -> Result<Self> {
        let err = |source| Error::Rule { rule: spec.name.clone(), source };
        Ok(Self {
            name: spec.name.clone(),
            pattern: Regex::new(&spec.pattern).map_err(err)?,
            exclude: spec.exclude.as_deref().map(Exclude::compile).transpose().map_err(err)?,
        })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn pattern(&self) -> &str { self.pattern.as_str() }
    pub fn exclude(&self) -> Option<&str> { self.exclude.as_ref().map(|x| x.source.as_str()) }

    /// Any match anywhere in `text`.
    ///
    /// With an `exclude` pattern, a candidate match starting at `p` is dropped
    /// when `exclude` matches at `p` too, and the search resumes one char
    /// later (word boundaries still see the whole haystack).
    pub fn is_match(&self, text: &str) -> bool {
        let Some(exclude) = &self.exclude else {
            return self.pattern.is_match(text);
        };

        let mut at = 0;
        while at <= text.len() {
            let Some(m) = self.pattern.find_at(text, at) else { return false };
            let start = m.start();
            if !exclude.matches_at(text, start) { return true; }
            at = start + text[start..].chars().next().map_or(1, char::len_utf8);
        }
        false
    }
}

/// Ordered positive and negative rules of one flagging domain.
#[derive(Clone, Debug)]
pub struct RuleSet {
    name: String,
    flag_column: String,
    positive: Vec<Rule>,
    negative: Vec<Rule>,
}

impl RuleSet {
    pub fn compile(spec: &RuleSetSpec) -> Result<Self> {
        Ok(Self {
            name: spec.name.clone(),
            flag_column: spec.flag_column.clone(),
            positive: spec.positive.iter().map(Rule::compile).collect::<Result<_>>()?,
            negative: spec.negative.iter().map(Rule::compile).collect::<Result<_>>()?,
        })
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn flag_column(&self) -> &str { &self.flag_column }
    pub fn positive(&self) -> &[Rule] { &self.positive }
    pub fn negative(&self) -> &[Rule] { &self.negative }
}

/* Output */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    /// 1 = flagged, 0 = not flagged
    pub flag: u8,
    pub matched_positive: Vec<String>,
    pub matched_negative: Vec<String>,
    pub explanation: String,
}

impl Classification {
    pub fn is_flagged(&self) -> bool { self.flag == 1 }
}
