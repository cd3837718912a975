// src/classify.rs
//! Batch driver: run one classifier over every row of a table and attach
//! the result as four columns.

use crate::config::consts::{
    EXAMPLE_NARRATIVE_CHARS, EXAMPLE_ROWS, EXPLANATION_COLUMN, MATCHED_NEGATIVE_COLUMN,
    MATCHED_POSITIVE_COLUMN,
};
use crate::core::sanitize::truncate_chars;
use crate::csv::format_list;
use crate::engine::{Classification, Classifier};
use crate::error::Result;
use crate::store::DataSet;

/// Columns added by `classify_dataset`, in output order.
pub fn result_columns(classifier: &Classifier) -> [String; 4] {
    [
        s!(classifier.rules().flag_column()),
        s!(EXPLANATION_COLUMN),
        s!(MATCHED_POSITIVE_COLUMN),
        s!(MATCHED_NEGATIVE_COLUMN),
    ]
}

fn result_cells(c: &Classification) -> [String; 4] {
    [
        c.flag.to_string(),
        c.explanation.clone(),
        format_list(&c.matched_positive),
        format_list(&c.matched_negative),
    ]
}

/// `rows` plus flag, explanation, matched-positive and matched-negative
/// columns. Result columns already present are overwritten in place, so
/// classifying a classified table gives the same table back.
pub fn classify_dataset(
    rows: &DataSet,
    classifier: &Classifier,
    narrative_column: &str,
) -> Result<(DataSet, Vec<Classification>)> {
    let narrative = rows.require_column(narrative_column)?;

    let mut headers = rows.headers.clone();
    let targets: Vec<usize> = result_columns(classifier)
        .into_iter()
        .map(|name| match headers.iter().position(|h| *h == name) {
            Some(ix) => ix,
            None => {
                headers.push(name);
                headers.len() - 1
            }
        })
        .collect();

    let mut out_rows = Vec::with_capacity(rows.len());
    let mut results = Vec::with_capacity(rows.len());

    for row in &rows.rows {
        // short rows have no narrative cell at all
        let result = classifier.classify_opt(row.get(narrative).map(String::as_str));

        let mut out = row.clone();
        out.resize(headers.len(), s!());
        for (ix, cell) in targets.iter().zip(result_cells(&result)) {
            out[*ix] = cell;
        }

        out_rows.push(out);
        results.push(result);
    }

    Ok((DataSet::new(headers, out_rows).with_origin(rows.origin()), results))
}

/* ---------------- Sanity-check summary ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Example {
    pub narrative: String,
    pub matched_positive: Vec<String>,
    pub explanation: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassifySummary {
    pub domain: String,
    pub total: usize,
    pub flagged: usize,
    pub examples: Vec<Example>,
}

impl ClassifySummary {
    pub fn build(
        domain: &str,
        rows: &DataSet,
        narrative_column: &str,
        results: &[Classification],
    ) -> Self {
        let narrative = rows.column_index(narrative_column);
        let examples = results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_flagged())
            .take(EXAMPLE_ROWS)
            .map(|(i, r)| Example {
                narrative: narrative
                    .map(|col| s!(truncate_chars(rows.cell(i, col), EXAMPLE_NARRATIVE_CHARS)))
                    .unwrap_or_default(),
                matched_positive: r.matched_positive.clone(),
                explanation: r.explanation.clone(),
            })
            .collect();

        Self {
            domain: s!(domain),
            total: results.len(),
            flagged: results.iter().filter(|r| r.is_flagged()).count(),
            examples,
        }
    }

    /// Share of flagged rows in percent; 0 for an empty table.
    pub fn percent(&self) -> f64 {
        if self.total == 0 { return 0.0; }
        self.flagged as f64 * 100.0 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RuleSet;
    use crate::specs;
    use pretty_assertions::assert_eq;

    fn air() -> Classifier {
        Classifier::new(RuleSet::compile(&specs::builtin("air_transport").unwrap()).unwrap())
    }

    fn table() -> DataSet {
        DataSet::new(
            row!["id", "narrative"],
            vec![
                row!["1", "Shipped by air cargo"],
                row!["2", "Enclosure needs repair"],
                row!["3", ""],
            ],
        )
    }

    #[test]
    fn appends_four_columns_in_order() {
        let (out, results) = classify_dataset(&table(), &air(), "narrative").unwrap();
        assert_eq!(
            out.headers,
            row![
                "id", "narrative", "air_transport_flag", "classification_explanation",
                "matched_positive_rules", "matched_negative_rules"
            ]
        );
        assert_eq!(
            out.rows[0],
            row![
                "1", "Shipped by air cargo", "1",
                "Matched positive rules: ['transport_terms']", "['transport_terms']", "[]"
            ]
        );
        assert_eq!(out.rows[1][2..].to_vec(), row!["0", "No positive rules matched", "[]", "[]"]);
        assert_eq!(out.rows[2][3], "Invalid input");
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn rerun_over_output_is_idempotent() {
        let c = air();
        let (once, _) = classify_dataset(&table(), &c, "narrative").unwrap();
        let (twice, _) = classify_dataset(&once, &c, "narrative").unwrap();
        assert_eq!(once.headers, twice.headers);
        assert_eq!(once.rows, twice.rows);
    }

    #[test]
    fn missing_narrative_column_is_fatal() {
        let ds = DataSet::new(row!["id"], vec![row!["1"]]);
        assert!(classify_dataset(&ds, &air(), "narrative").is_err());
    }

    #[test]
    fn short_row_without_narrative_is_invalid_input() {
        let ds = DataSet::new(row!["id", "narrative"], vec![vec![s!("1")]]);
        let (out, results) = classify_dataset(&ds, &air(), "narrative").unwrap();
        assert_eq!(results[0].explanation, "Invalid input");
        assert_eq!(out.rows[0].len(), 6);
        assert_eq!(out.rows[0][1], "");
    }

    #[test]
    fn summary_counts_and_examples() {
        let (_, results) = classify_dataset(&table(), &air(), "narrative").unwrap();
        let summary = ClassifySummary::build("air_transport", &table(), "narrative", &results);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.flagged, 1);
        assert_eq!(summary.examples.len(), 1);
        assert_eq!(summary.examples[0].narrative, "Shipped by air cargo");
        assert!((summary.percent() - 100.0 / 3.0).abs() < 1e-9);
    }
}
