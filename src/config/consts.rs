// src/config/consts.rs

// Diff base: the running history the upstream snapshot is compared against
pub const HISTORY_FILE: &str = "data/output/inspections_citations_latest.csv";

// Freshly downloaded upstream snapshot
pub const UPSTREAM_FILE: &str = "aphis-inspection-reports/data/combined/inspections-citations.csv";

// New rows extracted per run
pub const NEW_ROWS_DIR: &str = "data/flagging_process/new_rows";
pub const NEW_ROWS_STEM: &str = "inspections_citations_new_rows";

// Flagged output, one subdirectory per domain
pub const FLAGGED_DIR: &str = "data/flagged";
pub const FLAGGED_FILE: &str = "initial_flagged.csv";
pub const FLAGGED_HISTORY_FILE: &str = "flagged_history.csv";

// Columns
pub const NARRATIVE_COLUMN: &str = "narrative";
pub const EXPLANATION_COLUMN: &str = "classification_explanation";
pub const MATCHED_POSITIVE_COLUMN: &str = "matched_positive_rules";
pub const MATCHED_NEGATIVE_COLUMN: &str = "matched_negative_rules";

// Sanity-check output
pub const EXAMPLE_ROWS: usize = 5;
pub const EXAMPLE_NARRATIVE_CHARS: usize = 200;

// Logging
pub const DEFAULT_LOG_FILTER: &str = "citeflag=info";
