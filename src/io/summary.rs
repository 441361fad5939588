use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use csv::Writer;
use indexmap::IndexMap;
use log::info;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::IoError;

#[derive(Debug, Clone, Deserialize)]
struct ResultsFile<T> {
    results: Vec<T>,
}

/// Reads the `results` array of an evaluation output file.
///
/// # Errors
///
/// This function will return an error if the file cannot be read or does
/// not deserialize into `T` entries.
pub fn read_results<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, IoError> {
    let reader = BufReader::new(File::open(path)?);
    let file: ResultsFile<T> = serde_json::from_reader(reader)?;
    Ok(file.results)
}

/// Outcome of one simplifier run on one expression
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunResult {
    pub stop_reason: String,
    #[serde(default)]
    pub start_expression: Option<String>,
    #[serde(default)]
    pub halide_result: Option<serde_json::Value>,
    #[serde(default)]
    pub halide_time: Option<serde_json::Value>,
}

impl RunResult {
    /// Proved or refuted the goal, or showed it impossible
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.stop_reason.contains("Matched") || self.stop_reason.contains("Impossible")
    }

    fn failure_reason(&self) -> &str {
        if self.stop_reason.contains("Time Limit") {
            "Time Limit"
        } else if self.stop_reason.contains("Node Limit") {
            "Node Limit"
        } else {
            &self.stop_reason
        }
    }

    /// Which verdict, if any, contradicts the z3 result
    fn inconsistency(&self, z3_result: &str) -> Option<&'static str> {
        let reason = &self.stop_reason;
        if reason.contains("Goal 0") && z3_result != "invalid" {
            Some("Goal 0")
        } else if reason.contains("Goal 1") && z3_result != "valid" {
            Some("Goal 1")
        } else if reason.contains("Impossible") && z3_result != "unknown" {
            Some("Unknown")
        } else {
            None
        }
    }
}

/// One expression of a Chompy vs Caviar comparison run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComparisonEntry {
    #[serde(default)]
    pub expression: Option<String>,
    pub chompy_result: RunResult,
    pub caviar_result: RunResult,
    pub z3_result: String,
}

impl ComparisonEntry {
    fn disagree(&self) -> bool {
        let ours = &self.chompy_result.stop_reason;
        let theirs = &self.caviar_result.stop_reason;
        (ours.contains("Goal 0") && theirs.contains("Goal 1"))
            || (ours.contains("Goal 1") && theirs.contains("Goal 0"))
            || (ours.contains("Goal") && theirs.contains("Impossible"))
            || (ours.contains("Impossible") && theirs.contains("Goal"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub chompy_successes: usize,
    pub caviar_successes: usize,
    pub chompy_failures_caviar_successes: usize,
    pub caviar_failures_chompy_successes: usize,
    pub chompy_failure_reasons: IndexMap<String, usize>,
    pub chompy_inconsistencies: IndexMap<String, usize>,
    pub caviar_inconsistencies: IndexMap<String, usize>,
    pub disagreements: usize,
}

impl Summary {
    #[must_use]
    pub fn from_entries(entries: &[ComparisonEntry]) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            let z3 = entry.z3_result.trim();
            let expression = entry.expression.as_deref().unwrap_or("<unknown>");

            if let Some(kind) = entry.chompy_result.inconsistency(z3) {
                info!(
                    "Chompy inconsistent ({kind}) on {expression}: {} vs z3 {z3}",
                    entry.chompy_result.stop_reason
                );
                *summary.chompy_inconsistencies.entry(kind.to_owned()).or_default() += 1;
            }
            if let Some(kind) = entry.caviar_result.inconsistency(z3) {
                info!(
                    "Caviar inconsistent ({kind}) on {expression}: {} vs z3 {z3}",
                    entry.caviar_result.stop_reason
                );
                *summary.caviar_inconsistencies.entry(kind.to_owned()).or_default() += 1;
            }
            if entry.disagree() {
                info!(
                    "Disagreement on {expression}: chompy {}, caviar {}, z3 {z3}",
                    entry.chompy_result.stop_reason, entry.caviar_result.stop_reason
                );
                summary.disagreements += 1;
            }

            let chompy_success = entry.chompy_result.is_success();
            let caviar_success = entry.caviar_result.is_success();
            if chompy_success {
                summary.chompy_successes += 1;
            } else {
                let reason = entry.chompy_result.failure_reason().to_owned();
                *summary.chompy_failure_reasons.entry(reason).or_default() += 1;
            }
            if caviar_success {
                summary.caviar_successes += 1;
            }
            match (chompy_success, caviar_success) {
                (true, false) => summary.caviar_failures_chompy_successes += 1,
                (false, true) => summary.chompy_failures_caviar_successes += 1,
                _ => (),
            }
        }
        summary
    }
}

impl Display for Summary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        fn tally(
            f: &mut Formatter<'_>,
            who: &str,
            counts: &IndexMap<String, usize>,
        ) -> std::fmt::Result {
            if counts.is_empty() {
                return writeln!(f, "No {who} inconsistencies found");
            }
            writeln!(f, "{who} inconsistencies:")?;
            for (goal, count) in counts {
                writeln!(f, "{goal}: {count}")?;
            }
            Ok(())
        }

        writeln!(f, "Chompy successes: {}", self.chompy_successes)?;
        writeln!(f, "Caviar successes: {}", self.caviar_successes)?;
        writeln!(
            f,
            "Chompy failures, Caviar successes: {}",
            self.chompy_failures_caviar_successes
        )?;
        writeln!(
            f,
            "Caviar failures, Chompy successes: {}",
            self.caviar_failures_chompy_successes
        )?;
        writeln!(f, "Chompy failure data:")?;
        for (reason, count) in &self.chompy_failure_reasons {
            writeln!(f, "{reason}: {count}")?;
        }
        tally(f, "Chompy", &self.chompy_inconsistencies)?;
        tally(f, "Caviar", &self.caviar_inconsistencies)?;
        if self.disagreements == 0 {
            write!(f, "No disagreements found")
        } else {
            write!(f, "Disagreements: {}", self.disagreements)
        }
    }
}

/// One expression of a Caviar vs other-ruleset run
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterEntry {
    pub caviar_result: RunResult,
    pub other_result: RunResult,
}

/// Row of the CSV Caviar reads its expressions from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalRow {
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "Expression")]
    pub expression: String,
    #[serde(rename = "HalideResult")]
    pub halide_result: String,
    #[serde(rename = "HalideTime")]
    pub halide_time: String,
}

/// Stricter than [`RunResult::is_success`]: only an exact goal match counts.
fn solved(result: &RunResult) -> bool {
    result.stop_reason == "Goal 0 Matched"
        || result.stop_reason == "Goal 1 Matched"
        || result.stop_reason.contains("Impossible")
}

fn plain(value: Option<&serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Keeps the expressions Caviar solved and the other ruleset did not,
/// i.e. the ones that need conditional rewrite rules.
#[must_use]
pub fn necessary_conditional(entries: &[FilterEntry]) -> Vec<ConditionalRow> {
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| solved(&entry.caviar_result) && !solved(&entry.other_result))
        .map(|(id, entry)| ConditionalRow {
            id,
            expression: entry
                .caviar_result
                .start_expression
                .clone()
                .unwrap_or_default(),
            halide_result: plain(entry.caviar_result.halide_result.as_ref()),
            halide_time: plain(entry.caviar_result.halide_time.as_ref()),
        })
        .collect()
}

/// Writes the filtered rows as `ID,Expression,HalideResult,HalideTime` CSV.
///
/// # Errors
///
/// This function will return an error if the file cannot be written, or if
/// `expected` is given and the row count differs from it.
pub fn write_conditional_csv(
    path: &Path,
    rows: &[ConditionalRow],
    expected: Option<usize>,
) -> Result<(), IoError> {
    if let Some(expected) = expected {
        if rows.len() != expected {
            return Err(IoError::ResultCount {
                expected,
                found: rows.len(),
            });
        }
    }
    let mut wtr = Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(stop_reason: &str) -> RunResult {
        RunResult {
            stop_reason: stop_reason.into(),
            start_expression: None,
            halide_result: None,
            halide_time: None,
        }
    }

    fn entry(chompy: &str, caviar: &str, z3: &str) -> ComparisonEntry {
        ComparisonEntry {
            expression: Some("(< x y)".into()),
            chompy_result: run(chompy),
            caviar_result: run(caviar),
            z3_result: z3.into(),
        }
    }

    #[test]
    fn tallies() {
        let entries = [
            entry("Goal 1 Matched", "Goal 1 Matched", "valid\n"),
            entry("Time Limit: 60s", "Goal 0 Matched", "invalid"),
            entry("Node Limit", "Impossible", "unknown"),
            entry("Goal 0 Matched", "Saturated", "valid"),
            entry("Saturated", "Saturated", "unknown"),
        ];
        let summary = Summary::from_entries(&entries);
        assert_eq!(summary.chompy_successes, 2);
        assert_eq!(summary.caviar_successes, 3);
        assert_eq!(summary.chompy_failures_caviar_successes, 2);
        assert_eq!(summary.caviar_failures_chompy_successes, 1);
        assert_eq!(
            summary.chompy_failure_reasons.iter().collect::<Vec<_>>(),
            vec![
                (&"Time Limit".to_owned(), &1),
                (&"Node Limit".to_owned(), &1),
                (&"Saturated".to_owned(), &1)
            ]
        );
        assert_eq!(summary.chompy_inconsistencies.get("Goal 0"), Some(&1));
        assert!(summary.caviar_inconsistencies.is_empty());
        assert_eq!(summary.disagreements, 0);
    }

    #[test]
    fn disagreements() {
        let entries = [
            entry("Goal 0 Matched", "Goal 1 Matched", "unknown"),
            entry("Impossible", "Goal 1 Matched", "valid"),
        ];
        let summary = Summary::from_entries(&entries);
        assert_eq!(summary.disagreements, 2);
        assert_eq!(summary.chompy_inconsistencies.len(), 2);
        assert_eq!(summary.caviar_inconsistencies.get("Goal 1"), Some(&1));
        assert!(summary.to_string().ends_with("Disagreements: 2"));
    }

    #[test]
    fn parses_results_json() {
        let json = r#"{"results": [
            {"expression": "(< a b)", "z3_result": "valid",
             "chompy_result": {"stop_reason": "Goal 1 Matched"},
             "caviar_result": {"stop_reason": "Impossible"}}
        ]}"#;
        let file: ResultsFile<ComparisonEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(file.results.len(), 1);
        assert_eq!(file.results[0].caviar_result.stop_reason, "Impossible");
    }

    #[test]
    fn filters_conditional() {
        let json = r#"{"results": [
            {"caviar_result": {"stop_reason": "Goal 0 Matched", "start_expression": "(< a a)", "halide_result": "false", "halide_time": 0.25},
             "other_result": {"stop_reason": "Saturated"}},
            {"caviar_result": {"stop_reason": "Goal 1 Matched", "start_expression": "(== a a)"},
             "other_result": {"stop_reason": "Goal 1 Matched"}},
            {"caviar_result": {"stop_reason": "Matched something else"},
             "other_result": {"stop_reason": "Saturated"}}
        ]}"#;
        let file: ResultsFile<FilterEntry> = serde_json::from_str(json).unwrap();
        let rows = necessary_conditional(&file.results);
        assert_eq!(
            rows,
            vec![ConditionalRow {
                id: 0,
                expression: "(< a a)".into(),
                halide_result: "false".into(),
                halide_time: "0.25".into(),
            }]
        );
    }

    #[test]
    fn csv_count_check() {
        let path = std::env::temp_dir().join(format!("rulebridge-{}-rows.csv", std::process::id()));
        assert!(matches!(
            write_conditional_csv(&path, &[], Some(688)),
            Err(IoError::ResultCount {
                expected: 688,
                found: 0
            })
        ));
        let rows = [ConditionalRow {
            id: 3,
            expression: "(< a (+ a 1))".into(),
            halide_result: "true".into(),
            halide_time: "1.5".into(),
        }];
        write_conditional_csv(&path, &rows, None).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "ID,Expression,HalideResult,HalideTime\n3,(< a (+ a 1)),true,1.5\n"
        );
        std::fs::remove_file(&path).unwrap();
    }
}
