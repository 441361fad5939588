use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::Serialize;

use super::IoError;
use crate::rule::{Notation, RewriteRule};
use crate::HashSet;

/// Files a Caviar rules directory has to consist of
pub const EXPECTED_FILES: [&str; 15] = [
    "add.rs",
    "and.rs",
    "andor.rs",
    "div.rs",
    "eq.rs",
    "ineq.rs",
    "lt.rs",
    "max.rs",
    "min.rs",
    "mod.rs",
    "modulo.rs",
    "mul.rs",
    "not.rs",
    "or.rs",
    "sub.rs",
];

/// A raw rule line and where it was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub file: String,
    /// 1-based
    pub line_no: usize,
    pub text: String,
}

/// Whether a source line holds a rule in the given notation.
/// Comments and blank lines never do.
#[must_use]
pub fn is_rule_line(line: &str, notation: Notation) -> bool {
    let line = line.trim();
    match notation {
        Notation::Caviar => line.starts_with("rw!("),
        Notation::Halide => !(line.is_empty() || line.starts_with('#') || line.starts_with("//")),
    }
}

/// Reads the trimmed rule lines of a single source file.
///
/// # Errors
///
/// This function will return an error if the file cannot be read.
pub fn read_rule_lines(path: &Path, notation: Notation) -> Result<Vec<SourceLine>, IoError> {
    let contents = fs::read_to_string(path)?;
    let file = path.display().to_string();
    let lines = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| is_rule_line(line, notation))
        .map(|(index, line)| SourceLine {
            file: file.clone(),
            line_no: index + 1,
            text: line.trim().to_owned(),
        })
        .collect::<Vec<_>>();
    debug!("Found {} rules in {file}", lines.len());
    Ok(lines)
}

/// Reads every rule of a directory of rule files, in file name order.
/// For macro-call sources the directory must hold exactly [`EXPECTED_FILES`];
/// files named `mod.rs` only re-export and are skipped.
///
/// # Errors
///
/// This function will return an error if the directory or one of its files
/// cannot be read, or if its file set is not the expected one.
pub fn read_rule_dir(dir: &Path, notation: Notation) -> Result<Vec<SourceLine>, IoError> {
    let mut names = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<Result<Vec<_>, _>>()?;
    names.sort();

    if notation == Notation::Caviar {
        check_expected_files(dir, &names)?;
    }

    let mut lines = Vec::new();
    for name in names.iter().filter(|name| !name.ends_with("mod.rs")) {
        lines.extend(read_rule_lines(&dir.join(name), notation)?);
    }
    info!("Read {} rules from {}", lines.len(), dir.display());
    Ok(lines)
}

fn check_expected_files(dir: &Path, names: &[String]) -> Result<(), IoError> {
    let present = names.iter().map(String::as_str).collect::<HashSet<_>>();
    let expected = EXPECTED_FILES.into_iter().collect::<HashSet<_>>();
    if present == expected {
        return Ok(());
    }
    let mut missing = expected
        .difference(&present)
        .map(|s| (*s).to_owned())
        .collect::<Vec<_>>();
    let mut unexpected = present
        .difference(&expected)
        .map(|s| (*s).to_owned())
        .collect::<Vec<_>>();
    missing.sort();
    unexpected.sort();
    Err(IoError::UnexpectedFiles {
        dir: dir.display().to_string(),
        missing,
        unexpected,
    })
}

/// Rule names are expected to be unique across a rule set.
///
/// # Errors
///
/// This function will return an error naming the first repeated rule name.
pub fn check_unique_names(rules: &[RewriteRule]) -> Result<(), IoError> {
    let mut seen = HashSet::new();
    for rule in rules {
        if !seen.insert(rule.name.as_str()) {
            return Err(IoError::DuplicateName(rule.name.clone()));
        }
    }
    Ok(())
}
