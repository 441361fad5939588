use bon::Builder;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressIterator};
use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::rule::{Notation, RewriteRule, RuleError};

/// How a whole rule set is translated
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct BatchConf {
    /// Abort on the first rule that fails instead of skipping it
    #[builder(default = true)]
    pub fail_fast: bool,
    #[builder(default = true)]
    pub parallel: bool,
    #[builder(default = false)]
    pub progress: bool,
}

impl Default for BatchConf {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Default)]
pub struct BatchReport {
    /// Translated rules, in input order
    pub rules: Vec<RewriteRule>,
    /// Rules skipped in lenient mode, in input order
    pub failures: Vec<RuleError>,
}

impl BatchReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Translates every line. Unnamed rules are named after their position in `lines`.
///
/// # Errors
///
/// With `fail_fast` set, this function will return the error of the first
/// line (in input order) that fails to translate.
pub fn translate_all<S: AsRef<str> + Sync>(
    lines: &[S],
    notation: Notation,
    conf: &BatchConf,
) -> Result<BatchReport, RuleError> {
    let bar = if conf.progress {
        ProgressBar::new(lines.len() as u64)
    } else {
        ProgressBar::hidden()
    };
    let translate =
        |(index, line): (usize, &S)| RewriteRule::from_line(line.as_ref(), notation, index);

    let results = if conf.parallel {
        lines
            .par_iter()
            .enumerate()
            .progress_with(bar.clone())
            .map(translate)
            .collect::<Vec<_>>()
    } else {
        lines
            .iter()
            .enumerate()
            .progress_with(bar.clone())
            .map(translate)
            .collect::<Vec<_>>()
    };
    bar.finish_and_clear();

    let mut report = BatchReport::default();
    for result in results {
        match result {
            Ok(rule) => report.rules.push(rule),
            Err(e) if conf.fail_fast => return Err(e),
            Err(e) => {
                warn!("Skipping rule: {e}");
                report.failures.push(e);
            }
        }
    }
    info!(
        "Translated {} rules, skipped {}",
        report.rules.len(),
        report.failures.len()
    );
    Ok(report)
}
