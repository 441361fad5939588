use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::batch::BatchConf;
use crate::rule::Notation;

/// Where the Caviar rules live below the evaluation directory
pub const CAVIAR_RULES: &str = "caviar/src/rules";

#[derive(Parser, Serialize, Deserialize, Debug, Eq, PartialEq, Clone)]
#[command(version, about = "Translate rewrite rules into canonical prefix notation", long_about = None)]
pub struct Cli {
    /// Notation of the source rules
    #[arg(long, default_value_t = Notation::Caviar)]
    notation: Notation,

    /// Rule file or directory of rule files
    #[arg(long)]
    input: Option<PathBuf>,

    /// Evaluation checkout holding the Caviar sources
    #[arg(long, env = "CHOMPY_EVAL_DIR")]
    rules_dir: Option<PathBuf>,

    /// Output file, stdout if absent
    #[arg(long)]
    output: Option<PathBuf>,

    /// Also write the parsed rules as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Skip rules that fail to translate instead of aborting
    #[arg(long, default_value_t = false)]
    lenient: bool,

    /// Translate on a single thread
    #[arg(long, default_value_t = false)]
    sequential: bool,

    /// Show a progress bar
    #[arg(long, default_value_t = false)]
    progress: bool,
}

impl Cli {
    #[must_use]
    pub fn notation(&self) -> Notation {
        self.notation
    }

    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    #[must_use]
    pub fn json(&self) -> Option<&Path> {
        self.json.as_deref()
    }

    #[must_use]
    pub fn lenient(&self) -> bool {
        self.lenient
    }

    /// `--input` if given, else the Caviar rules below the evaluation directory.
    #[must_use]
    pub fn rule_source(&self) -> Option<PathBuf> {
        self.input
            .clone()
            .or_else(|| self.rules_dir.as_ref().map(|dir| dir.join(CAVIAR_RULES)))
    }

    #[must_use]
    pub fn batch_conf(&self) -> BatchConf {
        BatchConf::builder()
            .fail_fast(!self.lenient)
            .parallel(!self.sequential)
            .progress(self.progress)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_wins_over_rules_dir() {
        let cli = Cli::parse_from([
            "rulebridge",
            "--notation",
            "halide",
            "--input",
            "rules.txt",
            "--rules-dir",
            "/eval",
        ]);
        assert_eq!(cli.notation(), Notation::Halide);
        assert_eq!(cli.rule_source(), Some(PathBuf::from("rules.txt")));
    }

    #[test]
    fn rules_dir_fallback() {
        let cli = Cli::parse_from(["rulebridge", "--rules-dir", "/eval/", "--lenient"]);
        assert_eq!(cli.notation(), Notation::Caviar);
        assert_eq!(
            cli.rule_source(),
            Some(PathBuf::from("/eval/caviar/src/rules"))
        );
        let conf = cli.batch_conf();
        assert!(!conf.fail_fast);
        assert!(conf.parallel);
    }

    #[test]
    fn bad_notation() {
        assert!(Cli::try_parse_from(["rulebridge", "--notation", "lisp"]).is_err());
    }
}
