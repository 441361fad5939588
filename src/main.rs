use std::io;

use clap::Parser;
use log::info;

use rulebridge::cli::Cli;
use rulebridge::io::{reader, writer};
use rulebridge::{translate_all, RuleBridgeError};

fn main() -> Result<(), RuleBridgeError> {
    env_logger::init();

    let cli = Cli::parse();
    let source = cli.rule_source().ok_or(RuleBridgeError::MissingSource)?;
    let notation = cli.notation();
    info!("Reading {notation} rules from {}", source.display());

    let lines = if source.is_dir() {
        reader::read_rule_dir(&source, notation)?
    } else {
        reader::read_rule_lines(&source, notation)?
    };
    let texts = lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>();

    let report = translate_all(&texts, notation, &cli.batch_conf())?;
    reader::check_unique_names(&report.rules)?;

    match cli.output() {
        Some(path) => writer::write_rules_file(path, &report.rules)?,
        None => writer::write_rules(io::stdout().lock(), &report.rules)?,
    }
    if let Some(path) = cli.json() {
        writer::write_rules_json(path, &report.rules)?;
    }

    for failure in &report.failures {
        if let Some(origin) = lines.get(failure.index) {
            eprintln!("{}:{}: {}", origin.file, origin.line_no, failure.source);
        }
    }
    if !report.is_clean() {
        eprintln!("Skipped {} rules", report.failures.len());
    }
    Ok(())
}
