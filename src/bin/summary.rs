use std::path::PathBuf;

use clap::Parser;

use rulebridge::io::summary::{self, ComparisonEntry, FilterEntry, Summary};
use rulebridge::RuleBridgeError;

#[derive(Parser)]
#[command(about = "Summarize Chompy vs Caviar evaluation results")]
struct Args {
    /// Evaluation results JSON
    #[arg(long)]
    filename: PathBuf,

    /// Write the expressions that need conditional rules to this CSV instead
    #[arg(long)]
    filter_output: Option<PathBuf>,

    /// Number of rows the filter is expected to produce
    #[arg(long, requires = "filter_output")]
    expected_count: Option<usize>,
}

fn main() -> Result<(), RuleBridgeError> {
    env_logger::init();
    let args = Args::parse();

    if let Some(output) = &args.filter_output {
        let entries = summary::read_results::<FilterEntry>(&args.filename)?;
        let rows = summary::necessary_conditional(&entries);
        summary::write_conditional_csv(output, &rows, args.expected_count)?;
        println!("Found {} expressions that need conditional rules", rows.len());
    } else {
        let entries = summary::read_results::<ComparisonEntry>(&args.filename)?;
        println!("{}", Summary::from_entries(&entries));
    }
    Ok(())
}
