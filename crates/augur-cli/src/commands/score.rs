// crates/augur-cli/src/commands/score.rs
//
// `augur score <ROUND_FILE>...`: score rounds from JSON round files.
//
// Each round file carries the ledger view it was produced against. The runner
// seeds that view under the topic lock right before the round is scored, so
// later files never leak into earlier rounds. Unreadable files are reported as
// unscored next to the rounds that ran.

use std::sync::Arc;

use clap::Args;

use augur_store::RocksKeeper;

use crate::config::CliConfig;
use crate::input::RoundInput;
use crate::output::{format_json, format_table, OutputFormat, ReportRow};
use crate::runner::{RoundReport, RoundRunner, RoundStatus};

/// Arguments of `augur score`.
#[derive(Debug, Args)]
pub struct ScoreCmd {
    /// Round files to score.
    #[arg(required = true)]
    pub rounds: Vec<String>,

    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run the score subcommand. Returns whether every round was scored.
pub async fn run(cmd: &ScoreCmd, config: &CliConfig) -> Result<bool, Box<dyn std::error::Error>> {
    let keeper = Arc::new(open_keeper(config)?);

    let mut reports = Vec::new();
    let mut runnable = Vec::new();
    for path in &cmd.rounds {
        let input = match RoundInput::load(path) {
            Ok(input) => input,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "round file rejected");
                reports.push(unreadable(path, e.to_string()));
                continue;
            }
        };
        runnable.push((path.clone(), input));
    }

    let runner = Arc::new(RoundRunner::new(keeper, config.scoring.clone()));
    reports.extend(runner.run_all(runnable).await);

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => println!("{}", format_json(&reports)),
        OutputFormat::Table => {
            let rows: Vec<ReportRow> = reports.iter().map(ReportRow::from).collect();
            println!("{}", format_table(&rows));
        }
    }

    Ok(reports.iter().all(RoundReport::is_scored))
}

/// Open the keeper under the configured data directory, creating it if needed.
pub fn open_keeper(config: &CliConfig) -> Result<RocksKeeper, Box<dyn std::error::Error>> {
    let path = config.keeper_path();
    if let Some(parent) = std::path::Path::new(&path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(RocksKeeper::open(&path)?)
}

fn unreadable(path: &str, reason: String) -> RoundReport {
    RoundReport {
        label: path.to_string(),
        topic_id: 0,
        block_height: 0,
        status: RoundStatus::Unscored { reason },
    }
}
