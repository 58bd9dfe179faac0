// crates/augur-cli/src/commands/scores.rs
//
// `augur scores --topic T --block B [--kind K] [--json]`: print stored scores.

use clap::{Args, ValueEnum};

use augur_core::{BlockHeight, ScoreKind, ScoreStore, TopicId};

use crate::commands::score::open_keeper;
use crate::config::CliConfig;
use crate::output::{format_json, format_table, OutputFormat, ScoreRecord, ScoreRow};

/// Score table selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Reputer,
    Inference,
    Forecast,
}

impl From<KindArg> for ScoreKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Reputer => ScoreKind::Reputer,
            KindArg::Inference => ScoreKind::Inference,
            KindArg::Forecast => ScoreKind::Forecast,
        }
    }
}

/// Arguments of `augur scores`.
#[derive(Debug, Args)]
pub struct ScoresCmd {
    /// Topic to inspect.
    #[arg(long)]
    pub topic: TopicId,

    /// Block height of the round.
    #[arg(long, allow_hyphen_values = true)]
    pub block: BlockHeight,

    /// Only show one score table.
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Print scores as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Run the scores subcommand.
pub async fn run(cmd: &ScoresCmd, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let keeper = open_keeper(config)?;
    let kinds: Vec<ScoreKind> = match cmd.kind {
        Some(kind) => vec![kind.into()],
        None => ScoreKind::ALL.to_vec(),
    };

    let mut found = Vec::new();
    for kind in kinds {
        for score in keeper.scores_at(kind, cmd.topic, cmd.block)? {
            found.push((kind, score));
        }
    }

    match OutputFormat::from_json_flag(cmd.json) {
        OutputFormat::Json => {
            let records: Vec<ScoreRecord> = found
                .iter()
                .map(|(kind, score)| ScoreRecord { kind: *kind, score })
                .collect();
            println!("{}", format_json(&records));
        }
        OutputFormat::Table => {
            if found.is_empty() {
                println!("No scores recorded for topic {} block {}", cmd.topic, cmd.block);
            } else {
                let rows: Vec<ScoreRow> = found
                    .iter()
                    .map(|(kind, score)| ScoreRow::new(*kind, score))
                    .collect();
                println!("{}", format_table(&rows));
            }
        }
    }

    Ok(())
}
