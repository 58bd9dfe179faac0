// crates/augur-cli/src/commands/coefficient.rs
//
// `augur coefficient --topic T --reputer ADDR`: print a listening coefficient.

use clap::Args;

use augur_core::{Address, CoefficientStore, TopicId};

use crate::commands::score::open_keeper;
use crate::config::CliConfig;

/// Arguments of `augur coefficient`.
#[derive(Debug, Args)]
pub struct CoefficientCmd {
    /// Topic the coefficient is scoped to.
    #[arg(long)]
    pub topic: TopicId,

    /// Reputer address (0x-prefixed hex).
    #[arg(long)]
    pub reputer: String,
}

/// Run the coefficient subcommand.
pub async fn run(cmd: &CoefficientCmd, config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let reputer = Address::parse(&cmd.reputer)?;
    let keeper = open_keeper(config)?;
    let coefficient = keeper.listening_coefficient(cmd.topic, &reputer)?;

    println!("Listening coefficient");
    println!("---------------------");
    println!("  Topic:       {}", cmd.topic);
    println!("  Reputer:     {}", reputer);
    println!("  Coefficient: {:.6}", coefficient.coefficient);

    Ok(())
}
