use anyhow::Result;
use clap::Parser;

use qjack::cli::cli::Args;
use qjack::train::runner::Trainer;
use qjack::utils::logging;

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init_logging();

    if !args.quiet() {
        println!("qjack: Q-learning blackjack player ({} games)", args.games());
    }

    let mut trainer = Trainer::new(args.to_run_config());
    let summary = trainer.run()?;

    println!(
        "Played {} games; final money: {} $, total reward: {} $, Q-table entries: {}",
        summary.games_played, summary.final_money, summary.total_reward, summary.q_entries
    );

    Ok(())
}
