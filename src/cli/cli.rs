use clap::Parser;

use crate::config::constants::{
    DEFAULT_BET, DEFAULT_DEALER_HOST, DEFAULT_DISCOUNT_FACTOR, DEFAULT_EPS_DECAY_EPISODES,
    DEFAULT_EPS_END, DEFAULT_EPS_START, DEFAULT_INITIAL_MONEY, DEFAULT_LEARNING_RATE,
    DEFAULT_PORT, DEFAULT_RETRY_MAX, DEFAULT_RETRY_PENALTY_SCALE,
};
use crate::train::runner::RunConfig;
use crate::train::schedule::{DecayType, EpsilonSchedule};

#[derive(Parser)]
#[command(author, version, about = "Q-learning blackjack player", long_about = None)]
pub struct Args {
    #[arg(long, default_value_t = 1, help = "Number of games to play")]
    games: u32,

    #[arg(long, default_value = "play_log.csv", help = "Per-action history CSV")]
    history: String,

    #[arg(long, help = "Q-table file to load before playing")]
    load: Option<String>,

    #[arg(long, help = "Q-table file to save after playing")]
    save: Option<String>,

    #[arg(long, help = "Evaluate greedily without learning", default_value_t = false)]
    testmode: bool,

    #[arg(long, default_value_t = DEFAULT_LEARNING_RATE, help = "Learning rate (alpha)")]
    alpha: f64,

    #[arg(long, default_value_t = DEFAULT_DISCOUNT_FACTOR, help = "Discount factor (gamma)")]
    gamma: f64,

    #[arg(long, default_value_t = DEFAULT_EPS_START)]
    eps_start: f64,

    #[arg(long, default_value_t = DEFAULT_EPS_END)]
    eps_end: f64,

    #[arg(long, default_value_t = DEFAULT_EPS_DECAY_EPISODES)]
    eps_decay_episodes: u32,

    #[arg(long, value_enum, default_value_t = DecayType::Linear)]
    eps_decay_type: DecayType,

    #[arg(long, help = "Optional per-episode CSV: game_id,eps,total_reward")]
    eps_log: Option<String>,

    #[arg(long, default_value_t = DEFAULT_RETRY_MAX, help = "Hard cap of RETRY actions per game")]
    max_retries_per_game: u32,

    #[arg(long, default_value_t = DEFAULT_RETRY_PENALTY_SCALE, allow_negative_numbers = true, help = "Escalation factor for the retry penalty")]
    retry_penalty_scale: f64,

    #[arg(long, help = "Suppress per-action logs for long runs", default_value_t = false)]
    quiet: bool,

    #[arg(long, help = "Random seed for reproducibility")]
    seed: Option<u64>,

    #[arg(long, default_value = DEFAULT_DEALER_HOST)]
    dealer_host: String,

    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(long, default_value_t = DEFAULT_BET, help = "Basic bet per round")]
    bet: i64,

    #[arg(long, default_value_t = DEFAULT_INITIAL_MONEY)]
    initial_money: i64,
}

impl Args {
    pub fn games(&self) -> u32 {
        self.games
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// Assembles the run configuration consumed by the trainer.
    pub fn to_run_config(&self) -> RunConfig {
        RunConfig {
            games: self.games,
            dealer_host: self.dealer_host.clone(),
            port: self.port,
            initial_money: self.initial_money,
            bet: self.bet,
            alpha: self.alpha,
            gamma: self.gamma,
            schedule: EpsilonSchedule::new(
                self.eps_decay_type,
                self.eps_start,
                self.eps_end,
                self.eps_decay_episodes,
            ),
            retry_max: self.max_retries_per_game,
            retry_penalty_scale: self.retry_penalty_scale.max(0.0),
            test_mode: self.testmode,
            quiet: self.quiet,
            seed: self.seed,
            load_path: self.load.clone(),
            save_path: self.save.clone(),
            history_path: self.history.clone(),
            eps_log_path: self.eps_log.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_mirror_constants() {
        let args = Args::parse_from(["qjack"]);
        let config = args.to_run_config();
        assert_eq!(config.games, 1);
        assert_eq!(config.bet, DEFAULT_BET);
        assert_eq!(config.retry_max, DEFAULT_RETRY_MAX);
        assert_eq!(config.history_path, "play_log.csv");
        assert!(config.load_path.is_none());
    }

    #[test]
    fn decay_type_parses_from_flag() {
        let args = Args::parse_from(["qjack", "--eps-decay-type", "exp", "--games", "5"]);
        let config = args.to_run_config();
        assert_eq!(config.schedule.decay_type, DecayType::Exp);
        assert_eq!(config.games, 5);
    }

    #[test]
    fn negative_penalty_scale_is_clamped() {
        let args = Args::parse_from(["qjack", "--retry-penalty-scale", "-1.0"]);
        assert_eq!(args.to_run_config().retry_penalty_scale, 0.0);
    }
}
