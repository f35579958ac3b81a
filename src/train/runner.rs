//! Episode orchestration: the train/evaluate loop.
//!
//! One round at a time: connect, bet, exchange actions until a terminal
//! status, settling money and updating the Q-table along the way. There is
//! no module-level state; everything lives in the `Trainer`.

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::ai::action::{Action, Strategy};
use crate::ai::qtable::{QTable, TableMeta};
use crate::ai::state::StateKey;
use crate::config::constants::{DEFAULT_Q_VALUE, MAX_CONNECT_ROUNDS};
use crate::error::QjackError;
use crate::game::bankroll::Bankroll;
use crate::net::connection;
use crate::net::protocol::{RoundClient, RoundStatus, StepOutcome};
use crate::train::history::{ActionRecord, EpisodeLogWriter, EpisodeRecord, HistoryWriter};
use crate::train::schedule::EpsilonSchedule;

/// Everything a run needs, assembled by the CLI layer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub games: u32,
    pub dealer_host: String,
    pub port: u16,
    pub initial_money: i64,
    pub bet: i64,
    pub alpha: f64,
    pub gamma: f64,
    pub schedule: EpsilonSchedule,
    pub retry_max: u32,
    pub retry_penalty_scale: f64,
    pub test_mode: bool,
    pub quiet: bool,
    pub seed: Option<u64>,
    pub load_path: Option<String>,
    pub save_path: Option<String>,
    pub history_path: String,
    pub eps_log_path: Option<String>,
}

/// Final tallies reported after a run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub games_played: u32,
    pub final_money: i64,
    pub total_reward: i64,
    pub q_entries: usize,
}

pub struct Trainer {
    config: RunConfig,
    q_table: QTable,
    bankroll: Bankroll,
    rng: StdRng,
}

impl Trainer {
    pub fn new(config: RunConfig) -> Self {
        let q_table = match &config.load_path {
            Some(path) => QTable::load_from_file(path, DEFAULT_Q_VALUE),
            None => QTable::new(DEFAULT_Q_VALUE),
        };
        let bankroll = Bankroll::new(config.initial_money, config.bet);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            q_table,
            bankroll,
            rng,
        }
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    /// Plays the configured number of games. Connection exhaustion and
    /// protocol violations are fatal; persistence problems only warn.
    pub fn run(&mut self) -> Result<RunSummary, QjackError> {
        let mut history = HistoryWriter::create(&self.config.history_path)?;
        let mut eps_log = match &self.config.eps_log_path {
            Some(path) => Some(EpisodeLogWriter::create(path)?),
            None => None,
        };

        let progress = if self.config.quiet {
            let bar = ProgressBar::new(u64::from(self.config.games));
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {pos}/{len} games ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            Some(bar)
        } else {
            None
        };

        let mut total_reward: i64 = 0;
        for game_id in 1..=self.config.games {
            let epsilon = self.config.schedule.epsilon_for(game_id);
            let round_reward = self.play_round(game_id, epsilon, &mut history)?;
            total_reward += round_reward;

            if let Some(log) = eps_log.as_mut() {
                let record = EpisodeRecord {
                    game_id,
                    eps: epsilon,
                    total_reward: round_reward,
                };
                if let Err(e) = log.record(&record) {
                    warn!("failed to append epsilon log record: {}", e);
                }
            }
            if let Some(bar) = &progress {
                bar.inc(1);
            }
        }
        if let Some(bar) = &progress {
            bar.finish();
        }

        if let Some(path) = self.config.save_path.clone() {
            let meta = self.table_meta();
            match self.q_table.save_to_file(&path, &meta) {
                Ok(()) => info!("saved Q-table with {} entries to {}", self.q_table.len(), path),
                // Training results stay valid in memory; only persistence is lost.
                Err(e) => warn!("failed to save Q-table to {}: {}", path, e),
            }
        }

        Ok(RunSummary {
            games_played: self.config.games,
            final_money: self.bankroll.money(),
            total_reward,
            q_entries: self.q_table.len(),
        })
    }

    fn table_meta(&self) -> TableMeta {
        TableMeta {
            alpha: self.config.alpha,
            gamma: self.config.gamma,
            eps_start: self.config.schedule.eps_start,
            eps_end: self.config.schedule.eps_end,
            eps_decay_episodes: self.config.schedule.decay_episodes,
            eps_decay_type: self.config.schedule.decay_type.as_str().to_string(),
            games: self.config.games,
            saved_at: Some(chrono::Local::now().to_rfc3339()),
        }
    }

    /// One full round: connect, receive the deal, then the action loop.
    /// Returns the round's net reward (settlement plus any retry penalties).
    fn play_round(
        &mut self,
        game_id: u32,
        epsilon: f64,
        history: &mut HistoryWriter,
    ) -> Result<i64, QjackError> {
        let verbose = !self.config.quiet;
        if verbose {
            println!("Game {} start.", game_id);
            println!("  money: {} $", self.bankroll.money());
        }

        let stream = connection::connect(
            &self.config.dealer_host,
            self.config.port,
            MAX_CONNECT_ROUNDS,
            &mut self.rng,
        )?;
        let mut client = RoundClient::new(stream);

        let (bet, money) = self.bankroll.place_bet();
        if verbose {
            println!("Action: BET");
            println!("  money: {} $", money);
            println!("  bet: {} $", bet);
        }

        let start = client.start_round()?;
        if verbose {
            if start.shuffled {
                println!("Dealer said: Card set has been shuffled before this game.");
            }
            println!("Dealer gave cards.");
            println!("  dealer-card: {}", start.dealer_card.label());
            for (i, card) in start.player_cards.iter().enumerate() {
                println!("  player-card {}: {}", i + 1, card.label());
            }
            println!("  current score: {}", client.player_score());
        }

        let mut round_reward: i64 = 0;
        loop {
            let state = StateKey::encode(client.player_hand(), client.retries());
            let strategy = if self.config.test_mode {
                Strategy::Greedy
            } else {
                Strategy::EpsilonGreedy
            };
            let mut action = self.q_table.select_action(
                state,
                strategy,
                epsilon,
                client.retries(),
                self.config.retry_max,
                &mut self.rng,
            );
            // The policy can still pick RETRY greedily once the cap is hit;
            // substitute a uniformly chosen legal action.
            if action == Action::Retry && client.retries() >= self.config.retry_max {
                action = *Action::NON_RETRY.choose(&mut self.rng).unwrap_or(&Action::Stand);
            }

            let (outcome, reward) = self.execute(&mut client, action, verbose)?;
            round_reward += reward;

            let next_state = StateKey::encode(client.player_hand(), client.retries());
            if !self.config.test_mode {
                self.q_table.update(
                    state,
                    action,
                    reward as f64,
                    next_state,
                    self.config.alpha,
                    self.config.gamma,
                );
            }

            history.record(&ActionRecord::new(state, action, outcome.status, reward))?;

            if outcome.done {
                if verbose {
                    println!("Game finished.");
                    println!("  result: {}", outcome.status.as_str());
                    println!("  money: {} $", self.bankroll.money());
                    println!();
                }
                break;
            }
        }

        Ok(round_reward)
    }

    /// Executes one action, settling money as needed. The reward returned is
    /// what the Q-update sees: 0 for a continuing HIT, the settlement on a
    /// terminal step, and for RETRY the penalty (netted with the settlement
    /// if the replacement card busts). The penalty is deducted from money
    /// exactly once and reported in the reward exactly once.
    fn execute<S: std::io::Read + std::io::Write>(
        &mut self,
        client: &mut RoundClient<S>,
        action: Action,
        verbose: bool,
    ) -> Result<(StepOutcome, i64), QjackError> {
        if verbose {
            println!("Action: {}", action.token().to_uppercase());
        }

        let mut penalty: i64 = 0;
        match action {
            Action::DoubleDown => {
                let (bet, money) = self.bankroll.double_bet();
                if verbose {
                    println!("  money: {} $", money);
                    println!("  bet: {} $", bet);
                }
            }
            Action::Retry => {
                penalty = self
                    .bankroll
                    .retry_penalty(client.retries(), self.config.retry_penalty_scale);
                self.bankroll.consume(penalty);
                if verbose {
                    println!(
                        "  player-card {} has been removed.",
                        client.player_hand().len()
                    );
                    println!("  money: {} $", self.bankroll.money());
                }
            }
            _ => {}
        }

        let outcome = client.act(action)?;
        if verbose {
            self.narrate(client, &outcome);
        }

        let settlement = if outcome.done {
            self.bankroll.settle(outcome.rate)
        } else {
            0
        };
        Ok((outcome, settlement - penalty))
    }

    fn narrate<S: std::io::Read + std::io::Write>(
        &self,
        client: &RoundClient<S>,
        outcome: &StepOutcome,
    ) {
        if let Some(card) = outcome.player_card {
            println!(
                "  player-card {}: {}",
                client.player_hand().len(),
                card.label()
            );
        }
        println!("  current score: {}", outcome.score);
        if outcome.done {
            let revealed: Vec<&str> = outcome.dealer_cards.iter().map(|c| c.label()).collect();
            if !revealed.is_empty() {
                println!("  dealer-cards revealed: {}", revealed.join(", "));
            }
            println!("  dealer's score: {}", client.dealer_score());
        }
        if outcome.status == RoundStatus::Bust {
            println!("  busted.");
        }
    }
}
