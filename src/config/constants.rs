//! Default configuration values for the blackjack learner.
//!
//! Everything here can be overridden from the command line; these are the
//! values a bare `qjack` invocation runs with.

/// TCP port the dealer listens on.
pub const DEFAULT_PORT: u16 = 8080;

/// Dealer host tried first, before the loopback fallbacks.
pub const DEFAULT_DEALER_HOST: &str = "localhost";

/// Money the player starts with.
pub const DEFAULT_INITIAL_MONEY: i64 = 1000;

/// Basic bet placed at the start of every round.
pub const DEFAULT_BET: i64 = 20;

/// Hard cap of RETRY actions per round.
pub const DEFAULT_RETRY_MAX: u32 = 10;

/// Upper bound of the retry-count bucket used in the learning state key.
/// Raw retry counts above this all map to the same bucket, which keeps the
/// state space bounded no matter how high the per-round cap is set.
pub const RETRY_BUCKET_MAX: u32 = 5;

/// Scaling factor for the escalating RETRY penalty.
pub const DEFAULT_RETRY_PENALTY_SCALE: f64 = 0.3;

/// Q-learning defaults.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
pub const DEFAULT_DISCOUNT_FACTOR: f64 = 0.9;
pub const DEFAULT_EPS_START: f64 = 0.3;
pub const DEFAULT_EPS_END: f64 = 0.05;
pub const DEFAULT_EPS_DECAY_EPISODES: u32 = 1000;

/// Q-value returned for state/action pairs that were never written.
pub const DEFAULT_Q_VALUE: f64 = 0.0;

/// Connection establishment: attempt rounds and per-attempt timeout.
pub const MAX_CONNECT_ROUNDS: u32 = 60;
pub const CONNECT_TIMEOUT_MS: u64 = 2500;

/// Jittered sleep between unsuccessful connect rounds, in milliseconds.
/// Randomized so many clients starting together do not hammer the dealer
/// in lockstep.
pub const CONNECT_BACKOFF_BASE_MS: u64 = 150;
pub const CONNECT_BACKOFF_JITTER_MS: u64 = 500;
