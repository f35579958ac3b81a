// Module declarations for the qjack blackjack learner

// Game domain: cards, per-round state, bankroll
pub mod game {
    pub mod bankroll;
    pub mod card;
}

// Networking: dealer connection and round protocol
pub mod net {
    pub mod connection;
    pub mod protocol;
}

// AI components: actions, state encoding, Q-table
pub mod ai;

// Training loop: epsilon schedule, history logging, episode runner
pub mod train {
    pub mod history;
    pub mod runner;
    pub mod schedule;
}

// Configuration defaults
pub mod config {
    pub mod constants;
}

// Utility functions
pub mod utils {
    pub mod logging;
}

// CLI interface
pub mod cli {
    pub mod cli;
}

pub mod error;

// Re-export commonly used types
pub use crate::ai::action::{Action, Strategy};
pub use crate::ai::qtable::QTable;
pub use crate::ai::state::StateKey;
pub use crate::error::QjackError;
