// AI components: action definitions, state encoding, Q-table

pub mod action;
pub mod qtable;
pub mod state;

// Re-export common types for convenience
pub use action::{Action, Strategy};
pub use qtable::QTable;
pub use state::StateKey;
