//! Player actions and selection strategies.

use serde::{Deserialize, Serialize};

/// Everything the player can do in a round. RETRY swaps out the last dealt
/// card for a fee; the other four are standard blackjack moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Hit,
    Stand,
    DoubleDown,
    Surrender,
    Retry,
}

impl Action {
    /// Fixed action order. Q-value argmax scans and tie-breaks follow this
    /// ordering, so results never depend on map iteration order.
    pub const ALL: [Action; 5] = [
        Action::Hit,
        Action::Stand,
        Action::DoubleDown,
        Action::Surrender,
        Action::Retry,
    ];

    /// The four actions that remain legal once the RETRY cap is reached.
    pub const NON_RETRY: [Action; 4] = [
        Action::Hit,
        Action::Stand,
        Action::DoubleDown,
        Action::Surrender,
    ];

    /// Literal token sent to the dealer.
    pub fn token(self) -> &'static str {
        match self {
            Action::Hit => "hit",
            Action::Stand => "stand",
            Action::DoubleDown => "double_down",
            Action::Surrender => "surrender",
            Action::Retry => "retry",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// How an action is chosen given a state and the current Q-table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Always the action with maximal Q-value.
    Greedy,
    /// Random with probability epsilon, greedy otherwise.
    EpsilonGreedy,
    /// Uniform over the currently legal actions.
    Random,
}
