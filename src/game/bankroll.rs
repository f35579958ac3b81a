//! Money and bet bookkeeping for a single player.
//!
//! The ledger is plain accounting: it never blocks an operation because
//! money would go negative. Deciding when a broke agent should stop is the
//! caller's policy.

/// Tracks money, the current bet, and the escalating RETRY penalty.
#[derive(Debug, Clone)]
pub struct Bankroll {
    money: i64,
    basic_bet: i64,
    current_bet: i64,
    doubled: bool,
}

impl Bankroll {
    pub fn new(initial_money: i64, basic_bet: i64) -> Self {
        Self {
            money: initial_money,
            basic_bet,
            current_bet: basic_bet,
            doubled: false,
        }
    }

    pub fn money(&self) -> i64 {
        self.money
    }

    pub fn current_bet(&self) -> i64 {
        self.current_bet
    }

    /// Resets the bet for a new round. Returns (bet, money).
    pub fn place_bet(&mut self) -> (i64, i64) {
        self.current_bet = self.basic_bet;
        self.doubled = false;
        (self.current_bet, self.money)
    }

    /// Doubles the bet for DOUBLE_DOWN. At most once per round.
    pub fn double_bet(&mut self) -> (i64, i64) {
        if !self.doubled {
            self.current_bet *= 2;
            self.doubled = true;
        }
        (self.current_bet, self.money)
    }

    /// Unconditionally deducts `amount`. Money may go negative.
    pub fn consume(&mut self, amount: i64) {
        self.money -= amount;
    }

    /// Applies the settlement rate to the current bet, updates money, and
    /// returns the signed reward for the round's final transition.
    pub fn settle(&mut self, rate: f64) -> i64 {
        let reward = (self.current_bet as f64 * rate).floor() as i64;
        self.money += reward;
        reward
    }

    /// Escalating RETRY cost: base of a quarter bet, scaled up by how many
    /// retries this round has already spent. Strictly increasing in
    /// `retries_so_far` whenever `scale` is positive.
    pub fn retry_penalty(&self, retries_so_far: u32, scale: f64) -> i64 {
        let base = self.current_bet as f64 / 4.0;
        (base * (1.0 + scale * retries_so_far as f64)).floor() as i64
    }
}
