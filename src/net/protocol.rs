//! Per-round message exchange with the dealer.
//!
//! The protocol is strictly synchronous: one newline-delimited JSON message
//! per step, client request then dealer reply, never more than one request
//! in flight. One connection serves exactly one round and is dropped the
//! moment a terminal status arrives.

use std::io::{BufRead, BufReader, Read, Write};

use serde::{Deserialize, Serialize};

use crate::ai::action::Action;
use crate::error::QjackError;
use crate::game::card::{hand_score, Card};

/// Player status as the dealer reports it after every action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Continue,
    Bust,
    Win,
    Lose,
    Draw,
    Surrendered,
}

impl RoundStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RoundStatus::Continue)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoundStatus::Continue => "continue",
            RoundStatus::Bust => "bust",
            RoundStatus::Win => "win",
            RoundStatus::Lose => "lose",
            RoundStatus::Draw => "draw",
            RoundStatus::Surrendered => "surrendered",
        }
    }
}

/// Round protocol phases. The bet is implicit in opening the connection,
/// so BETTING is passed through without any message of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Betting,
    AwaitShuffleNotice,
    AwaitInitialCards,
    InProgress,
    Terminal(RoundStatus),
}

#[derive(Deserialize)]
struct ShuffleNotice {
    shuffled: bool,
}

#[derive(Deserialize)]
struct InitialDeal {
    dealer_card: Card,
    player_cards: Vec<Card>,
}

#[derive(Deserialize)]
struct ActReply {
    #[serde(default)]
    player_card: Option<Card>,
    score: u32,
    status: RoundStatus,
    #[serde(default)]
    rate: f64,
    #[serde(default)]
    dealer_cards: Vec<Card>,
}

/// What the dealer told us at round start.
#[derive(Debug, Clone)]
pub struct StartInfo {
    pub shuffled: bool,
    pub dealer_card: Card,
    pub player_cards: Vec<Card>,
}

/// Result of one executed action.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub status: RoundStatus,
    /// Running player score as the dealer reports it.
    pub score: u32,
    /// Settlement multiplier for the bet; meaningful only on terminal steps.
    pub rate: f64,
    /// Card drawn (HIT, DOUBLE_DOWN) or swapped in (RETRY), if any.
    pub player_card: Option<Card>,
    /// Dealer cards newly revealed by this step.
    pub dealer_cards: Vec<Card>,
    pub done: bool,
}

/// Drives one round against the dealer. Generic over the transport so tests
/// can script a dealer without a socket; in production `S` is a `TcpStream`.
pub struct RoundClient<S: Read + Write> {
    stream: Option<BufReader<S>>,
    phase: Phase,
    player_hand: Vec<Card>,
    dealer_hand: Vec<Card>,
    retries: u32,
}

impl<S: Read + Write> RoundClient<S> {
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(BufReader::new(stream)),
            phase: Phase::Init,
            player_hand: Vec::new(),
            dealer_hand: Vec::new(),
            retries: 0,
        }
    }

    pub fn player_hand(&self) -> &[Card] {
        &self.player_hand
    }

    pub fn dealer_hand(&self) -> &[Card] {
        &self.dealer_hand
    }

    pub fn player_score(&self) -> u32 {
        hand_score(&self.player_hand)
    }

    pub fn dealer_score(&self) -> u32 {
        hand_score(&self.dealer_hand)
    }

    /// RETRY actions accepted so far this round.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Opens the round: the bet rides on the connection itself, then the
    /// dealer announces whether the deck was shuffled and deals the initial
    /// two player cards plus its own visible card.
    pub fn start_round(&mut self) -> Result<StartInfo, QjackError> {
        if self.phase != Phase::Init {
            return Err(QjackError::Protocol(format!(
                "start_round called in phase {:?}",
                self.phase
            )));
        }
        self.phase = Phase::Betting;

        self.phase = Phase::AwaitShuffleNotice;
        let notice: ShuffleNotice = self.read_message()?;

        self.phase = Phase::AwaitInitialCards;
        let deal: InitialDeal = self.read_message()?;
        if deal.player_cards.len() != 2 {
            self.close();
            return Err(QjackError::Protocol(format!(
                "expected 2 initial player cards, got {}",
                deal.player_cards.len()
            )));
        }

        self.player_hand = deal.player_cards.clone();
        self.dealer_hand = vec![deal.dealer_card];
        self.phase = Phase::InProgress;

        Ok(StartInfo {
            shuffled: notice.shuffled,
            dealer_card: deal.dealer_card,
            player_cards: deal.player_cards,
        })
    }

    /// Sends one action token and processes the dealer's reply. The dealer
    /// is trusted once connected: any malformed or out-of-protocol reply is
    /// fatal for the round, never retried.
    pub fn act(&mut self, action: Action) -> Result<StepOutcome, QjackError> {
        if self.phase != Phase::InProgress {
            return Err(QjackError::Protocol(format!(
                "act({}) called in phase {:?}",
                action, self.phase
            )));
        }

        self.send_token(action.token())?;
        let reply: ActReply = self.read_message()?;

        match action {
            Action::Hit | Action::Retry => {
                if !matches!(reply.status, RoundStatus::Continue | RoundStatus::Bust) {
                    self.close();
                    return Err(QjackError::Protocol(format!(
                        "dealer answered {} with status {}",
                        action,
                        reply.status.as_str()
                    )));
                }
            }
            Action::Stand | Action::DoubleDown | Action::Surrender => {
                if !reply.status.is_terminal() {
                    self.close();
                    return Err(QjackError::Protocol(format!(
                        "dealer answered {} with non-terminal status",
                        action
                    )));
                }
            }
        }

        match action {
            Action::Retry => {
                // The last dealt card is swapped for the replacement.
                let card = self.require_player_card(&reply, action)?;
                self.player_hand.pop();
                self.player_hand.push(card);
                self.retries += 1;
            }
            Action::Hit | Action::DoubleDown => {
                let card = self.require_player_card(&reply, action)?;
                self.player_hand.push(card);
            }
            Action::Stand | Action::Surrender => {}
        }

        self.dealer_hand.extend_from_slice(&reply.dealer_cards);

        let done = reply.status.is_terminal();
        if done {
            self.phase = Phase::Terminal(reply.status);
            self.close();
        }

        Ok(StepOutcome {
            status: reply.status,
            score: reply.score,
            rate: reply.rate,
            player_card: reply.player_card,
            dealer_cards: reply.dealer_cards,
            done,
        })
    }

    fn require_player_card(
        &mut self,
        reply: &ActReply,
        action: Action,
    ) -> Result<Card, QjackError> {
        match reply.player_card {
            Some(card) => Ok(card),
            None => {
                self.close();
                Err(QjackError::Protocol(format!(
                    "dealer reply to {} carried no player card",
                    action
                )))
            }
        }
    }

    fn send_token(&mut self, token: &str) -> Result<(), QjackError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| QjackError::Protocol("connection already closed".to_string()))?;
        let writer = stream.get_mut();
        writer.write_all(token.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn read_message<T: serde::de::DeserializeOwned>(&mut self) -> Result<T, QjackError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or_else(|| QjackError::Protocol("connection already closed".to_string()))?;
        let mut line = String::new();
        let n = stream.read_line(&mut line)?;
        if n == 0 {
            self.close();
            return Err(QjackError::Protocol(
                "dealer closed the connection mid-round".to_string(),
            ));
        }
        match serde_json::from_str(line.trim_end()) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.close();
                Err(QjackError::Protocol(format!("malformed dealer message: {}", e)))
            }
        }
    }

    /// Drops the transport. Dropping a `TcpStream` closes the socket; the
    /// `Option` guarantees this happens at most once.
    fn close(&mut self) {
        self.stream = None;
    }
}
