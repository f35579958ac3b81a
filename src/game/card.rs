//! Card representation and blackjack hand scoring.

use serde::{Deserialize, Serialize};

/// A card as the dealer reports it: rank 1 (ace) through 13 (king).
/// Suits never matter for scoring and the dealer does not send them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card(pub u8);

impl Card {
    /// Face value used for scoring: aces count 1 here, the soft-ace
    /// upgrade to 11 happens in `hand_score`.
    pub fn base_value(self) -> u32 {
        u32::from(self.0.min(10))
    }

    /// Human-readable label for per-round narration.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "A",
            2 => "2",
            3 => "3",
            4 => "4",
            5 => "5",
            6 => "6",
            7 => "7",
            8 => "8",
            9 => "9",
            10 => "10",
            11 => "J",
            12 => "Q",
            13 => "K",
            _ => "?",
        }
    }
}

/// Blackjack score of a hand: aces count 1, and a single ace is upgraded
/// to 11 when that does not bust the hand.
pub fn hand_score(cards: &[Card]) -> u32 {
    let mut score: u32 = cards.iter().map(|c| c.base_value()).sum();
    let has_ace = cards.iter().any(|c| c.0 == 1);
    if has_ace && score + 10 <= 21 {
        score += 10;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_cards_count_ten() {
        assert_eq!(hand_score(&[Card(11), Card(12)]), 20);
        assert_eq!(hand_score(&[Card(13), Card(10)]), 20);
    }

    #[test]
    fn single_ace_is_soft() {
        assert_eq!(hand_score(&[Card(1), Card(6)]), 17);
        assert_eq!(hand_score(&[Card(1), Card(13)]), 21);
    }

    #[test]
    fn ace_drops_to_one_when_eleven_busts() {
        assert_eq!(hand_score(&[Card(1), Card(9), Card(5)]), 15);
    }

    #[test]
    fn two_aces_only_one_upgrades() {
        assert_eq!(hand_score(&[Card(1), Card(1)]), 12);
        assert_eq!(hand_score(&[Card(1), Card(1), Card(9)]), 21);
    }

    #[test]
    fn bust_hand_scores_over_21() {
        assert_eq!(hand_score(&[Card(10), Card(9), Card(5)]), 24);
    }
}
