//! Learning-state encoding and legacy key migration.

use serde::{Deserialize, Serialize};

use crate::config::constants::RETRY_BUCKET_MAX;
use crate::game::card::{hand_score, Card};

/// Discrete key the Q-table is indexed by: hand score, hand length, and the
/// capped retry bucket. The bucket (not the raw retry count) bounds how much
/// the RETRY dimension can grow the state space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    pub score: u32,
    pub hand_len: u32,
    pub retry_bucket: u32,
}

impl StateKey {
    pub fn new(score: u32, hand_len: u32, retries: u32) -> Self {
        Self {
            score,
            hand_len,
            retry_bucket: retries.min(RETRY_BUCKET_MAX),
        }
    }

    /// Encodes the observable round state: the player hand plus the number
    /// of retries spent so far this round.
    pub fn encode(player_hand: &[Card], retries: u32) -> Self {
        Self::new(hand_score(player_hand), player_hand.len() as u32, retries)
    }

    /// Persisted form: a plain JSON array, so legacy 2-component keys stay
    /// representable in the same container.
    pub fn to_raw(self) -> Vec<u32> {
        vec![self.score, self.hand_len, self.retry_bucket]
    }

    /// Parses a persisted key, upgrading the legacy 2-component form
    /// (score, length) to (score, length, 0). Returns None for shapes that
    /// are neither.
    pub fn from_raw(raw: &[u32]) -> Option<Self> {
        match raw {
            [score, hand_len] => Some(Self {
                score: *score,
                hand_len: *hand_len,
                retry_bucket: 0,
            }),
            [score, hand_len, retry_bucket] => Some(Self {
                score: *score,
                hand_len: *hand_len,
                retry_bucket: *retry_bucket,
            }),
            _ => None,
        }
    }
}

/// Rewrites every legacy 2-component key as a 3-component key with retry
/// bucket 0; 3-component keys pass through unchanged. Applied exactly once
/// when a table is loaded, never lazily at lookup time. Idempotent: the
/// output contains only 3-component keys, so a second pass is a no-op.
pub fn migrate_legacy_keys<V>(raw_entries: Vec<(Vec<u32>, V)>) -> Vec<(Vec<u32>, V)> {
    raw_entries
        .into_iter()
        .filter_map(|(key, value)| StateKey::from_raw(&key).map(|k| (k.to_raw(), value)))
        .collect()
}
