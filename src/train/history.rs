//! CSV records produced for offline analysis tooling.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::ai::action::Action;
use crate::ai::state::StateKey;
use crate::net::protocol::RoundStatus;

/// One row per action taken: the pre-action state key, the chosen action,
/// the resulting status, and the reward.
#[derive(Debug, Serialize)]
pub struct ActionRecord {
    pub score: u32,
    pub hand_length: u32,
    pub retry_bucket: u32,
    pub action: Action,
    pub status: &'static str,
    pub reward: i64,
}

impl ActionRecord {
    pub fn new(state: StateKey, action: Action, status: RoundStatus, reward: i64) -> Self {
        Self {
            score: state.score,
            hand_length: state.hand_len,
            retry_bucket: state.retry_bucket,
            action,
            status: status.as_str(),
            reward,
        }
    }
}

/// One row per episode in the optional epsilon log.
#[derive(Debug, Serialize)]
pub struct EpisodeRecord {
    pub game_id: u32,
    pub eps: f64,
    pub total_reward: i64,
}

/// Appends one row per action to the history CSV.
pub struct HistoryWriter {
    writer: csv::Writer<File>,
}

impl HistoryWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let writer = csv::Writer::from_path(path).map_err(into_io)?;
        Ok(Self { writer })
    }

    pub fn record(&mut self, record: &ActionRecord) -> std::io::Result<()> {
        self.writer.serialize(record).map_err(into_io)?;
        self.writer.flush()
    }
}

/// Appends one row per episode: game id, epsilon used, total reward.
pub struct EpisodeLogWriter {
    writer: csv::Writer<File>,
}

impl EpisodeLogWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let writer = csv::Writer::from_path(path).map_err(into_io)?;
        Ok(Self { writer })
    }

    pub fn record(&mut self, record: &EpisodeRecord) -> std::io::Result<()> {
        self.writer.serialize(record).map_err(into_io)?;
        self.writer.flush()
    }
}

fn into_io(e: csv::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e)
}
