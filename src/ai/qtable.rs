//! Tabular Q-learning: value storage, action selection, Bellman updates,
//! and JSON persistence with metadata.

use std::collections::HashMap;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::ai::action::{Action, Strategy};
use crate::ai::state::{migrate_legacy_keys, StateKey};

/// Training hyperparameters stored alongside the table so a saved run is
/// self-describing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMeta {
    pub alpha: f64,
    pub gamma: f64,
    pub eps_start: f64,
    pub eps_end: f64,
    pub eps_decay_episodes: u32,
    pub eps_decay_type: String,
    pub games: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// One persisted table entry: [key, action, q]. The key is a plain JSON
/// array so legacy 2-component keys load from the same container.
#[derive(Debug, Serialize, Deserialize)]
struct RawEntry(Vec<u32>, Action, f64);

#[derive(Serialize)]
struct SavedTable<'a> {
    meta: &'a TableMeta,
    table: Vec<RawEntry>,
}

/// Either the current wrapped form or a bare entry list from before
/// metadata existed.
#[derive(Deserialize)]
#[serde(untagged)]
enum LoadedTable {
    Wrapped {
        #[serde(default)]
        #[allow(dead_code)]
        meta: Option<TableMeta>,
        table: Vec<RawEntry>,
    },
    Bare(Vec<RawEntry>),
}

/// Q-value estimates keyed by (state, action). Lookups of never-written
/// pairs return the default value without inserting anything.
#[derive(Debug, Clone)]
pub struct QTable {
    table: HashMap<(StateKey, Action), f64>,
    default_value: f64,
}

impl QTable {
    pub fn new(default_value: f64) -> Self {
        Self {
            table: HashMap::new(),
            default_value,
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, state: StateKey, action: Action) -> f64 {
        self.table
            .get(&(state, action))
            .copied()
            .unwrap_or(self.default_value)
    }

    pub fn set(&mut self, state: StateKey, action: Action, value: f64) {
        self.table.insert((state, action), value);
    }

    /// Action with maximal Q-value for this state. Scans the fixed action
    /// order and keeps the first maximum, so ties resolve deterministically.
    pub fn best_action(&self, state: StateKey) -> (Action, f64) {
        let mut best = Action::ALL[0];
        let mut best_value = self.get(state, best);
        for &action in &Action::ALL[1..] {
            let value = self.get(state, action);
            if value > best_value {
                best = action;
                best_value = value;
            }
        }
        (best, best_value)
    }

    /// Chooses an action under the given strategy. RETRY is only ever
    /// sampled randomly while the round still has retries left.
    pub fn select_action<R: Rng>(
        &self,
        state: StateKey,
        strategy: Strategy,
        epsilon: f64,
        retries: u32,
        retry_cap: u32,
        rng: &mut R,
    ) -> Action {
        match strategy {
            Strategy::Greedy => self.best_action(state).0,
            Strategy::EpsilonGreedy => {
                if rng.gen::<f64>() < epsilon {
                    self.select_action(state, Strategy::Random, epsilon, retries, retry_cap, rng)
                } else {
                    self.best_action(state).0
                }
            }
            Strategy::Random => {
                if retries < retry_cap {
                    *Action::ALL.choose(rng).unwrap_or(&Action::Stand)
                } else {
                    *Action::NON_RETRY.choose(rng).unwrap_or(&Action::Stand)
                }
            }
        }
    }

    /// Bellman update:
    /// `Q(s,a) <- (1 - alpha) * Q(s,a) + alpha * (reward + gamma * max_a' Q(s',a'))`
    pub fn update(
        &mut self,
        prev_state: StateKey,
        action: Action,
        reward: f64,
        next_state: StateKey,
        alpha: f64,
        gamma: f64,
    ) {
        let (_, next_value) = self.best_action(next_state);
        let q = self.get(prev_state, action);
        let updated = (1.0 - alpha) * q + alpha * (reward + gamma * next_value);
        self.set(prev_state, action, updated);
    }

    /// Writes the table with its metadata as a whole-file overwrite.
    pub fn save_to_file(&self, path: &str, meta: &TableMeta) -> std::io::Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut entries: Vec<RawEntry> = self
            .table
            .iter()
            .map(|(&(state, action), &q)| RawEntry(state.to_raw(), action, q))
            .collect();
        // Stable on-disk order so repeated saves of the same table diff clean.
        entries.sort_by(|a, b| (&a.0, a.1.token()).cmp(&(&b.0, b.1.token())));

        let saved = SavedTable {
            meta,
            table: entries,
        };
        let json = serde_json::to_string_pretty(&saved)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }

    /// Loads a table, accepting the wrapped {meta, table} form or a bare
    /// entry list, and runs the legacy key migration once. Any failure is
    /// recovered locally: warn and return an empty table.
    pub fn load_from_file(path: &str, default_value: f64) -> Self {
        let mut loaded = Self::new(default_value);

        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to read Q-table from {}: {}; starting empty", path, e);
                return loaded;
            }
        };

        let entries = match serde_json::from_str::<LoadedTable>(&json) {
            Ok(LoadedTable::Wrapped { table, .. }) => table,
            Ok(LoadedTable::Bare(table)) => table,
            Err(e) => {
                warn!("failed to parse Q-table from {}: {}; starting empty", path, e);
                return loaded;
            }
        };

        let raw: Vec<(Vec<u32>, (Action, f64))> = entries
            .into_iter()
            .map(|RawEntry(key, action, q)| (key, (action, q)))
            .collect();
        let had_legacy = raw.iter().any(|(key, _)| key.len() == 2);

        for (key, (action, q)) in migrate_legacy_keys(raw) {
            if let Some(state) = StateKey::from_raw(&key) {
                loaded.table.insert((state, action), q);
            }
        }
        if had_legacy {
            info!("expanded legacy 2-component state keys to include retry bucket 0");
        }
        info!("loaded Q-table with {} entries from {}", loaded.len(), path);
        loaded
    }
}
