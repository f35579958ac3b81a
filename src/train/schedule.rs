//! Exploration-rate decay schedules.

use clap::ValueEnum;

/// How epsilon evolves over episodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DecayType {
    /// Constant at the starting value.
    Const,
    /// Linear ramp from start to end over the decay window.
    Linear,
    /// Exponential approach to the end value.
    Exp,
}

impl DecayType {
    pub fn as_str(self) -> &'static str {
        match self {
            DecayType::Const => "const",
            DecayType::Linear => "linear",
            DecayType::Exp => "exp",
        }
    }
}

impl std::fmt::Display for DecayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Epsilon schedule for epsilon-greedy exploration. Episodes are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct EpsilonSchedule {
    pub decay_type: DecayType,
    pub eps_start: f64,
    pub eps_end: f64,
    pub decay_episodes: u32,
}

impl EpsilonSchedule {
    pub fn new(decay_type: DecayType, eps_start: f64, eps_end: f64, decay_episodes: u32) -> Self {
        Self {
            decay_type,
            eps_start,
            eps_end,
            decay_episodes: decay_episodes.max(1),
        }
    }

    pub fn epsilon_for(&self, episode: u32) -> f64 {
        let n = episode.max(1);
        match self.decay_type {
            DecayType::Const => self.eps_start,
            DecayType::Linear => {
                let fraction = (f64::from(n - 1) / f64::from(self.decay_episodes)).min(1.0);
                self.eps_start + fraction * (self.eps_end - self.eps_start)
            }
            DecayType::Exp => {
                let tau = (f64::from(self.decay_episodes) / 5.0).max(1.0);
                self.eps_end + (self.eps_start - self.eps_end) * (-f64::from(n - 1) / tau).exp()
            }
        }
    }
}
