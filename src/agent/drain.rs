//! Passive battery drain randomness seam.
//!
//! The per-tick drain draw is behind a trait so tests can script exact
//! drain sequences instead of fighting a live RNG.

use rand::Rng;

/// Decides, once per tick, whether passive drain removes a battery unit.
pub trait DrainSource: Send + Sync {
    fn should_drain(&mut self) -> bool;
}

/// Production drain source: drains with a fixed probability per tick.
pub struct RandomDrain {
    probability: f64,
}

impl RandomDrain {
    pub fn new(probability: f64) -> Self {
        Self { probability }
    }
}

impl DrainSource for RandomDrain {
    fn should_drain(&mut self) -> bool {
        rand::thread_rng().gen::<f64>() < self.probability
    }
}

/// Scripted drain source for deterministic tests: replays a fixed
/// sequence of draws, then never drains.
pub struct ScriptedDrain {
    draws: std::collections::VecDeque<bool>,
}

impl ScriptedDrain {
    pub fn new(draws: impl IntoIterator<Item = bool>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl DrainSource for ScriptedDrain {
    fn should_drain(&mut self) -> bool {
        self.draws.pop_front().unwrap_or(false)
    }
}
