use chrono::{DateTime, SecondsFormat, Utc};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub(crate) const VITAL_MIN: f64 = 0.0;
pub(crate) const VITAL_MAX: f64 = 100.0;

const MS_PER_HOUR: f64 = 3_600_000.0;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 5;

pub(crate) fn clamp_vital(v: f64) -> f64 {
    v.clamp(VITAL_MIN, VITAL_MAX)
}

/// Hours from `since` to `now`, never negative (clock skew counts as zero).
pub(crate) fn hours_between(since: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let ms = (now - since).num_milliseconds() as f64;
    (ms / MS_PER_HOUR).max(0.0)
}

pub(crate) fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Appends a timestamped line to an event log.
pub(crate) fn stamp(log: &mut Vec<String>, at: DateTime<Utc>, msg: impl AsRef<str>) {
    log.push(format!("{} {}", iso(at), msg.as_ref()));
}

pub(crate) fn short_id<D: Dice + ?Sized>(dice: &mut D) -> String {
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[dice.pick(ID_ALPHABET.len())] as char)
        .collect()
}

/// Source of uniform randomness for the simulation.
///
/// Everything random in the crate (event rolls, item drops, the minigame
/// opponent, pet ids) goes through this trait so tests can script it.
pub(crate) trait Dice {
    /// Uniform draw in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform index in `0..n`.
    fn pick(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((self.unit() * n as f64) as usize).min(n - 1)
    }

    /// Bernoulli trial; `p <= 0` never succeeds, `p >= 1` always does.
    fn chance(&mut self, p: f64) -> bool {
        self.unit() < p
    }
}

/// Adapts any `rand` generator to [`Dice`].
pub(crate) struct RngDice<R>(pub(crate) R);

impl<R: Rng> Dice for RngDice<R> {
    fn unit(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

impl RngDice<StdRng> {
    pub(crate) fn seeded(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self(StdRng::seed_from_u64(s)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

/// Replays a fixed sequence of draws, then cycles through high values that
/// fail any chance roll below 0.85.
#[cfg(test)]
pub(crate) struct ScriptedDice {
    draws: std::collections::VecDeque<f64>,
    spent: usize,
}

#[cfg(test)]
const QUIET_DRAWS: [f64; 4] = [0.999, 0.95, 0.9, 0.85];

#[cfg(test)]
impl ScriptedDice {
    pub(crate) fn new(draws: &[f64]) -> Self {
        Self {
            draws: draws.iter().copied().collect(),
            spent: 0,
        }
    }

    pub(crate) fn quiet() -> Self {
        Self::new(&[])
    }

    pub(crate) fn remaining(&self) -> usize {
        self.draws.len()
    }
}

#[cfg(test)]
impl Dice for ScriptedDice {
    fn unit(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or_else(|| {
            self.spent += 1;
            QUIET_DRAWS[self.spent % QUIET_DRAWS.len()]
        })
    }
}
